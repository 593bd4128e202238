//! Cooperative task scheduling.
//!
//! [§ 8.1.7 Event loops](https://html.spec.whatwg.org/multipage/webappapis.html#event-loops)
//!
//! "An event loop has one or more task queues. A task queue is a set of tasks."
//!
//! The engine has exactly one consumer, the thread that owns the DOM, layout
//! tree and interpreter. Background threads (timers, finished fetches) never
//! touch that state; they package the work as a [`Task`] and post it to a
//! [`TaskRunner`]. The owning thread calls [`TaskRunner::run_once`] once per
//! tick, which hands the task exclusive access to the target state.
//!
//! ```text
//! timer thread ──schedule_task──┐
//! fetch thread ──schedule_task──┼──► Mutex<VecDeque<Task>> ──run_once──► main thread
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A unit of work posted from any thread and executed on the main thread.
///
/// The closure receives exclusive access to the main-thread state `T`. Its
/// captured state is released as soon as it has run.
pub struct Task<T> {
    code: Box<dyn FnOnce(&mut T) + Send>,
}

impl<T> Task<T> {
    /// Package a closure as a task.
    pub fn new(code: impl FnOnce(&mut T) + Send + 'static) -> Self {
        Self {
            code: Box::new(code),
        }
    }

    /// Run the task against the main-thread state, consuming it.
    pub fn run(self, target: &mut T) {
        (self.code)(target);
    }
}

impl<T> std::fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Task")
    }
}

struct TaskQueue<T> {
    tasks: Mutex<VecDeque<Task<T>>>,
    condition: Condvar,
}

/// A FIFO task queue shared between producer threads and a single consumer.
///
/// Cloning a `TaskRunner` clones the handle, not the queue: every clone posts
/// to and drains from the same queue.
pub struct TaskRunner<T> {
    queue: Arc<TaskQueue<T>>,
}

impl<T> TaskRunner<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: Arc::new(TaskQueue {
                tasks: Mutex::new(VecDeque::new()),
                condition: Condvar::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Task<T>>> {
        self.queue
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a task to the back of the queue and wake any waiter.
    ///
    /// Callable from any thread.
    pub fn schedule_task(&self, task: Task<T>) {
        let mut tasks = self.lock();
        tasks.push_back(task);
        self.queue.condition.notify_all();
    }

    /// Pop the front task, if any, and run it against `target`.
    ///
    /// The lock is released before the task executes, so producers are never
    /// blocked behind consumer work. Returns `false` when the queue was empty;
    /// this never blocks.
    pub fn run_once(&self, target: &mut T) -> bool {
        let task = self.lock().pop_front();
        match task {
            Some(task) => {
                task.run(target);
                true
            }
            None => false,
        }
    }

    /// Number of tasks waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Block until the queue is non-empty or `timeout` elapses.
    ///
    /// The main loop polls with [`run_once`](Self::run_once); this is only for
    /// headless drivers that have nothing else to do between ticks. Returns
    /// whether a task is available.
    #[must_use]
    pub fn wait_for_task(&self, timeout: Duration) -> bool {
        let tasks = self.lock();
        let (tasks, _) = self
            .queue
            .condition
            .wait_timeout_while(tasks, timeout, |tasks| tasks.is_empty())
            .unwrap_or_else(PoisonError::into_inner);
        !tasks.is_empty()
    }
}

impl<T> Clone for TaskRunner<T> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<T> Default for TaskRunner<T> {
    fn default() -> Self {
        Self::new()
    }
}
