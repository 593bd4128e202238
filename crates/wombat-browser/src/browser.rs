//! The browser window: tabs, chrome, input routing and compositing.
//!
//! Two surfaces are rastered independently and copied into a root surface:
//!
//! ```text
//! +---------------------------+  0
//! | chrome surface            |
//! +---------------------------+  chrome.bottom()
//! | page surface, translated  |
//! | by -scroll and clipped    |
//! +---------------------------+  config.height
//! ```
//!
//! The chrome surface is re-rastered only when its content changes; the page
//! surface whenever the active tab has rendered since the last composite.
//!
//! The page surface covers the whole document up to
//! [`MAX_PAGE_SURFACE_HEIGHT`] rows. Longer documents are rastered as a
//! window of that height starting at the scroll offset, moved when scrolling
//! leaves it.

use std::rc::Rc;
use std::sync::Arc;

use wombat_common::Fetcher;
use wombat_css::{Color, FontMetrics, Rect};

use crate::chrome::{Chrome, ChromeAction};
use crate::config::BrowserConfig;
use crate::error::LoadError;
use crate::raster::Surface;
use crate::tab::Tab;

/// Tallest page surface ever allocated, in pixels.
pub const MAX_PAGE_SURFACE_HEIGHT: f32 = 4096.0;

/// Abstract input delivered by the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Mouse click at window coordinates.
    Click {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },
    /// A printable character.
    Key(char),
    /// The Enter key.
    Enter,
    /// The Backspace key.
    Backspace,
    /// Scroll one step down.
    ScrollDown,
    /// Scroll one step up.
    ScrollUp,
    /// Go back in the active tab's history.
    GoBack,
}

/// What was last rastered into a surface.
#[derive(Debug, Clone, PartialEq)]
enum Painted {
    Nothing,
    Chrome { url: String, focused: bool, typed: String },
    Page { tab: usize, generation: u64, origin: f32 },
}

/// A window holding tabs and the chrome above them.
pub struct Browser {
    config: BrowserConfig,
    fetcher: Arc<dyn Fetcher>,
    metrics: Rc<dyn FontMetrics>,
    chrome: Chrome,
    tabs: Vec<Tab>,
    active: usize,
    root_surface: Surface,
    chrome_surface: Surface,
    page_surface: Surface,
    chrome_painted: Painted,
    page_painted: Painted,
}

impl Browser {
    /// An empty window.
    #[must_use]
    pub fn new(config: BrowserConfig, fetcher: Arc<dyn Fetcher>, metrics: Rc<dyn FontMetrics>) -> Self {
        let chrome = Chrome::new(config.width, metrics.as_ref());
        let width = config.width as u32;
        let height = config.height as u32;
        let chrome_height = chrome.bottom().ceil() as u32;
        Self {
            config,
            fetcher,
            metrics,
            chrome,
            tabs: Vec::new(),
            active: 0,
            root_surface: Surface::new(width, height),
            chrome_surface: Surface::new(width, chrome_height),
            page_surface: Surface::new(width, height),
            chrome_painted: Painted::Nothing,
            page_painted: Painted::Nothing,
        }
    }

    /// Open `address` in a new tab and make it active.
    ///
    /// # Errors
    ///
    /// [`LoadError`] if the address is invalid or cannot be fetched; the tab
    /// stays open, empty.
    pub fn new_tab(&mut self, address: &str) -> Result<(), LoadError> {
        let tab_height = self.config.height - self.chrome.bottom();
        self.tabs.push(Tab::new(
            self.config,
            tab_height,
            Arc::clone(&self.fetcher),
            Rc::clone(&self.metrics),
        ));
        self.active = self.tabs.len() - 1;
        self.active_tab_mut()
            .map_or(Ok(()), |tab| tab.load_address(address))
    }

    /// Make tab `index` active. Out-of-range indices are ignored.
    pub fn switch_tab(&mut self, index: usize) {
        if index < self.tabs.len() {
            self.active = index;
        }
    }

    /// Number of open tabs.
    #[must_use]
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// The tab receiving input.
    #[must_use]
    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.get(self.active)
    }

    /// Mutable access to the tab receiving input.
    pub fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        self.tabs.get_mut(self.active)
    }

    /// The chrome.
    #[must_use]
    pub const fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    /// Route one input event to the chrome or the active tab.
    ///
    /// # Errors
    ///
    /// [`LoadError`] if the event triggered a navigation that failed.
    pub fn handle_event(&mut self, event: InputEvent) -> Result<(), LoadError> {
        let chrome_bottom = self.chrome.bottom();
        match event {
            InputEvent::Click { x, y } if y < chrome_bottom => match self.chrome.click(x, y) {
                ChromeAction::Back => self.with_active_tab(Tab::go_back),
                ChromeAction::FocusAddress => {
                    self.with_active_tab(|tab| {
                        tab.blur();
                        tab.render();
                        Ok(())
                    })
                }
                ChromeAction::None => Ok(()),
            },
            InputEvent::Click { x, y } => {
                self.chrome.blur();
                self.with_active_tab(|tab| tab.click(x, y - chrome_bottom))
            }
            InputEvent::Key(ch) => {
                if !self.chrome.keypress(ch) {
                    let _ = self.with_active_tab(|tab| Ok(tab.keypress(ch)))?;
                }
                Ok(())
            }
            InputEvent::Backspace => {
                let _ = self.chrome.backspace();
                Ok(())
            }
            InputEvent::Enter => match self.chrome.enter() {
                Some(address) => self.with_active_tab(|tab| tab.load_address(&address)),
                None => Ok(()),
            },
            InputEvent::ScrollDown => self.with_active_tab(|tab| {
                tab.scroll_down();
                Ok(())
            }),
            InputEvent::ScrollUp => self.with_active_tab(|tab| {
                tab.scroll_up();
                Ok(())
            }),
            InputEvent::GoBack => self.with_active_tab(Tab::go_back),
        }
    }

    fn with_active_tab<R: Default>(
        &mut self,
        f: impl FnOnce(&mut Tab) -> Result<R, LoadError>,
    ) -> Result<R, LoadError> {
        self.active_tab_mut().map_or_else(|| Ok(R::default()), f)
    }

    /// One iteration of the main loop after input has been drained: run at
    /// most one pending task of the active tab. Returns whether a task ran.
    pub fn tick(&mut self) -> bool {
        self.active_tab_mut().is_some_and(Tab::run_pending_task)
    }

    /// Raster whatever changed and compose the window.
    pub fn composite(&mut self) -> &Surface {
        self.raster_chrome();
        self.raster_page();

        let chrome_bottom = self.chrome.bottom();
        let scroll = self.active_tab().map_or(0.0, Tab::scroll);
        let origin = match self.page_painted {
            Painted::Page { origin, .. } => origin,
            _ => 0.0,
        };
        let (width, height) = (self.config.width, self.config.height);

        self.root_surface.clear(Color::WHITE);
        self.root_surface.blit(
            &self.page_surface,
            0.0,
            chrome_bottom - scroll + origin,
            &Rect::new(0.0, chrome_bottom, width, height - chrome_bottom),
        );
        self.root_surface.blit(
            &self.chrome_surface,
            0.0,
            0.0,
            &Rect::new(0.0, 0.0, width, chrome_bottom),
        );
        &self.root_surface
    }

    fn raster_chrome(&mut self) {
        let url = self
            .active_tab()
            .and_then(Tab::url)
            .map(ToString::to_string)
            .unwrap_or_default();
        let state = Painted::Chrome {
            url,
            focused: self.chrome.is_focused(),
            typed: self.chrome.address_text().to_string(),
        };
        if state == self.chrome_painted {
            return;
        }
        if let Painted::Chrome { url, .. } = &state {
            let display_list = self.chrome.paint(url, self.metrics.as_ref());
            self.chrome_surface.clear(Color::WHITE);
            self.chrome_surface.draw(&display_list);
        }
        self.chrome_painted = state;
    }

    fn raster_page(&mut self) {
        let Some(tab) = self.tabs.get(self.active) else {
            return;
        };
        let page_height = tab.layout_tree().document_height().max(tab.tab_height());
        let height = page_height.min(MAX_PAGE_SURFACE_HEIGHT);
        let scroll = tab.scroll();
        let shows_view =
            |origin: f32| origin <= scroll && scroll + tab.tab_height() <= origin + height;
        let origin = match self.page_painted {
            Painted::Page {
                tab: painted,
                origin,
                ..
            } if painted == self.active && shows_view(origin) => origin,
            _ => scroll.min(page_height - height).max(0.0),
        };
        let state = Painted::Page {
            tab: self.active,
            generation: tab.render_generation(),
            origin,
        };
        if state == self.page_painted {
            return;
        }
        self.page_surface = Surface::new(self.config.width as u32, height.ceil() as u32);
        self.page_surface.draw_band(tab.display_list(), origin);
        self.page_painted = state;
    }
}

impl std::fmt::Debug for Browser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Browser")
            .field("tabs", &self.tabs)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}
