//! Node handles.
//!
//! Scripts never see [`NodeId`]s. Each node a script touches is given a small
//! integer handle, assigned densely from zero in first-use order.

use std::collections::HashMap;

use wombat_dom::NodeId;

/// Bidirectional node/handle mapping.
#[derive(Debug, Default)]
pub struct HandleTable {
    by_node: HashMap<NodeId, u32>,
    nodes: Vec<NodeId>,
}

impl HandleTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The handle for `node`, allocating the next one on first use.
    pub fn handle_for(&mut self, node: NodeId) -> u32 {
        if let Some(&handle) = self.by_node.get(&node) {
            return handle;
        }
        let handle = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        self.nodes.push(node);
        let _ = self.by_node.insert(node, handle);
        handle
    }

    /// The node behind `handle`, if it was ever issued.
    #[must_use]
    pub fn node(&self, handle: u32) -> Option<NodeId> {
        self.nodes.get(handle as usize).copied()
    }

    /// Number of handles issued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no handle has been issued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
