//! DOM tree implementation for the Wombat engine.
//!
//! This crate provides an arena-based DOM tree structure loosely following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/).
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships.
//! Parents own their children through the `children` list; the `parent` link is
//! a plain index, so upward traversal (selector ancestor matching, style lookup,
//! event targeting) needs no reference counting and creates no cycles.
//!
//! Unlike a full DOM there is no Document node: the first node allocated is the
//! root `<html>` element, and only Element and Text nodes exist.

use std::collections::HashMap;

/// Map of attribute names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// Resolved style of a node: property name to value, both as written in CSS.
pub type StyleMap = HashMap<String, String>;

/// A type-safe index into the DOM tree.
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root `<html>` element is always the first node allocated.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// Computed style, empty until the cascade has run.
    pub style: StyleMap,

    /// Whether this node currently has input focus.
    pub is_focused: bool,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    /// "Element nodes are simply known as elements."
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    /// "Text nodes are known as text."
    Text(String),
}

/// Element-specific data.
///
/// NOTE: We only store the local name and attributes. Tag names and attribute
/// names are lowercased by the parser.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// "An element's local name"
    pub tag_name: String,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create element data with the given tag and attributes.
    #[must_use]
    pub fn new(tag_name: &str, attrs: AttributesMap) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            attrs,
        }
    }
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree. A tree is a finite hierarchical
/// tree structure."
///
/// Nodes that are detached (for example the old children replaced by an
/// `innerHTML` assignment) stay in the arena but are unreachable from the root.
#[derive(Debug, Clone, Default)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create an empty tree. The first allocated node becomes the root.
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Get the root node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Number of nodes in the arena, detached ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if no node has been allocated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            style: StyleMap::new(),
            is_focused: false,
        });
        id
    }

    /// Allocate an element node.
    pub fn alloc_element(&mut self, tag_name: &str, attrs: AttributesMap) -> NodeId {
        self.alloc(NodeType::Element(ElementData::new(tag_name, attrs)))
    }

    /// Allocate a text node.
    pub fn alloc_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeType::Text(text.to_string()))
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// Appends `child` as the last child of `parent` and sets its parent link.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// [§ 4.2.1 Pre-insert](https://dom.spec.whatwg.org/#concept-node-pre-insert)
    ///
    /// Inserts `child` into `parent`'s children at `index` (clamped to the end).
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        let children = &mut self.nodes[parent.0].children;
        children.insert(index.min(children.len()), child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// [§ 4.2.3 Replace all](https://dom.spec.whatwg.org/#concept-node-replace-all)
    ///
    /// "To replace all with a node within a parent, run these steps..."
    ///
    /// Detaches every current child of `parent`, then appends `children` in
    /// order, reparenting each one.
    pub fn replace_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        let old = std::mem::take(&mut self.nodes[parent.0].children);
        for child in old {
            self.nodes[child.0].parent = None;
        }
        for child in children {
            self.append_child(parent, child);
        }
    }

    /// Deep-copy the subtree rooted at `id` in `other` into this arena.
    ///
    /// Returns the ID of the copied root, which is left detached.
    pub fn import_subtree(&mut self, other: &Self, id: NodeId) -> Option<NodeId> {
        let node = other.get(id)?;
        let copy = self.alloc(node.node_type.clone());
        for &child in &node.children {
            if let Some(child_copy) = self.import_subtree(other, child) {
                self.append_child(copy, child_copy);
            }
        }
        Some(copy)
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// The subtree rooted at `id` in document (pre-)order, `id` first.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if self.get(current).is_none() {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// Every node reachable from the root, in document order.
    #[must_use]
    pub fn iter_all(&self) -> Vec<NodeId> {
        self.descendants(self.root())
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            NodeType::Text(_) => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            NodeType::Element(_) => None,
        })
    }

    /// The tag name of an element node.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(|e| e.tag_name.as_str())
    }

    /// Whether `id` is an element with the given tag.
    #[must_use]
    pub fn is_element(&self, id: NodeId, tag: &str) -> bool {
        self.tag_name(id) == Some(tag)
    }

    /// [§ 4.9 getAttribute](https://dom.spec.whatwg.org/#dom-element-getattribute)
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.as_element(id)
            .and_then(|e| e.attrs.get(name))
            .map(String::as_str)
    }

    /// [§ 4.9 setAttribute](https://dom.spec.whatwg.org/#dom-element-setattribute)
    ///
    /// No-op on text nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(Node {
            node_type: NodeType::Element(data),
            ..
        }) = self.get_mut(id)
        {
            let _ = data.attrs.insert(name.to_string(), value.to_string());
        }
    }

    /// The computed style of a node (empty before the cascade ran).
    #[must_use]
    pub fn style(&self, id: NodeId) -> Option<&StyleMap> {
        self.get(id).map(|n| &n.style)
    }

    /// Replace the computed style of a node.
    pub fn set_style(&mut self, id: NodeId, style: StyleMap) {
        if let Some(node) = self.get_mut(id) {
            node.style = style;
        }
    }

    /// Whether the node has input focus.
    #[must_use]
    pub fn is_focused(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.is_focused)
    }

    /// Set or clear the focus flag of a node.
    pub fn set_focused(&mut self, id: NodeId, focused: bool) {
        if let Some(node) = self.get_mut(id) {
            node.is_focused = focused;
        }
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// Concatenation of all text node data in the subtree, in document order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.as_text(n))
            .collect()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
