//! Document node model for the Lumen box tree.
//!
//! This crate provides the arena-based node tree that boxes refer back to.
//! It is deliberately small: the box tree only ever reads nodes, so the model
//! carries the shape of the document (parent, children, siblings) plus the
//! payload a box builder needs (element tag and attributes, text data).
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all
//! relationships, providing O(1) access and traversal without borrow checker
//! issues. Detached nodes stay allocated; a [`NodeId`] is never reused.

use std::collections::HashMap;

/// Map of attribute names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// A type-safe index into a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// "Each node has an associated node type"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// The document itself, root of the node tree.
    Document,
    /// An element with a tag name and attributes.
    Element(ElementData),
    /// A run of character data.
    Text(String),
}

/// Element-specific data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementData {
    /// The element's local name.
    pub tag_name: String,
    /// The element's attribute list.
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create element data for `tag_name` without attributes.
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attrs: AttributesMap::new(),
        }
    }

    /// Returns the element's id attribute value if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id").map(String::as_str)
    }
}

/// One node of the document tree.
///
/// Stores indices for parent/child/sibling relationships, enabling O(1)
/// traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// What kind of node this is, with its payload.
    pub node_type: NodeType,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    next_sibling: Option<NodeId>,
    prev_sibling: Option<NodeId>,
}

impl Node {
    const fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// Arena-based document with O(1) node access and traversal.
#[derive(Debug, Clone)]
pub struct Document {
    /// All nodes, indexed by [`NodeId`]. The document node is at index 0.
    nodes: Vec<Node>,
}

impl Document {
    /// Create a new document containing only the document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeType::Document)],
        }
    }

    /// The document node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of allocated nodes, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A document always holds at least the document node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a detached node and return its ID.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(node_type));
        id
    }

    /// Allocate a detached element.
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.alloc(NodeType::Element(ElementData::new(tag_name)))
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Text(data.to_string()))
    }

    /// Appends `child` as the last child of `parent`, updating all
    /// relationships.
    ///
    /// # Panics
    ///
    /// Panics if `child` is already attached or either id is out of range.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        assert!(
            self.nodes[child.0].parent.is_none(),
            "{child:?} already has a parent"
        );
        let prev_last_child = self.nodes[parent.0].children.last().copied();
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
    }

    /// Removes `child` from `parent`, stitching its siblings together.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        assert_eq!(
            self.nodes[child.0].parent,
            Some(parent),
            "{child:?} is not a child of {parent:?}"
        );
        let prev = self.nodes[child.0].prev_sibling;
        let next = self.nodes[child.0].next_sibling;
        if let Some(prev) = prev {
            self.nodes[prev.0].next_sibling = next;
        }
        if let Some(next) = next {
            self.nodes[next.0].prev_sibling = prev;
        }
        self.nodes[parent.0].children.retain(|&id| id != child);
        let node = &mut self.nodes[child.0];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Replace the character data of a text node. Returns `false` if `id`
    /// is not a text node.
    pub fn set_text(&mut self, id: NodeId, data: &str) -> bool {
        match self.nodes.get_mut(id.0).map(|n| &mut n.node_type) {
            Some(NodeType::Text(text)) => {
                data.clone_into(text);
                true
            }
            _ => false,
        }
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

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// A node is connected when its root is the document node.
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == NodeId::ROOT || self.is_descendant_of(id, NodeId::ROOT)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            document: self,
            current: self.parent(id),
        }
    }

    /// Iterate over `id` and its descendants in tree order.
    #[must_use]
    pub fn descendants_or_self(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            document: self,
            stack: vec![id],
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    document: &'a Document,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.document.parent(id);
        Some(id)
    }
}

/// Pre-order iterator over a subtree.
pub struct DescendantIterator<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.document.children(id).iter().rev().copied());
        Some(id)
    }
}
