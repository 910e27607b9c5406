//! Document node to box registry.
//!
//! A [`BoxMap`] owns the [`BoxTree`] for one document. The tree's root box
//! stands for the document node itself; every other node gets at most one
//! box. Node-backed boxes outlive detachment so the tree builder can reuse
//! them; they are destroyed here, when their node goes away or the map is
//! dropped.

use std::collections::HashMap;
use std::rc::Rc;

use lumen_common::invariant::{ensure, invariant_violated};
use lumen_dom::NodeId;

use crate::boxes::{BoxId, BoxTree, LayoutBox};
use crate::lifecycle::ViewLifecycle;

const COMPONENT: &str = "BoxMap";

/// Owns a box tree and maps document nodes to their boxes.
///
/// Dropping the map shuts the lifecycle down and dismantles the tree.
#[derive(Debug)]
pub struct BoxMap {
    tree: BoxTree,
    boxes: HashMap<NodeId, BoxId>,
}

impl BoxMap {
    /// A map whose root box represents `document`.
    #[must_use]
    pub fn new(lifecycle: Rc<ViewLifecycle>, document: NodeId) -> Self {
        let tree = BoxTree::for_document(lifecycle, document);
        let mut boxes = HashMap::new();
        let _ = boxes.insert(document, tree.root());
        Self { tree, boxes }
    }

    /// The tree.
    #[must_use]
    pub const fn tree(&self) -> &BoxTree {
        &self.tree
    }

    /// The tree, for editing.
    pub const fn tree_mut(&mut self) -> &mut BoxTree {
        &mut self.tree
    }

    /// The box generated for `node`, if any.
    #[must_use]
    pub fn box_for(&self, node: NodeId) -> Option<BoxId> {
        self.boxes.get(&node).copied()
    }

    /// Number of registered nodes, the document included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// The document is always registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Record that `id` was generated for `node`.
    ///
    /// The box must be backed by `node`, and `node` must not already have a
    /// box.
    pub fn register(&mut self, node: NodeId, id: BoxId) {
        let backed_by_node = self.tree.get(id).and_then(LayoutBox::node) == Some(node);
        if !ensure(backed_by_node, COMPONENT, "register with a box not generated for the node") {
            return;
        }
        if !ensure(
            !self.boxes.contains_key(&node),
            COMPONENT,
            "register for a node that already has a box",
        ) {
            return;
        }
        let _ = self.boxes.insert(node, id);
    }

    /// Forget the box of `node` and destroy it: detach it from its parent,
    /// detach its children (destroying the anonymous ones), then free it.
    /// Returns `false` if `node` had no box.
    pub fn remove_box_for(&mut self, node: NodeId) -> bool {
        let Some(id) = self.box_for(node) else {
            return false;
        };
        if id == self.tree.root() {
            invariant_violated(COMPONENT, "the root box is released with the map");
            return false;
        }
        let parent = self.tree.get(id).and_then(LayoutBox::parent);
        let mut editor = self.tree.editor();
        if let Some(parent) = parent {
            editor.remove_child(parent, id);
        }
        editor.remove_all_children(id);
        editor.destroy_box(id);
        let _ = self.boxes.remove(&node);
        true
    }

    /// Mark the box of `node` dirty, if it has one.
    pub fn mark_dirty(&mut self, node: NodeId) {
        if let Some(id) = self.box_for(node) {
            self.tree.editor().mark_dirty(id);
        }
    }
}

impl Drop for BoxMap {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        self.tree.lifecycle().shutdown();
        let root = self.tree.root();
        self.tree.editor().remove_descendants(root);
    }
}
