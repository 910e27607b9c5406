use std::ops::Index;
use std::rc::Rc;

use lumen_common::invariant::{ensure, invariant_violated};
use lumen_dom::NodeId;

use super::arena::{BoxArena, BoxId};
use super::{
    BoxEditor, BoxKind, BoxSelection, ContainerData, ImageBitmap, LayoutBox, RootData, ShapeData,
    TextData,
};
use crate::geometry::Size;
use crate::lifecycle::ViewLifecycle;

const COMPONENT: &str = "BoxTree";

/// A box tree: the arena holding every box plus the unique root.
///
/// Reading is open to anyone holding `&BoxTree`. Mutation goes through
/// [`BoxTree::editor`], and the editor consults the root's
/// [`ViewLifecycle`] before every write.
#[derive(Debug)]
pub struct BoxTree {
    pub(super) arena: BoxArena,
    pub(super) root: BoxId,
    next_sequence_id: u32,
}

impl BoxTree {
    /// A tree holding only an anonymous root box.
    #[must_use]
    pub fn new(lifecycle: Rc<ViewLifecycle>) -> Self {
        Self::with_root_node(lifecycle, None)
    }

    /// A tree whose root box represents `document`.
    #[must_use]
    pub fn for_document(lifecycle: Rc<ViewLifecycle>, document: NodeId) -> Self {
        Self::with_root_node(lifecycle, Some(document))
    }

    fn with_root_node(lifecycle: Rc<ViewLifecycle>, node: Option<NodeId>) -> Self {
        let mut arena = BoxArena::new();
        let root = arena.insert_with(|id| {
            LayoutBox::new(id, id, 0, node, BoxKind::Root(RootData::new(lifecycle)))
        });
        Self {
            arena,
            root,
            next_sequence_id: 1,
        }
    }

    /// The root box's id.
    #[must_use]
    pub const fn root(&self) -> BoxId {
        self.root
    }

    /// The root box.
    #[must_use]
    pub fn root_box(&self) -> &LayoutBox {
        &self[self.root]
    }

    pub(super) fn root_data(&self) -> &RootData {
        match self.root_box().as_root() {
            Some(root) => root,
            None => unreachable!("the root slot always holds a root box"),
        }
    }

    /// The box behind `id`, or `None` if it was destroyed.
    #[must_use]
    pub fn get(&self, id: BoxId) -> Option<&LayoutBox> {
        self.arena.get(id)
    }

    pub(super) fn get_mut(&mut self, id: BoxId) -> Option<&mut LayoutBox> {
        self.arena.get_mut(id)
    }

    /// True if `id` refers to a live box.
    #[must_use]
    pub fn contains(&self, id: BoxId) -> bool {
        self.arena.contains(id)
    }

    /// Number of live boxes, the root included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.arena.len()
    }

    /// A tree always holds its root.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Every live box, attached or not, in slot order.
    pub fn boxes(&self) -> impl Iterator<Item = &LayoutBox> {
        self.arena.iter()
    }

    /// The phase gate consulted by the editor.
    #[must_use]
    pub fn lifecycle(&self) -> &ViewLifecycle {
        self.root_data().lifecycle()
    }

    /// A shared handle to the phase gate, for drivers that need to start a
    /// phase while they hold the tree mutably.
    #[must_use]
    pub fn lifecycle_handle(&self) -> Rc<ViewLifecycle> {
        Rc::clone(&self.root_data().lifecycle)
    }

    /// The viewport the root covers.
    #[must_use]
    pub fn viewport_size(&self) -> Size {
        self.root_data().viewport_size()
    }

    /// The current selection.
    #[must_use]
    pub fn selection(&self) -> &BoxSelection {
        self.root_data().selection()
    }

    /// True when the selection changed since the last paint.
    #[must_use]
    pub fn is_selection_changed(&self) -> bool {
        self.root_data().is_selection_changed()
    }

    /// The tree-wide version counter, bumped by every `mark_dirty`.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.root_box().version()
    }

    /// Create a detached flow box.
    pub fn create_flow_box(&mut self, node: Option<NodeId>) -> BoxId {
        self.create_box(node, BoxKind::Flow(ContainerData::default()))
    }

    /// Create a detached text box holding `text`.
    pub fn create_text_box(&mut self, node: Option<NodeId>, text: &str) -> BoxId {
        self.create_box(node, BoxKind::Text(TextData::new(text)))
    }

    /// Create a detached image box.
    pub fn create_image_box(&mut self, node: Option<NodeId>, image: ImageBitmap) -> BoxId {
        self.create_box(node, BoxKind::Image(image))
    }

    /// Create a detached shape box.
    pub fn create_shape_box(&mut self, node: Option<NodeId>, shape: ShapeData) -> BoxId {
        self.create_box(node, BoxKind::Shape(shape))
    }

    fn create_box(&mut self, node: Option<NodeId>, kind: BoxKind) -> BoxId {
        let root = self.root;
        let sequence_id = self.next_sequence_id;
        self.next_sequence_id += 1;
        let id = self
            .arena
            .insert_with(|id| LayoutBox::new(id, root, sequence_id, node, kind));
        #[cfg(feature = "box-trace")]
        eprintln!("[BOX TRACE] create {id} seq={sequence_id} node={node:?}");
        id
    }

    /// Free a box. It must be detached and, if a container, childless; the
    /// root is never destroyed. Returns `false` when the box was kept.
    pub(super) fn free_box(&mut self, id: BoxId) -> bool {
        let Some(layout_box) = self.arena.get(id) else {
            invariant_violated(COMPONENT, "destroy_box on a destroyed box");
            return false;
        };
        if !ensure(id != self.root, COMPONENT, "the root box cannot be destroyed") {
            return false;
        }
        let is_detached = layout_box.parent.is_none()
            && layout_box.next_sibling.is_none()
            && layout_box.previous_sibling.is_none();
        if !ensure(is_detached, COMPONENT, "destroy_box on an attached box") {
            return false;
        }
        if !ensure(
            layout_box.first_child().is_none(),
            COMPONENT,
            "destroy_box on a container with children",
        ) {
            return false;
        }
        let _ = self.arena.remove(id);
        #[cfg(feature = "box-trace")]
        eprintln!("[BOX TRACE] destroy {id}");
        true
    }

    /// True if `ancestor` is a proper ancestor of `id`.
    #[must_use]
    pub fn is_descendant_of(&self, id: BoxId, ancestor: BoxId) -> bool {
        self.ancestors(id).any(|runner| runner == ancestor)
    }

    /// True if `id` is reachable from the root.
    #[must_use]
    pub fn in_document(&self, id: BoxId) -> bool {
        self.ancestors_or_self(id).any(|runner| runner == self.root)
    }

    /// Nothing under the root needs layout.
    #[must_use]
    pub fn is_layout_clean(&self) -> bool {
        let root = self.root_box();
        !root.is_changed() && !root.is_child_changed() && !root.is_size_changed()
    }

    /// Nothing needs repainting.
    #[must_use]
    pub fn is_paint_clean(&self) -> bool {
        let root = self.root_box();
        self.is_layout_clean() && !root.should_paint() && !self.is_selection_changed()
    }

    /// The mutation gateway.
    pub fn editor(&mut self) -> BoxEditor<'_> {
        BoxEditor::new(self)
    }
}

impl Index<BoxId> for BoxTree {
    type Output = LayoutBox;

    /// # Panics
    ///
    /// Panics if `id` refers to a destroyed box.
    fn index(&self, id: BoxId) -> &LayoutBox {
        match self.arena.get(id) {
            Some(layout_box) => layout_box,
            None => panic!("{id} refers to a destroyed box"),
        }
    }
}
