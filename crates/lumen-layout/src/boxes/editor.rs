//! The mutation gateway for the box tree.
//!
//! Every structural, style, and dirty-state change to a box goes through a
//! [`BoxEditor`]. Each operation first checks the phase of the tree's
//! [`ViewLifecycle`](crate::lifecycle::ViewLifecycle):
//!
//! | Operation | Allowed when |
//! |---|---|
//! | structure, style, dirty marking, content, viewport, selection | `allows_tree_mutations()` |
//! | `set_bounds`, `did_move`, `set_baseline`, `allocate_text_layout` | `in_layout()` |
//! | `set_should_paint` | not `in_paint()` |
//! | `did_paint` | `in_paint()` |
//!
//! Calling an operation in the wrong phase, or with arguments that would
//! break the tree's shape, is a bug in the caller and is reported through
//! [`invariant_violated`]; release builds skip the operation.

use lumen_common::invariant::{ensure, invariant_violated};

use super::{
    BoxId, BoxKind, BoxSelection, BoxSelectionEditor, BoxTree, ChangeFlags, ImageBitmap,
    LayoutBox, ShapeData,
};
use crate::geometry::{Color, Rect, Size};
use crate::style::Style;
use crate::text::TextShaper;

const COMPONENT: &str = "BoxEditor";

/// Mutable access to a [`BoxTree`], obtained from [`BoxTree::editor`].
#[derive(Debug)]
pub struct BoxEditor<'a> {
    tree: &'a mut BoxTree,
}

impl<'a> BoxEditor<'a> {
    pub(super) const fn new(tree: &'a mut BoxTree) -> Self {
        Self { tree }
    }

    // Phase checks

    fn check_tree_mutation(&self, operation: &str) -> bool {
        let lifecycle = self.tree.lifecycle();
        if lifecycle.allows_tree_mutations() {
            return true;
        }
        invariant_violated(
            COMPONENT,
            &format!("{operation} is not allowed in {}", lifecycle.phase()),
        );
        false
    }

    fn check_in_layout(&self, operation: &str) -> bool {
        let lifecycle = self.tree.lifecycle();
        if lifecycle.in_layout() {
            return true;
        }
        invariant_violated(
            COMPONENT,
            &format!("{operation} is only allowed in layout, not {}", lifecycle.phase()),
        );
        false
    }

    fn check_not_in_paint(&self, operation: &str) -> bool {
        ensure(
            !self.tree.lifecycle().in_paint(),
            COMPONENT,
            &format!("{operation} is not allowed in paint"),
        )
    }

    fn check_in_paint(&self, operation: &str) -> bool {
        ensure(
            self.tree.lifecycle().in_paint(),
            COMPONENT,
            &format!("{operation} is only allowed in paint"),
        )
    }

    fn live_box_mut(&mut self, id: BoxId) -> Option<&mut LayoutBox> {
        let found = self.tree.get_mut(id);
        if found.is_none() {
            invariant_violated(COMPONENT, &format!("{id} refers to a destroyed box"));
        }
        found
    }

    fn schedule_visual_update_if_needed(&self, id: BoxId) {
        if self.tree.in_document(id) {
            self.tree.lifecycle().schedule_visual_update();
        }
    }

    // Structure

    /// Link `new_child` as the last child of `container`.
    ///
    /// `new_child` must be detached, `container` must be a container kind,
    /// and neither may be a descendant of the other.
    pub fn append_child(&mut self, container: BoxId, new_child: BoxId) {
        if !self.check_tree_mutation("append_child") {
            return;
        }
        let (Some(parent_box), Some(child_box)) = (self.tree.get(container), self.tree.get(new_child))
        else {
            invariant_violated(COMPONENT, "append_child with a destroyed box");
            return;
        };
        if !ensure(parent_box.is_container(), COMPONENT, "append_child target is not a container") {
            return;
        }
        let would_cycle = container == new_child
            || self.tree.is_descendant_of(container, new_child)
            || self.tree.is_descendant_of(new_child, container);
        if !ensure(!would_cycle, COMPONENT, "append_child would create a cycle") {
            return;
        }
        let is_detached = child_box.parent.is_none()
            && child_box.next_sibling.is_none()
            && child_box.previous_sibling.is_none();
        if !ensure(is_detached, COMPONENT, "append_child with an attached child") {
            return;
        }
        if !ensure(new_child != self.tree.root, COMPONENT, "the root box cannot be a child") {
            return;
        }

        let old_last_child = parent_box.last_child();
        if let Some(child_box) = self.tree.get_mut(new_child) {
            child_box.parent = Some(container);
            child_box.previous_sibling = old_last_child;
        }
        if let Some(old_last_child) = old_last_child {
            if let Some(sibling) = self.tree.get_mut(old_last_child) {
                sibling.next_sibling = Some(new_child);
            }
        }
        if let Some(data) = self.tree.get_mut(container).and_then(LayoutBox::container_mut) {
            if data.first_child.is_none() {
                data.first_child = Some(new_child);
            }
            data.last_child = Some(new_child);
        }

        self.mark_dirty_unchecked(container);
        let version = self.tree[container].version;
        if let Some(child_box) = self.tree.get_mut(new_child) {
            child_box.version = version;
        }
        #[cfg(feature = "box-trace")]
        eprintln!("[BOX TRACE] append_child {new_child} -> {container}");
    }

    /// Unlink `old_child` from `container`. The child stays alive.
    pub fn remove_child(&mut self, container: BoxId, old_child: BoxId) {
        if !self.check_tree_mutation("remove_child") {
            return;
        }
        let Some(child_box) = self.tree.get(old_child) else {
            invariant_violated(COMPONENT, "remove_child with a destroyed box");
            return;
        };
        if !ensure(
            child_box.parent == Some(container),
            COMPONENT,
            "remove_child on a box that is not a child of the container",
        ) {
            return;
        }
        let next_sibling = child_box.next_sibling;
        let previous_sibling = child_box.previous_sibling;

        match next_sibling {
            Some(next) => {
                if let Some(next_box) = self.tree.get_mut(next) {
                    next_box.previous_sibling = previous_sibling;
                }
            }
            None => {
                if let Some(data) = self.tree.get_mut(container).and_then(LayoutBox::container_mut) {
                    data.last_child = previous_sibling;
                }
            }
        }
        match previous_sibling {
            Some(previous) => {
                if let Some(previous_box) = self.tree.get_mut(previous) {
                    previous_box.next_sibling = next_sibling;
                }
            }
            None => {
                if let Some(data) = self.tree.get_mut(container).and_then(LayoutBox::container_mut) {
                    data.first_child = next_sibling;
                }
            }
        }
        if let Some(child_box) = self.tree.get_mut(old_child) {
            child_box.parent = None;
            child_box.next_sibling = None;
            child_box.previous_sibling = None;
        }

        self.mark_dirty_unchecked(container);
        #[cfg(feature = "box-trace")]
        eprintln!("[BOX TRACE] remove_child {old_child} <- {container}");
    }

    /// Detach every child of `container`. Anonymous children are destroyed
    /// along with their anonymous descendants; node-backed children are
    /// left alive for their owner to reuse or destroy.
    pub fn remove_all_children(&mut self, container: BoxId) {
        if !self.check_tree_mutation("remove_all_children") {
            return;
        }
        while let Some(child) = self.tree.get(container).and_then(LayoutBox::first_child) {
            self.remove_child(container, child);
            if self.tree[child].is_anonymous() {
                self.remove_all_children(child);
                self.destroy_box(child);
            }
        }
    }

    /// Detach the whole subtree under `container`, depth first, with the
    /// same destruction rule as [`BoxEditor::remove_all_children`].
    pub fn remove_descendants(&mut self, container: BoxId) {
        if !self.check_tree_mutation("remove_descendants") {
            return;
        }
        while let Some(child) = self.tree.get(container).and_then(LayoutBox::first_child) {
            self.remove_descendants(child);
            self.remove_child(container, child);
            if self.tree[child].is_anonymous() {
                self.destroy_box(child);
            }
        }
    }

    /// Free a detached box. Containers must be emptied first and the root
    /// is never destroyed. A selection with an end in the box is cleared.
    pub fn destroy_box(&mut self, id: BoxId) {
        if !self.check_tree_mutation("destroy_box") {
            return;
        }
        let is_selected = self.tree.selection().touches(id);
        if !self.tree.free_box(id) || !is_selected {
            return;
        }
        let mut selection = self.tree.selection().clone();
        BoxSelectionEditor::clear(&mut selection);
        self.set_selection(selection);
    }

    // Dirty tracking

    /// Record that `id` changed: bump the tree version, stamp it on the box,
    /// request a frame, and flag ancestors as having a changed child.
    pub fn mark_dirty(&mut self, id: BoxId) {
        if !self.check_tree_mutation("mark_dirty") {
            return;
        }
        if self.live_box_mut(id).is_none() {
            return;
        }
        self.mark_dirty_unchecked(id);
    }

    fn mark_dirty_unchecked(&mut self, id: BoxId) {
        let root = self.tree.root;
        let Some(root_box) = self.tree.get_mut(root) else {
            return;
        };
        root_box.version += 1;
        let version = root_box.version;
        let Some(layout_box) = self.tree.get_mut(id) else {
            return;
        };
        layout_box.version = version;
        layout_box.flags.changed = true;
        let mut runner = layout_box.parent;
        self.schedule_visual_update_if_needed(id);

        // Stop at the first ancestor that already knows.
        while let Some(ancestor) = runner {
            let Some(ancestor_box) = self.tree.get_mut(ancestor) else {
                break;
            };
            if ancestor_box.flags.changed || ancestor_box.is_child_changed() {
                break;
            }
            if let Some(data) = ancestor_box.container_mut() {
                data.is_child_changed = true;
            }
            runner = ancestor_box.parent;
        }
        #[cfg(feature = "box-trace")]
        eprintln!("[BOX TRACE] mark_dirty {id} version={version}");
    }

    /// Flag a leaf's content as changed and mark it dirty.
    pub fn set_content_changed(&mut self, id: BoxId) {
        if !self.check_tree_mutation("set_content_changed") {
            return;
        }
        let Some(layout_box) = self.live_box_mut(id) else {
            return;
        };
        if !ensure(!layout_box.is_container(), COMPONENT, "set_content_changed on a container") {
            return;
        }
        layout_box.flags.content = true;
        self.mark_dirty_unchecked(id);
    }

    /// Request a repaint of `id` and its ancestors, stopping at the first
    /// one that already has the request.
    pub fn set_should_paint(&mut self, id: BoxId) {
        if !self.check_not_in_paint("set_should_paint") {
            return;
        }
        let mut runner = Some(id);
        while let Some(current) = runner {
            let Some(layout_box) = self.tree.get_mut(current) else {
                break;
            };
            if layout_box.flags.should_paint {
                break;
            }
            layout_box.flags.should_paint = true;
            runner = layout_box.parent;
        }
    }

    /// Record that layout moved `id` without resizing it.
    pub fn did_move(&mut self, id: BoxId) {
        if !self.check_in_layout("did_move") {
            return;
        }
        let Some(layout_box) = self.live_box_mut(id) else {
            return;
        };
        layout_box.flags.origin = true;
        self.set_should_paint(id);
    }

    /// Clear every change flag of `id` after painting it.
    pub fn did_paint(&mut self, id: BoxId) {
        if !self.check_in_paint("did_paint") {
            return;
        }
        let Some(layout_box) = self.live_box_mut(id) else {
            return;
        };
        layout_box.flags = ChangeFlags::default();
        match &mut layout_box.kind {
            BoxKind::Flow(data) => data.is_child_changed = false,
            BoxKind::Root(root) => {
                root.container.is_child_changed = false;
                root.is_selection_changed = false;
            }
            BoxKind::Text(_) | BoxKind::Image(_) | BoxKind::Shape(_) => {}
        }
    }

    // Geometry

    /// Set the border box of `id`, relative to its parent's content box.
    pub fn set_bounds(&mut self, id: BoxId, new_bounds: Rect) {
        if !self.check_in_layout("set_bounds") {
            return;
        }
        let Some(layout_box) = self.live_box_mut(id) else {
            return;
        };
        let old_bounds = layout_box.bounds;
        if old_bounds == new_bounds {
            return;
        }
        if old_bounds.origin() != new_bounds.origin() {
            layout_box.flags.origin = true;
        }
        let is_size_changed = old_bounds.size() != new_bounds.size();
        if is_size_changed {
            layout_box.flags.background = true;
            layout_box.flags.size = true;
            if layout_box.border.has_value() {
                layout_box.flags.border = true;
            }
        }
        layout_box.bounds = new_bounds;
        Self::did_change_bounds(layout_box, is_size_changed);
    }

    fn did_change_bounds(layout_box: &mut LayoutBox, is_size_changed: bool) {
        if let BoxKind::Text(text) = &mut layout_box.kind {
            if is_size_changed {
                text.text_layout = None;
            }
        }
    }

    /// Resize the viewport; the root's bounds follow.
    pub fn set_viewport_size(&mut self, size: Size) {
        if !self.check_tree_mutation("set_viewport_size") {
            return;
        }
        if self.tree.viewport_size() == size {
            return;
        }
        let root = self.tree.root;
        let Some(root_box) = self.tree.get_mut(root) else {
            return;
        };
        root_box.bounds = Rect::from_size(size);
        root_box.flags.size = true;
        if let BoxKind::Root(data) = &mut root_box.kind {
            data.viewport_size = size;
        }
        self.schedule_visual_update_if_needed(root);
    }

    // Style

    /// Push resolved style properties into `id`.
    ///
    /// Only present properties that differ from the box's current values
    /// are applied; if none do, nothing is marked dirty.
    pub fn set_style(&mut self, id: BoxId, style: &Style) {
        if !self.check_tree_mutation("set_style") {
            return;
        }
        let Some(layout_box) = self.live_box_mut(id) else {
            return;
        };
        let is_changed = if let BoxKind::Text(text) = &mut layout_box.kind {
            let mut is_changed = false;
            if let Some(color) = style.color {
                if color != text.color {
                    text.color = color;
                    is_changed = true;
                }
            }
            if text.font.apply_style(style) {
                text.text_format = None;
                text.text_layout = None;
                is_changed = true;
            }
            if is_changed {
                layout_box.flags.content = true;
            }
            is_changed
        } else {
            Self::apply_box_style(layout_box, style)
        };
        if is_changed {
            self.mark_dirty_unchecked(id);
        }
    }

    fn apply_box_style(layout_box: &mut LayoutBox, style: &Style) -> bool {
        let mut is_changed = false;
        macro_rules! apply {
            ($($field:ident => $flag:ident),* $(,)?) => {
                $(
                    if let Some(value) = style.$field {
                        if value != layout_box.$field {
                            layout_box.$field = value;
                            layout_box.flags.$flag = true;
                            is_changed = true;
                        }
                    }
                )*
            };
        }
        apply! {
            background => background,
            border => border,
            padding => padding,
            margin => origin,
            position => origin,
            top => origin,
            left => origin,
            right => origin,
            bottom => origin,
            width => size,
            height => size,
        }
        if let Some(display) = style.display {
            if display != layout_box.display {
                layout_box.display = display;
                is_changed = true;
            }
        }
        is_changed
    }

    // Selection

    /// Install a new selection value.
    pub fn set_selection(&mut self, selection: BoxSelection) {
        if !self.check_tree_mutation("set_selection") {
            return;
        }
        let root = self.tree.root;
        let Some(BoxKind::Root(data)) = self.tree.get_mut(root).map(|root_box| &mut root_box.kind)
        else {
            return;
        };
        if data.selection == selection {
            return;
        }
        data.selection = selection;
        data.is_selection_changed = true;
        self.schedule_visual_update_if_needed(root);
    }

    // Leaf content

    /// Replace the text of a text box.
    pub fn set_text(&mut self, id: BoxId, new_text: &str) {
        if !self.check_tree_mutation("set_text") {
            return;
        }
        let Some(layout_box) = self.live_box_mut(id) else {
            return;
        };
        let BoxKind::Text(text) = &mut layout_box.kind else {
            invariant_violated(COMPONENT, "set_text on a box that is not a text box");
            return;
        };
        if text.text == new_text {
            return;
        }
        new_text.clone_into(&mut text.text);
        text.text_layout = None;
        let length = text.content_length();
        self.set_content_changed(id);
        if let Some(clamped) = self.tree.selection().clamped_to(id, length) {
            self.set_selection(clamped);
        }
    }

    /// Set the color a text box is drawn in.
    pub fn set_text_color(&mut self, id: BoxId, color: Color) {
        if !self.check_tree_mutation("set_text_color") {
            return;
        }
        let Some(layout_box) = self.live_box_mut(id) else {
            return;
        };
        let BoxKind::Text(text) = &mut layout_box.kind else {
            invariant_violated(COMPONENT, "set_text_color on a box that is not a text box");
            return;
        };
        if text.color == color {
            return;
        }
        text.color = color;
        self.set_content_changed(id);
    }

    /// Record the baseline computed by layout.
    pub fn set_baseline(&mut self, id: BoxId, baseline: f32) {
        if !self.check_in_layout("set_baseline") {
            return;
        }
        let Some(layout_box) = self.live_box_mut(id) else {
            return;
        };
        let BoxKind::Text(text) = &mut layout_box.kind else {
            invariant_violated(COMPONENT, "set_baseline on a box that is not a text box");
            return;
        };
        if text.baseline == baseline {
            return;
        }
        text.baseline = baseline;
        layout_box.flags.content = true;
        self.set_should_paint(id);
    }

    /// Shape the text of `id` to its content width, unless a shaped layout
    /// is already cached.
    pub fn allocate_text_layout(&mut self, id: BoxId, shaper: &dyn TextShaper) {
        if !self.check_in_layout("allocate_text_layout") {
            return;
        }
        let Some(layout_box) = self.live_box_mut(id) else {
            return;
        };
        let max_width = layout_box.content_bounds().width;
        let BoxKind::Text(text) = &mut layout_box.kind else {
            invariant_violated(COMPONENT, "allocate_text_layout on a box that is not a text box");
            return;
        };
        if text.text_layout.is_some() {
            return;
        }
        let format = text
            .text_format
            .get_or_insert_with(|| shaper.create_format(&text.font));
        text.text_layout = Some(shaper.shape(&text.text, format, max_width));
    }

    /// Replace the image of an image box.
    pub fn set_image(&mut self, id: BoxId, image: ImageBitmap) {
        if !self.check_tree_mutation("set_image") {
            return;
        }
        let Some(layout_box) = self.live_box_mut(id) else {
            return;
        };
        let BoxKind::Image(current) = &mut layout_box.kind else {
            invariant_violated(COMPONENT, "set_image on a box that is not an image box");
            return;
        };
        if *current == image {
            return;
        }
        *current = image;
        self.set_content_changed(id);
    }

    /// Replace the shape of a shape box.
    pub fn set_shape(&mut self, id: BoxId, shape: ShapeData) {
        if !self.check_tree_mutation("set_shape") {
            return;
        }
        let Some(layout_box) = self.live_box_mut(id) else {
            return;
        };
        let BoxKind::Shape(current) = &mut layout_box.kind else {
            invariant_violated(COMPONENT, "set_shape on a box that is not a shape box");
            return;
        };
        if *current == shape {
            return;
        }
        *current = shape;
        self.set_content_changed(id);
    }
}
