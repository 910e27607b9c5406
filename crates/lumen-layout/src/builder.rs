//! Box generation from the document.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! [`BoxTreeBuilder`] walks a [`Document`] and brings a [`BoxMap`] up to
//! date: it reuses the box already generated for a node, pushes the
//! resolved style through [`BoxEditor::set_style`](crate::boxes::BoxEditor::set_style),
//! and only relinks a container's children when the generated child list
//! actually differs. Because `set_style` ignores unchanged values, a rebuild
//! over an unchanged document leaves every box clean.

use lumen_dom::{Document, NodeId, NodeType};

use crate::box_map::BoxMap;
use crate::boxes::{BoxId, BoxTree, LayoutBox};
use crate::lifecycle::{LifecycleError, Phase};
use crate::style::{Display, StyleResolver};

/// A generated child of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChildSlot {
    Box(BoxId),
    // A run of inline-level boxes wrapped in an anonymous block.
    AnonymousBlock(Vec<BoxId>),
}

/// Builds and updates the box tree of one document.
pub struct BoxTreeBuilder<'a> {
    document: &'a Document,
    resolver: &'a dyn StyleResolver,
}

impl<'a> BoxTreeBuilder<'a> {
    /// A builder reading `document` and styling it through `resolver`.
    #[must_use]
    pub fn new(document: &'a Document, resolver: &'a dyn StyleResolver) -> Self {
        Self { document, resolver }
    }

    /// Bring `map` up to date with the document.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] when the tree-rebuild phase cannot be
    /// entered, for example while layout results are still being consumed.
    pub fn update(&self, map: &mut BoxMap) -> Result<(), LifecycleError> {
        let lifecycle = map.tree().lifecycle_handle();
        let _scope = lifecycle.start(Phase::InTreeRebuild)?;
        let root = map.tree().root();
        self.update_children(map, self.document.root(), root);
        Ok(())
    }

    /// The box for `node` after updating it, or `None` if the node generates
    /// no box.
    fn update_node(&self, map: &mut BoxMap, node: NodeId) -> Option<BoxId> {
        match &self.document.get(node)?.node_type {
            NodeType::Document => None,
            NodeType::Text(data) => {
                // [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
                //
                // Whitespace-only runs between blocks collapse away.
                if data.trim().is_empty() {
                    self.release(map, node);
                    return None;
                }
                let id = if let Some(id) = map.box_for(node) {
                    map.tree_mut().editor().set_text(id, data);
                    id
                } else {
                    let id = map.tree_mut().create_text_box(Some(node), data);
                    map.register(node, id);
                    id
                };
                let style = self.resolver.computed_style_of(node);
                map.tree_mut().editor().set_style(id, &style);
                Some(id)
            }
            NodeType::Element(_) => {
                let style = self.resolver.computed_style_of(node);
                // [§ 2.5 Box Generation](https://www.w3.org/TR/css-display-3/#box-generation)
                //
                // "none: The element and its descendants generate no boxes or
                // text runs."
                if style.display == Some(Display::None) {
                    self.release(map, node);
                    return None;
                }
                let id = if let Some(id) = map.box_for(node) {
                    id
                } else {
                    let id = map.tree_mut().create_flow_box(Some(node));
                    map.register(node, id);
                    id
                };
                map.tree_mut().editor().set_style(id, &style);
                self.update_children(map, node, id);
                Some(id)
            }
        }
    }

    /// Regenerate the children of `container` from the children of `node`.
    fn update_children(&self, map: &mut BoxMap, node: NodeId, container: BoxId) {
        // STEP 1: Release the boxes of former children that left the
        // document.
        self.release_disconnected(map, container);

        // STEP 2: Update every child node, collecting the boxes they
        // generate.
        let child_boxes: Vec<BoxId> = self
            .document
            .children(node)
            .iter()
            .filter_map(|&child| self.update_node(map, child))
            .collect();

        // STEP 3: Wrap inline runs when block and inline siblings mix.
        // [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
        //
        // "if a block container box has a block-level box inside it, then we
        // force it to have only block-level boxes inside it."
        let slots = Self::child_slots(map.tree(), &child_boxes);

        // STEP 4: Relink only when the shape differs.
        if Self::matches_current(map.tree(), container, &slots) {
            return;
        }
        let tree = map.tree_mut();
        tree.editor().remove_all_children(container);
        for slot in slots {
            match slot {
                ChildSlot::Box(child) => Self::attach(tree, container, child),
                ChildSlot::AnonymousBlock(children) => {
                    let anonymous = tree.create_flow_box(None);
                    for child in children {
                        Self::attach(tree, anonymous, child);
                    }
                    tree.editor().append_child(container, anonymous);
                }
            }
        }
    }

    fn child_slots(tree: &BoxTree, child_boxes: &[BoxId]) -> Vec<ChildSlot> {
        let is_inline = |id: BoxId| tree[id].display().is_inline_level();
        let has_inline = child_boxes.iter().any(|&id| is_inline(id));
        let has_block = child_boxes.iter().any(|&id| !is_inline(id));
        if !(has_inline && has_block) {
            return child_boxes.iter().copied().map(ChildSlot::Box).collect();
        }
        let mut slots = Vec::new();
        for &id in child_boxes {
            if !is_inline(id) {
                slots.push(ChildSlot::Box(id));
                continue;
            }
            if let Some(ChildSlot::AnonymousBlock(run)) = slots.last_mut() {
                run.push(id);
            } else {
                slots.push(ChildSlot::AnonymousBlock(vec![id]));
            }
        }
        slots
    }

    fn matches_current(tree: &BoxTree, container: BoxId, slots: &[ChildSlot]) -> bool {
        let mut current = tree.children(container);
        for slot in slots {
            let Some(child) = current.next() else {
                return false;
            };
            let is_same = match slot {
                ChildSlot::Box(id) => child == *id,
                ChildSlot::AnonymousBlock(run) => {
                    tree[child].is_anonymous() && tree.children(child).eq(run.iter().copied())
                }
            };
            if !is_same {
                return false;
            }
        }
        current.next().is_none()
    }

    fn attach(tree: &mut BoxTree, container: BoxId, child: BoxId) {
        if let Some(parent) = tree.get(child).and_then(LayoutBox::parent) {
            tree.editor().remove_child(parent, child);
        }
        tree.editor().append_child(container, child);
    }

    fn release_disconnected(&self, map: &mut BoxMap, container: BoxId) {
        let tree = map.tree();
        let stale: Vec<NodeId> = tree
            .children(container)
            .flat_map(|child| {
                if tree[child].is_anonymous() {
                    tree.children(child).collect()
                } else {
                    vec![child]
                }
            })
            .filter_map(|child| tree[child].node())
            .filter(|&child| !self.document.is_connected(child))
            .collect();
        for node in stale {
            self.release(map, node);
        }
    }

    /// Destroy the boxes of `node` and everything under it.
    fn release(&self, map: &mut BoxMap, node: NodeId) {
        for descendant in self.document.descendants_or_self(node) {
            let _ = map.remove_box_for(descendant);
        }
    }
}
