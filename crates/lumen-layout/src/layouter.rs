//! Flow layout over the box tree.
//!
//! [§ 9.4 Normal flow](https://www.w3.org/TR/CSS2/visuren.html#normal-flow)
//!
//! A container whose first in-flow child is inline-level lays its children
//! out horizontally; any other container stacks them vertically. Absolutely
//! positioned children are placed at their `left`/`top` offsets and take no
//! room in the flow. Bounds are relative to the parent's content box.
//!
//! Layout only descends into boxes that are changed, have a changed
//! descendant, or were resized by their parent.

use crate::boxes::{BoxId, BoxKind, BoxTree, LayoutBox};
use crate::geometry::{Point, Rect, Size};
use crate::lifecycle::{LifecycleError, Phase};
use crate::style::Position;
use crate::text::TextShaper;

/// Knobs for [`Layouter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Wrap text to the width of its containing block. When off, every
    /// text run is laid out on a single line.
    pub wrap_text: bool,
    /// Ascent relative to font size, used to place the text baseline.
    pub ascent_ratio: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            wrap_text: true,
            ascent_ratio: 0.8,
        }
    }
}

/// Computes bounds for every box that needs layout.
pub struct Layouter<'a> {
    shaper: &'a dyn TextShaper,
    config: LayoutConfig,
}

impl<'a> Layouter<'a> {
    /// A layouter with the default configuration.
    #[must_use]
    pub fn new(shaper: &'a dyn TextShaper) -> Self {
        Self::with_config(shaper, LayoutConfig::default())
    }

    /// A layouter with an explicit configuration.
    #[must_use]
    pub fn with_config(shaper: &'a dyn TextShaper, config: LayoutConfig) -> Self {
        Self { shaper, config }
    }

    /// Lay out `tree` inside the layout phase. Returns `false` when the tree
    /// was already layout-clean and nothing ran.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] when the layout phase cannot be entered.
    pub fn layout(&self, tree: &mut BoxTree) -> Result<bool, LifecycleError> {
        if tree.is_layout_clean() {
            return Ok(false);
        }
        let lifecycle = tree.lifecycle_handle();
        let _scope = lifecycle.start(Phase::InLayout)?;
        let root = tree.root();
        self.layout_children(tree, root);
        #[cfg(feature = "box-trace")]
        eprintln!("[BOX TRACE] layout done, version={}", tree.version());
        Ok(true)
    }

    fn needs_layout(layout_box: &LayoutBox) -> bool {
        layout_box.is_changed() || layout_box.is_child_changed() || layout_box.is_size_changed()
    }

    fn layout_box(&self, tree: &mut BoxTree, id: BoxId, is_resized: bool) {
        if !is_resized && !Self::needs_layout(&tree[id]) {
            return;
        }
        match tree[id].kind() {
            BoxKind::Flow(_) | BoxKind::Root(_) => self.layout_children(tree, id),
            BoxKind::Text(text) => {
                // [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
                let font_size = text.font().size;
                let line_height = match text.text_format() {
                    Some(format) => format.line_height(),
                    None => self.shaper.create_format(text.font()).line_height(),
                };
                let baseline = (line_height - font_size) / 2.0 + font_size * self.config.ascent_ratio;
                let mut editor = tree.editor();
                editor.set_baseline(id, baseline);
                editor.allocate_text_layout(id, self.shaper);
            }
            BoxKind::Image(_) | BoxKind::Shape(_) => {}
        }
    }

    fn layout_children(&self, tree: &mut BoxTree, container: BoxId) {
        let available_width = tree[container].content_bounds().width;
        let children: Vec<BoxId> = tree.children(container).collect();
        let is_horizontal = children
            .iter()
            .map(|&child| &tree[child])
            .find(|child| !child.position().is_out_of_flow())
            .is_some_and(|child| child.display().is_inline_level());

        let mut cursor = Point::default();
        for child in children {
            let child_box = &tree[child];
            let margin = child_box.margin().thickness();
            let size = self.preferred_size(tree, child, available_width);
            let is_out_of_flow = child_box.position().is_out_of_flow();
            let flow_origin = if is_horizontal {
                Point::new(cursor.x + margin.left, cursor.y + margin.top)
            } else {
                Point::new(margin.left, cursor.y + margin.top)
            };
            let origin = if is_out_of_flow {
                // [§ 9.6 Absolute positioning](https://www.w3.org/TR/CSS2/visuren.html#absolute-positioning)
                Point::new(
                    child_box.left().length().unwrap_or(0.0) + margin.left,
                    child_box.top().length().unwrap_or(0.0) + margin.top,
                )
            } else {
                let (dx, dy) = relative_offset(child_box);
                Point::new(flow_origin.x + dx, flow_origin.y + dy)
            };
            let old_bounds = child_box.bounds();
            let new_bounds = Rect::from_origin_size(origin, size);

            let mut editor = tree.editor();
            editor.set_bounds(child, new_bounds);
            let is_resized = old_bounds.size() != new_bounds.size();
            if !is_resized && old_bounds.origin() != new_bounds.origin() {
                editor.did_move(child);
            }
            self.layout_box(tree, child, is_resized);

            if is_out_of_flow {
                continue;
            }
            // Relative offsets do not move the flow cursor.
            let flow_bounds = Rect::from_origin_size(flow_origin, size);
            if is_horizontal {
                cursor.x = flow_bounds.right() + margin.right;
            } else {
                cursor.y = flow_bounds.bottom() + margin.bottom;
            }
        }
    }

    /// Border-box size of `id` inside a containing block `available_width`
    /// wide.
    ///
    /// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    fn preferred_size(&self, tree: &BoxTree, id: BoxId, available_width: f32) -> Size {
        let layout_box = &tree[id];
        let edges = layout_box.border().thickness.size();
        let padding = layout_box.padding().thickness().size();
        let margin = layout_box.margin().thickness().size();
        let edge_width = edges.width + padding.width;
        let edge_height = edges.height + padding.height;
        let fills_width =
            !layout_box.display().is_inline_level() && !layout_box.position().is_out_of_flow();

        let content_width = match layout_box.width().length() {
            Some(width) => width,
            None if fills_width => (available_width - margin.width - edge_width).max(0.0),
            None => {
                let max_width = (available_width - margin.width - edge_width).max(0.0);
                self.content_size(tree, id, max_width).width
            }
        };
        let content_height = layout_box
            .height()
            .length()
            .unwrap_or_else(|| self.content_size(tree, id, content_width).height);
        Size::new(content_width + edge_width, content_height + edge_height)
    }

    /// Natural content size of `id` when given at most `max_width`.
    fn content_size(&self, tree: &BoxTree, id: BoxId, max_width: f32) -> Size {
        match tree[id].kind() {
            BoxKind::Text(text) => {
                let format = text
                    .text_format()
                    .cloned()
                    .unwrap_or_else(|| self.shaper.create_format(text.font()));
                let wrap_width = if self.config.wrap_text { max_width } else { 0.0 };
                self.shaper.shape(text.text(), &format, wrap_width).size()
            }
            BoxKind::Image(image) => image.intrinsic_size(),
            BoxKind::Shape(shape) => shape.bounding_box().size(),
            BoxKind::Flow(_) | BoxKind::Root(_) => self.flow_content_size(tree, id, max_width),
        }
    }

    fn flow_content_size(&self, tree: &BoxTree, container: BoxId, max_width: f32) -> Size {
        let in_flow: Vec<BoxId> = tree
            .children(container)
            .filter(|&child| !tree[child].position().is_out_of_flow())
            .collect();
        let is_horizontal = in_flow
            .first()
            .is_some_and(|&child| tree[child].display().is_inline_level());
        let mut size = Size::default();
        for child in in_flow {
            let margin = tree[child].margin().thickness().size();
            let child_size = self.preferred_size(tree, child, max_width);
            let outer = Size::new(child_size.width + margin.width, child_size.height + margin.height);
            if is_horizontal {
                size.width += outer.width;
                size.height = size.height.max(outer.height);
            } else {
                size.width = size.width.max(outer.width);
                size.height += outer.height;
            }
        }
        size
    }
}

/// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
fn relative_offset(layout_box: &LayoutBox) -> (f32, f32) {
    if layout_box.position() != Position::Relative {
        return (0.0, 0.0);
    }
    (
        layout_box.left().length().unwrap_or(0.0),
        layout_box.top().length().unwrap_or(0.0),
    )
}
