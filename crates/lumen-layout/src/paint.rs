//! Paint driver.
//!
//! [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
//!
//! [`Painter`] turns the dirty part of a laid-out box tree into a
//! [`DisplayList`] and clears the change flags of every box it visits. Only
//! boxes whose state changed since the last paint emit items, along with
//! the descendants drawn on top of them; a renderer applies the list over
//! the previous frame.

use std::collections::HashMap;

use serde::Serialize;

use crate::boxes::{BoxId, BoxKind, BoxTree, CaretShape, ImageBitmap, LayoutBox, TextData};
use crate::geometry::{Color, Point, Rect};
use crate::lifecycle::{LifecycleError, Phase};

/// A single drawing command, in absolute coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DisplayItem {
    /// Fill a rectangle with a solid color. Used for backgrounds and border
    /// sides.
    FillRect {
        /// Area to fill.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// Draw one shaped line of text.
    DrawText {
        /// Top-left corner of the line box.
        origin: Point,
        /// Baseline offset from `origin.y`.
        baseline: f32,
        /// The characters on the line.
        text: String,
        /// Text color.
        color: Color,
        /// Font size in pixels.
        font_size: f32,
    },
    /// Draw an image scaled into a rectangle.
    DrawImage {
        /// Destination rectangle.
        rect: Rect,
        /// The image.
        image: ImageBitmap,
    },
    /// Fill a polygon.
    FillPolygon {
        /// Vertices.
        points: Vec<Point>,
        /// Fill color.
        color: Color,
    },
    /// Highlight selected text.
    FillSelection {
        /// Highlighted area.
        rect: Rect,
        /// Highlight color.
        color: Color,
    },
    /// Draw the caret.
    DrawCaret {
        /// Caret area.
        rect: Rect,
        /// Caret color.
        color: Color,
    },
}

/// The output of a paint pass, in painting order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayList {
    items: Vec<DisplayItem>,
    repainted: Vec<BoxId>,
}

impl DisplayList {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item.
    pub fn push(&mut self, item: DisplayItem) {
        self.items.push(item);
    }

    /// The items, back to front.
    #[must_use]
    pub fn items(&self) -> &[DisplayItem] {
        &self.items
    }

    /// Boxes that redrew themselves, in painting order.
    #[must_use]
    pub fn repainted(&self) -> &[BoxId] {
        &self.repainted
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing was drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Selected character spans per text box, plus the caret.
#[derive(Debug, Default)]
struct SelectionPaint {
    caret: Option<(BoxId, usize)>,
    ranges: HashMap<BoxId, (usize, usize)>,
    caret_color: Color,
    caret_shape: CaretShape,
    range_color: Color,
}

impl SelectionPaint {
    fn new(tree: &BoxTree) -> Self {
        let selection = tree.selection();
        let mut paint = Self {
            caret_color: selection.caret_color(),
            caret_shape: selection.caret_shape(),
            range_color: selection.range_color(),
            ..Self::default()
        };
        let (Some(anchor), Some(focus)) = (selection.anchor(), selection.focus()) else {
            return paint;
        };
        let (anchor_offset, focus_offset) = (selection.anchor_offset(), selection.focus_offset());
        if selection.is_caret() {
            paint.caret = Some((focus, focus_offset));
            return paint;
        }
        if anchor == focus {
            let span = (anchor_offset.min(focus_offset), anchor_offset.max(focus_offset));
            let _ = paint.ranges.insert(anchor, span);
            return paint;
        }
        // Whichever end comes first in tree order starts the range.
        let mut is_inside = false;
        for id in tree.descendants_or_self(tree.root()) {
            let length = tree[id].content_length();
            let endpoint_offset = if id == anchor {
                Some(anchor_offset)
            } else if id == focus {
                Some(focus_offset)
            } else {
                None
            };
            match endpoint_offset {
                Some(offset) if is_inside => {
                    let _ = paint.ranges.insert(id, (0, offset));
                    break;
                }
                Some(offset) => {
                    is_inside = true;
                    let _ = paint.ranges.insert(id, (offset, length));
                }
                None if is_inside && tree[id].as_text().is_some() => {
                    let _ = paint.ranges.insert(id, (0, length));
                }
                None => {}
            }
        }
        paint
    }
}

/// Walks dirty boxes and produces a [`DisplayList`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Painter;

impl Painter {
    /// Create a painter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Paint `tree` inside the paint phase.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] when the paint phase cannot be entered.
    pub fn paint(&self, tree: &mut BoxTree) -> Result<DisplayList, LifecycleError> {
        let lifecycle = tree.lifecycle_handle();
        let _scope = lifecycle.start(Phase::InPaint)?;
        let selection = SelectionPaint::new(tree);
        // A moved selection may uncover any text box.
        let is_forced = tree.is_selection_changed();
        let mut list = DisplayList::new();
        let root = tree.root();
        Self::paint_box(tree, root, Point::default(), is_forced, &selection, &mut list);
        Ok(list)
    }

    fn paint_box(
        tree: &mut BoxTree,
        id: BoxId,
        offset: Point,
        is_forced: bool,
        selection: &SelectionPaint,
        list: &mut DisplayList,
    ) {
        let layout_box = &tree[id];
        let paints_self = is_forced || Self::has_own_changes(layout_box);
        if !paints_self && !layout_box.should_paint() && !layout_box.is_child_changed() {
            return;
        }
        let content = layout_box.content_bounds().offset(offset.x, offset.y);
        if paints_self {
            let rect = layout_box.bounds().offset(offset.x, offset.y);
            Self::paint_decorations(layout_box, rect, list);
            Self::paint_content(layout_box, content, selection, list);
            list.repainted.push(id);
        }

        let children: Vec<BoxId> = tree.children(id).collect();
        for child in children {
            Self::paint_box(tree, child, content.origin(), paints_self, selection, list);
        }
        tree.editor().did_paint(id);
    }

    fn has_own_changes(layout_box: &LayoutBox) -> bool {
        let flags = layout_box.change_flags();
        let has_aspect_change = flags.background
            || flags.border
            || flags.content
            || flags.origin
            || flags.padding
            || flags.size;
        flags.changed || has_aspect_change || (flags.should_paint && !layout_box.is_container())
    }

    /// Background, then the four border sides.
    ///
    /// [CSS 2.1 Appendix E.2](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
    /// Steps 1 and 2: "background color of element" then "border of element".
    fn paint_decorations(layout_box: &LayoutBox, rect: Rect, list: &mut DisplayList) {
        let background = layout_box.background();
        if !background.is_transparent() {
            list.push(DisplayItem::FillRect {
                rect,
                color: background,
            });
        }
        let border = layout_box.border();
        let widths = border.thickness;
        let sides = [
            (Rect::new(rect.x, rect.y, rect.width, widths.top), border.top_color),
            (
                Rect::new(rect.x, rect.bottom() - widths.bottom, rect.width, widths.bottom),
                border.bottom_color,
            ),
            (
                Rect::new(
                    rect.x,
                    rect.y + widths.top,
                    widths.left,
                    rect.height - widths.top - widths.bottom,
                ),
                border.left_color,
            ),
            (
                Rect::new(
                    rect.right() - widths.right,
                    rect.y + widths.top,
                    widths.right,
                    rect.height - widths.top - widths.bottom,
                ),
                border.right_color,
            ),
        ];
        for (side, color) in sides {
            if side.width > 0.0 && side.height > 0.0 && !color.is_transparent() {
                list.push(DisplayItem::FillRect { rect: side, color });
            }
        }
    }

    fn paint_content(
        layout_box: &LayoutBox,
        content: Rect,
        selection: &SelectionPaint,
        list: &mut DisplayList,
    ) {
        match layout_box.kind() {
            BoxKind::Text(text) => Self::paint_text(layout_box.id(), text, content, selection, list),
            BoxKind::Image(image) => list.push(DisplayItem::DrawImage {
                rect: content,
                image: image.clone(),
            }),
            BoxKind::Shape(shape) => list.push(DisplayItem::FillPolygon {
                points: shape
                    .points()
                    .iter()
                    .map(|point| Point::new(point.x + content.x, point.y + content.y))
                    .collect(),
                color: shape.color(),
            }),
            BoxKind::Flow(_) | BoxKind::Root(_) => {}
        }
    }

    fn paint_text(
        id: BoxId,
        text: &TextData,
        content: Rect,
        selection: &SelectionPaint,
        list: &mut DisplayList,
    ) {
        let font_size = text.font().size;
        let Some(layout) = text.text_layout() else {
            list.push(DisplayItem::DrawText {
                origin: content.origin(),
                baseline: text.baseline(),
                text: text.text().to_string(),
                color: text.color(),
                font_size,
            });
            return;
        };
        let line_height = layout.line_height();

        // Highlight sits under the glyphs.
        if let Some(&(start, end)) = selection.ranges.get(&id) {
            let mut top = content.y;
            for line in layout.lines() {
                let from = start.max(line.start);
                let to = end.min(line.end);
                if from < to {
                    let left = layout.caret_position(from).x;
                    let right = layout.caret_position(to).x;
                    list.push(DisplayItem::FillSelection {
                        rect: Rect::new(content.x + left, top, right - left, line_height),
                        color: selection.range_color,
                    });
                }
                top += line_height;
            }
        }

        let mut top = content.y;
        for line in layout.lines() {
            let run: String = text
                .text()
                .chars()
                .skip(line.start)
                .take(line.end - line.start)
                .collect();
            list.push(DisplayItem::DrawText {
                origin: Point::new(content.x, top),
                baseline: text.baseline(),
                text: run,
                color: text.color(),
                font_size,
            });
            top += line_height;
        }

        if let Some((caret_box, offset)) = selection.caret {
            if caret_box != id || selection.caret_shape == CaretShape::None {
                return;
            }
            let position = layout.caret_position(offset);
            let width = match selection.caret_shape {
                CaretShape::Box => {
                    let next = layout.caret_position(offset + 1);
                    if next.y == position.y && next.x > position.x {
                        next.x - position.x
                    } else {
                        font_size / 2.0
                    }
                }
                CaretShape::Bar | CaretShape::None => 1.0,
            };
            list.push(DisplayItem::DrawCaret {
                rect: Rect::new(content.x + position.x, content.y + position.y, width, line_height),
                color: selection.caret_color,
            });
        }
    }
}
