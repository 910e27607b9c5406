//! Caret and range selection over text boxes.
//!
//! A [`BoxSelection`] is a value: editing one never touches the tree. The
//! root box holds the current selection, and a new value is installed with
//! [`BoxEditor::set_selection`](super::BoxEditor::set_selection).
//!
//! ```text
//!   none ──collapse──▶ caret ──extend_to (other position)──▶ range
//!    ▲                  │  ▲                                   │
//!    └──────clear───────┘  └──────extend_to (anchor)───────────┘
//! ```

use lumen_common::invariant::{ensure, invariant_violated};
use serde::Serialize;
use strum_macros::Display as StrumDisplay;

use super::{BoxId, BoxTree};
use crate::geometry::Color;

const COMPONENT: &str = "BoxSelectionEditor";

/// [§ 6.2 'caret-shape'](https://www.w3.org/TR/css-ui-4/#caret-shape)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum CaretShape {
    /// No caret is drawn.
    None,
    /// A thin vertical bar between characters.
    #[default]
    Bar,
    /// A rectangle covering the next character.
    Box,
}

/// Anchor and focus positions inside text boxes, plus how to draw them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSelection {
    anchor: Option<BoxId>,
    anchor_offset: usize,
    focus: Option<BoxId>,
    focus_offset: usize,
    caret_color: Color,
    caret_shape: CaretShape,
    range_color: Color,
}

impl Default for BoxSelection {
    fn default() -> Self {
        Self {
            anchor: None,
            anchor_offset: 0,
            focus: None,
            focus_offset: 0,
            caret_color: Color::BLACK,
            caret_shape: CaretShape::Bar,
            range_color: Color::rgba(51, 153, 255, 102),
        }
    }
}

impl BoxSelection {
    /// Nothing is selected.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.focus.is_none()
    }

    /// Anchor and focus coincide.
    #[must_use]
    pub fn is_caret(&self) -> bool {
        !self.is_none() && self.anchor == self.focus && self.anchor_offset == self.focus_offset
    }

    /// Anchor and focus differ.
    #[must_use]
    pub fn is_range(&self) -> bool {
        !self.is_none() && !self.is_caret()
    }

    /// The box the selection started in.
    #[must_use]
    pub const fn anchor(&self) -> Option<BoxId> {
        self.anchor
    }

    /// Character offset within the anchor box.
    #[must_use]
    pub const fn anchor_offset(&self) -> usize {
        self.anchor_offset
    }

    /// The box the selection was extended to.
    #[must_use]
    pub const fn focus(&self) -> Option<BoxId> {
        self.focus
    }

    /// Character offset within the focus box.
    #[must_use]
    pub const fn focus_offset(&self) -> usize {
        self.focus_offset
    }

    /// `caret-color`
    #[must_use]
    pub const fn caret_color(&self) -> Color {
        self.caret_color
    }

    /// `caret-shape`
    #[must_use]
    pub const fn caret_shape(&self) -> CaretShape {
        self.caret_shape
    }

    /// Fill color for selected ranges.
    #[must_use]
    pub const fn range_color(&self) -> Color {
        self.range_color
    }

    /// True when either end lies in `id`.
    #[must_use]
    pub fn touches(&self, id: BoxId) -> bool {
        self.anchor == Some(id) || self.focus == Some(id)
    }

    /// This selection with offsets into `id` clamped to `length`, or `None`
    /// when nothing needed clamping.
    pub(super) fn clamped_to(&self, id: BoxId, length: usize) -> Option<Self> {
        let anchor_over = self.anchor == Some(id) && self.anchor_offset > length;
        let focus_over = self.focus == Some(id) && self.focus_offset > length;
        if !anchor_over && !focus_over {
            return None;
        }
        let mut clamped = self.clone();
        if anchor_over {
            clamped.anchor_offset = length;
        }
        if focus_over {
            clamped.focus_offset = length;
        }
        Some(clamped)
    }
}

/// Edits [`BoxSelection`] values, checking positions against a tree.
///
/// Endpoints must be live text boxes and offsets must not exceed the text's
/// length; anything else is an invariant violation and leaves the selection
/// untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxSelectionEditor;

impl BoxSelectionEditor {
    /// Place a caret at `offset` in text box `id`.
    pub fn collapse(tree: &BoxTree, selection: &mut BoxSelection, id: BoxId, offset: usize) {
        if !is_valid_position(tree, id, offset) {
            return;
        }
        selection.anchor = Some(id);
        selection.anchor_offset = offset;
        selection.focus = Some(id);
        selection.focus_offset = offset;
    }

    /// Move the focus to `offset` in text box `id`, keeping the anchor.
    pub fn extend_to(tree: &BoxTree, selection: &mut BoxSelection, id: BoxId, offset: usize) {
        if !ensure(!selection.is_none(), COMPONENT, "extend_to on an empty selection") {
            return;
        }
        if !is_valid_position(tree, id, offset) {
            return;
        }
        selection.focus = Some(id);
        selection.focus_offset = offset;
    }

    /// Drop both ends. Colors and caret shape are kept.
    pub fn clear(selection: &mut BoxSelection) {
        selection.anchor = None;
        selection.anchor_offset = 0;
        selection.focus = None;
        selection.focus_offset = 0;
    }

    /// Set the caret color.
    pub fn set_caret_color(selection: &mut BoxSelection, color: Color) {
        selection.caret_color = color;
    }

    /// Set the caret shape.
    pub fn set_caret_shape(selection: &mut BoxSelection, shape: CaretShape) {
        selection.caret_shape = shape;
    }

    /// Set the range fill color.
    pub fn set_range_color(selection: &mut BoxSelection, color: Color) {
        selection.range_color = color;
    }
}

fn is_valid_position(tree: &BoxTree, id: BoxId, offset: usize) -> bool {
    let Some(text) = tree.get(id).and_then(super::LayoutBox::as_text) else {
        invariant_violated(COMPONENT, "selection endpoint is not a live text box");
        return false;
    };
    ensure(
        offset <= text.content_length(),
        COMPONENT,
        "selection offset is past the end of the text",
    )
}
