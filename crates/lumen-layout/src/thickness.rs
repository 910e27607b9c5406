//! Box-model edge value types.
//!
//! [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
//!
//! "Each box has a content area and optional surrounding padding, border,
//! and margin areas."
//!
//! ```text
//! ┌───────────────────────────────┐
//! │ margin                        │
//! │   ┌───────────────────────┐   │
//! │   │ border                │   │
//! │   │   ┌───────────────┐   │   │
//! │   │   │ padding       │   │   │
//! │   │   │   ┌───────┐   │   │   │
//! │   │   │   │content│   │   │   │
//! │   │   │   └───────┘   │   │   │
//! │   │   └───────────────┘   │   │
//! │   └───────────────────────┘   │
//! └───────────────────────────────┘
//! ```
//!
//! A box's `bounds` is its border box; margins sit outside it.

use serde::Serialize;

use crate::geometry::{Color, Point, Rect, Size};

/// Edge sizes for one of the box-model layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Thickness {
    /// Top edge size.
    pub top: f32,
    /// Right edge size.
    pub right: f32,
    /// Bottom edge size.
    pub bottom: f32,
    /// Left edge size.
    pub left: f32,
}

impl Thickness {
    /// Zero on every side.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Edges in CSS order: top, right, bottom, left.
    #[must_use]
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same size on all four sides.
    #[must_use]
    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// True when any side is non-zero.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.top != 0.0 || self.right != 0.0 || self.bottom != 0.0 || self.left != 0.0
    }

    /// Offset of the inner edge from the outer top-left corner.
    #[must_use]
    pub const fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Horizontal and vertical space the edges consume.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.left + self.right, self.top + self.bottom)
    }

    /// Shrink `rect` by these edges. Extents never go negative.
    #[must_use]
    pub fn inset(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x + self.left,
            rect.y + self.top,
            (rect.width - self.left - self.right).max(0.0),
            (rect.height - self.top - self.bottom).max(0.0),
        )
    }
}

/// [§ 4 Borders](https://www.w3.org/TR/css-backgrounds-3/#borders)
///
/// Border thickness plus one color per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Border {
    /// [§ 4.3 'border-width'](https://www.w3.org/TR/css-backgrounds-3/#border-width)
    pub thickness: Thickness,
    /// Top border color.
    pub top_color: Color,
    /// Right border color.
    pub right_color: Color,
    /// Bottom border color.
    pub bottom_color: Color,
    /// Left border color.
    pub left_color: Color,
}

impl Border {
    /// A border with the same width and color on every side.
    #[must_use]
    pub const fn uniform(color: Color, width: f32) -> Self {
        Self {
            thickness: Thickness::uniform(width),
            top_color: color,
            right_color: color,
            bottom_color: color,
            left_color: color,
        }
    }

    /// True when the border occupies any space.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.thickness.has_value()
    }
}

/// [§ 3.1 Margins](https://www.w3.org/TR/css-box-3/#margins)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Margin(pub Thickness);

impl Margin {
    /// The same margin on all four sides.
    #[must_use]
    pub const fn uniform(value: f32) -> Self {
        Self(Thickness::uniform(value))
    }

    /// The underlying edge sizes.
    #[must_use]
    pub const fn thickness(&self) -> Thickness {
        self.0
    }
}

/// [§ 3.2 Padding](https://www.w3.org/TR/css-box-3/#paddings)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Padding(pub Thickness);

impl Padding {
    /// The same padding on all four sides.
    #[must_use]
    pub const fn uniform(value: f32) -> Self {
        Self(Thickness::uniform(value))
    }

    /// The underlying edge sizes.
    #[must_use]
    pub const fn thickness(&self) -> Thickness {
        self.0
    }
}
