//! Resolved style values pushed into boxes.
//!
//! [§ 6 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//!
//! A [`Style`] is what the style resolver hands to the box tree: every
//! property is individually present or absent. Absent properties leave the
//! box's current value untouched, so a resolver that only recomputed
//! `color` can push a style carrying nothing else.

use lumen_dom::NodeId;
use serde::Serialize;
use strum_macros::Display as StrumDisplay;

use crate::geometry::Color;
use crate::thickness::{Border, Margin, Padding};

/// A sizing or offset value that may be `auto`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub enum Dimension {
    /// "auto"
    #[default]
    Auto,
    /// An absolute length in pixels.
    Length(f32),
}

impl Dimension {
    /// The length, if this is not `auto`.
    #[must_use]
    pub const fn length(&self) -> Option<f32> {
        match self {
            Self::Auto => None,
            Self::Length(value) => Some(*value),
        }
    }

    /// True for `auto`.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

/// [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum Position {
    /// "The box is a normal box, laid out according to the normal flow."
    #[default]
    Static,
    /// "The box's position is calculated according to the normal flow.
    /// Then the box is offset relative to its normal position."
    Relative,
    /// "The box's position (and possibly size) is specified with the
    /// 'top', 'right', 'bottom', and 'left' properties."
    Absolute,
    /// "The box's position is calculated according to the 'absolute' model,
    /// but the box is fixed with respect to some reference."
    Fixed,
}

impl Position {
    /// Absolute and fixed boxes are out of flow.
    #[must_use]
    pub const fn is_out_of_flow(&self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }
}

/// [§ 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
///
/// Only the legacy keywords the box tree distinguishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, StrumDisplay)]
#[strum(serialize_all = "kebab-case")]
pub enum Display {
    /// block flow
    #[default]
    Block,
    /// inline flow
    Inline,
    /// inline flow-root
    InlineBlock,
    /// No box is generated.
    None,
}

impl Display {
    /// Inline-level boxes are laid out horizontally by their parent.
    #[must_use]
    pub const fn is_inline_level(&self) -> bool {
        matches!(self, Self::Inline | Self::InlineBlock)
    }
}

/// [§ 3.3 'font-style'](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum FontStyle {
    /// Upright glyphs.
    #[default]
    Normal,
    /// Italic glyphs.
    Italic,
}

/// A partial, fully-resolved set of style properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Style {
    /// `background-color`
    pub background: Option<Color>,
    /// `border-*` widths and colors
    pub border: Option<Border>,
    /// `padding-*`
    pub padding: Option<Padding>,
    /// `margin-*`
    pub margin: Option<Margin>,
    /// `display`
    pub display: Option<Display>,
    /// `position`
    pub position: Option<Position>,
    /// `top`
    pub top: Option<Dimension>,
    /// `left`
    pub left: Option<Dimension>,
    /// `right`
    pub right: Option<Dimension>,
    /// `bottom`
    pub bottom: Option<Dimension>,
    /// `width`
    pub width: Option<Dimension>,
    /// `height`
    pub height: Option<Dimension>,
    /// `color`, used by text boxes.
    pub color: Option<Color>,
    /// `font-family`
    pub font_family: Option<String>,
    /// `font-size` in pixels
    pub font_size: Option<f32>,
    /// `font-weight`
    pub font_weight: Option<u16>,
    /// `font-style`
    pub font_style: Option<FontStyle>,
}

impl Style {
    /// A style carrying no properties.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no property is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when any font-affecting property is present.
    #[must_use]
    pub const fn has_font(&self) -> bool {
        self.font_family.is_some()
            || self.font_size.is_some()
            || self.font_weight.is_some()
            || self.font_style.is_some()
    }

    /// Set `background-color`.
    #[must_use]
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Set the border.
    #[must_use]
    pub fn with_border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self
    }

    /// Set the padding.
    #[must_use]
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = Some(padding);
        self
    }

    /// Set the margin.
    #[must_use]
    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = Some(margin);
        self
    }

    /// Set `display`.
    #[must_use]
    pub fn with_display(mut self, display: Display) -> Self {
        self.display = Some(display);
        self
    }

    /// Set `position`.
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Set `left` and `top` together.
    #[must_use]
    pub fn with_offset(mut self, left: Dimension, top: Dimension) -> Self {
        self.left = Some(left);
        self.top = Some(top);
        self
    }

    /// Set `right` and `bottom` together.
    #[must_use]
    pub fn with_far_offset(mut self, right: Dimension, bottom: Dimension) -> Self {
        self.right = Some(right);
        self.bottom = Some(bottom);
        self
    }

    /// Set `width` and `height` together.
    #[must_use]
    pub fn with_size(mut self, width: Dimension, height: Dimension) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set `color`.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Set `font-family`.
    #[must_use]
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    /// Set `font-size`.
    #[must_use]
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Set `font-weight`.
    #[must_use]
    pub fn with_font_weight(mut self, weight: u16) -> Self {
        self.font_weight = Some(weight);
        self
    }

    /// Set `font-style`.
    #[must_use]
    pub fn with_font_style(mut self, style: FontStyle) -> Self {
        self.font_style = Some(style);
        self
    }
}

/// The style cascade, seen from the box tree.
///
/// The box tree never runs the cascade itself; it asks for the resolved
/// style of a node and pushes it through the editor.
pub trait StyleResolver {
    /// The resolved style for `node`.
    fn computed_style_of(&self, node: NodeId) -> Style;
}
