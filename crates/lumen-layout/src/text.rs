//! Font description and the text layout service seen by text boxes.
//!
//! Text boxes own their cached [`TextFormat`] and [`TextLayout`]; the
//! [`TextShaper`] only produces them. The box editor drops the caches when a
//! font property or the box size changes, and the layouter asks the shaper
//! again on the next layout pass.

use serde::Serialize;

use crate::geometry::{Point, Size};
use crate::style::{FontStyle, Style};

/// User agent default font size.
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// The resolved font properties of a text box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontDescription {
    /// `font-family`
    pub family: String,
    /// `font-size` in pixels
    pub size: f32,
    /// `font-weight`, 100 to 900
    pub weight: u16,
    /// `font-style`
    pub style: FontStyle,
}

impl Default for FontDescription {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size: DEFAULT_FONT_SIZE_PX,
            weight: 400,
            style: FontStyle::Normal,
        }
    }
}

impl FontDescription {
    /// Copy the font properties present in `style`. Returns `true` if any
    /// of them differed.
    pub(crate) fn apply_style(&mut self, style: &Style) -> bool {
        let mut is_changed = false;
        if let Some(family) = &style.font_family {
            if *family != self.family {
                family.clone_into(&mut self.family);
                is_changed = true;
            }
        }
        if let Some(size) = style.font_size {
            if size != self.size {
                self.size = size;
                is_changed = true;
            }
        }
        if let Some(weight) = style.font_weight {
            if weight != self.weight {
                self.weight = weight;
                is_changed = true;
            }
        }
        if let Some(font_style) = style.font_style {
            if font_style != self.style {
                self.style = font_style;
                is_changed = true;
            }
        }
        is_changed
    }
}

/// A font resolved by the text service, ready for shaping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextFormat {
    font: FontDescription,
    line_height: f32,
}

impl TextFormat {
    /// A format for `font` with the given line height.
    #[must_use]
    pub const fn new(font: FontDescription, line_height: f32) -> Self {
        Self { font, line_height }
    }

    /// The font this format was created for.
    #[must_use]
    pub const fn font(&self) -> &FontDescription {
        &self.font
    }

    /// Height of one line of text.
    #[must_use]
    pub const fn line_height(&self) -> f32 {
        self.line_height
    }
}

/// One line of shaped text. Offsets count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextLine {
    /// Offset of the first character on the line.
    pub start: usize,
    /// Offset one past the last character on the line.
    pub end: usize,
    /// Advance width of the line.
    pub width: f32,
}

/// The shaped text of one text box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLayout {
    lines: Vec<TextLine>,
    line_height: f32,
    max_width: f32,
}

impl TextLayout {
    /// Assemble a layout from shaped lines.
    #[must_use]
    pub const fn new(lines: Vec<TextLine>, line_height: f32, max_width: f32) -> Self {
        Self {
            lines,
            line_height,
            max_width,
        }
    }

    /// The shaped lines, top to bottom.
    #[must_use]
    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    /// Height of each line.
    #[must_use]
    pub const fn line_height(&self) -> f32 {
        self.line_height
    }

    /// The width the text was wrapped to; zero means unconstrained.
    #[must_use]
    pub const fn max_width(&self) -> f32 {
        self.max_width
    }

    /// Extent of the shaped text.
    #[must_use]
    pub fn size(&self) -> Size {
        let width = self.lines.iter().map(|line| line.width).fold(0.0, f32::max);
        #[allow(clippy::cast_precision_loss)]
        let height = self.lines.len() as f32 * self.line_height;
        Size::new(width, height)
    }

    /// Position of the caret before character `offset`, relative to the
    /// text's top-left corner.
    #[must_use]
    pub fn caret_position(&self, offset: usize) -> Point {
        let mut y = 0.0;
        for (index, line) in self.lines.iter().enumerate() {
            let is_last = index + 1 == self.lines.len();
            if offset <= line.end || is_last {
                let clamped = offset.clamp(line.start, line.end);
                let chars = line.end - line.start;
                #[allow(clippy::cast_precision_loss)]
                let x = if chars == 0 {
                    0.0
                } else {
                    line.width * (clamped - line.start) as f32 / chars as f32
                };
                return Point::new(x, y);
            }
            y += self.line_height;
        }
        Point::default()
    }
}

/// The font/text layout service consulted by text boxes.
pub trait TextShaper {
    /// Resolve `font` into a format usable for shaping.
    fn create_format(&self, font: &FontDescription) -> TextFormat;

    /// Shape `text` with `format`, wrapping at `max_width` when it is
    /// positive.
    fn shape(&self, text: &str, format: &TextFormat, max_width: f32) -> TextLayout;
}

/// Approximate shaping using fixed ratios.
///
/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// Without access to font data every glyph advances by
/// `char_width_ratio × font-size` and lines are `line_height_ratio ×
/// font-size` tall. Lines break greedily at spaces. Used as a fallback and
/// in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximateTextShaper {
    /// Advance of one character relative to the font size.
    pub char_width_ratio: f32,
    /// Line height relative to the font size.
    pub line_height_ratio: f32,
}

impl Default for ApproximateTextShaper {
    fn default() -> Self {
        Self {
            char_width_ratio: 0.6,
            line_height_ratio: 1.2,
        }
    }
}

impl TextShaper for ApproximateTextShaper {
    fn create_format(&self, font: &FontDescription) -> TextFormat {
        TextFormat::new(font.clone(), font.size * self.line_height_ratio)
    }

    #[allow(clippy::cast_precision_loss)]
    fn shape(&self, text: &str, format: &TextFormat, max_width: f32) -> TextLayout {
        let advance = format.font().size * self.char_width_ratio;
        let width_of = |start: usize, end: usize| (end - start) as f32 * advance;
        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_end = 0;
        let mut offset = 0;
        for word in text.split(' ') {
            let word_start = offset;
            let word_end = word_start + word.chars().count();
            let overflows = max_width > 0.0 && width_of(line_start, word_end) > max_width;
            if overflows && line_end > line_start {
                lines.push(TextLine {
                    start: line_start,
                    end: line_end,
                    width: width_of(line_start, line_end),
                });
                line_start = word_start;
            }
            line_end = word_end;
            offset = word_end + 1;
        }
        lines.push(TextLine {
            start: line_start,
            end: line_end,
            width: width_of(line_start, line_end),
        });
        TextLayout::new(lines, format.line_height(), max_width)
    }
}
