//! Replaced content carried by image and shape boxes.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::geometry::{Color, Point, Rect, Size};

/// A decoded image ready for painting.
///
/// The pixel buffer is shared, so cloning an image (as snapshots and
/// display lists do) never copies pixels.
#[derive(Clone, PartialEq, Serialize)]
pub struct ImageBitmap {
    width: u32,
    height: u32,
    #[serde(skip)]
    rgba: Rc<[u8]>,
}

impl ImageBitmap {
    /// Wrap decoded RGBA8 pixels, row-major, four bytes per pixel.
    #[must_use]
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba: rgba.into(),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The raw pixel bytes.
    #[must_use]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Natural size used when no `width`/`height` is specified.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn intrinsic_size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }
}

impl Default for ImageBitmap {
    fn default() -> Self {
        Self::new(0, 0, Vec::new())
    }
}

impl fmt::Debug for ImageBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// A filled polygon.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShapeData {
    color: Color,
    points: Vec<Point>,
}

impl ShapeData {
    /// A polygon through `points`, filled with `color`.
    #[must_use]
    pub const fn new(color: Color, points: Vec<Point>) -> Self {
        Self { color, points }
    }

    /// Fill color.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Polygon vertices, relative to the box's content origin.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Smallest rectangle containing every vertex and the origin.
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        let (mut right, mut bottom) = (0.0_f32, 0.0_f32);
        for point in &self.points {
            right = right.max(point.x);
            bottom = bottom.max(point.y);
        }
        Rect::new(0.0, 0.0, right, bottom)
    }
}
