//! Retained layout box tree for the Lumen view.
//!
//! # Scope
//!
//! This crate implements:
//! - **Box tree** ([§ 9 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html))
//!   - Flow, text, image, shape, and root boxes in a generational arena
//!   - Per-aspect change flags with early-exit dirty propagation
//!   - A single mutation gateway ([`BoxEditor`]) gated by the view lifecycle
//!
//! - **Selection** (caret and range over text boxes)
//!
//! - **Drivers**
//!   - [`BoxTreeBuilder`]: document to boxes, reusing node-backed boxes
//!   - [`Layouter`]: vertical and horizontal flow with absolute offsets
//!   - [`Painter`]: dirty boxes to a [`DisplayList`]
//!
//! # Not Yet Implemented
//!
//! - Line boxes spanning several inline boxes
//! - Floats, tables, flex and grid formatting
//! - Percentage and relative length units

/// Document node to box registry.
pub mod box_map;
/// The box tree, its editor, and selections.
pub mod boxes;
/// Box generation per [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen).
pub mod builder;
/// Points, sizes, rectangles, and colors.
pub mod geometry;
/// Flow layout per [§ 9.4 Normal flow](https://www.w3.org/TR/CSS2/visuren.html#normal-flow).
pub mod layouter;
/// The phase gate shared by a tree and its drivers.
pub mod lifecycle;
/// Display list and painting per [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html).
pub mod paint;
/// JSON and text dumps of a tree.
pub mod snapshot;
/// Resolved style values per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/#computed).
pub mod style;
/// Font descriptions and text shaping.
pub mod text;
/// Box-model edges per [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model).
pub mod thickness;
/// Read-only tree walks.
pub mod traversal;

pub use box_map::BoxMap;
pub use boxes::{
    BoxClass, BoxEditor, BoxId, BoxKind, BoxSelection, BoxSelectionEditor, BoxTree, CaretShape,
    ChangeFlags, ImageBitmap, LayoutBox, ShapeData,
};
pub use builder::BoxTreeBuilder;
pub use geometry::{Color, Point, Rect, Size};
pub use layouter::{LayoutConfig, Layouter};
pub use lifecycle::{LifecycleError, LifecycleScope, Phase, ViewLifecycle};
pub use paint::{DisplayItem, DisplayList, Painter};
pub use snapshot::{BoxSnapshot, dump_json};
pub use style::{Dimension, Display, FontStyle, Position, Style, StyleResolver};
pub use text::{ApproximateTextShaper, FontDescription, TextLayout, TextShaper};
pub use thickness::{Border, Margin, Padding, Thickness};
pub use traversal::BoxTraversal;
