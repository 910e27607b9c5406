//! The layout box tree.
//!
//! [§ 9 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html)
//!
//! Boxes live in a generational arena owned by [`BoxTree`] and refer to one
//! another by [`BoxId`]. Every box records which of its aspects changed
//! since it was last painted, and containers additionally record whether
//! any descendant changed, so layout and paint can skip clean subtrees.
//!
//! The fields of [`LayoutBox`] are private to this module. Outside code only
//! ever sees `&LayoutBox` through the tree; every write goes through
//! [`BoxEditor`], which lives in the child module `editor` and is therefore
//! the one place allowed to touch them.

mod arena;
mod content;
pub mod editor;
pub mod selection;
mod tree;

use std::fmt;
use std::rc::Rc;

use lumen_dom::NodeId;
use serde::Serialize;
use strum_macros::Display as StrumDisplay;

pub use arena::BoxId;
pub use content::{ImageBitmap, ShapeData};
pub use editor::BoxEditor;
pub use selection::{BoxSelection, BoxSelectionEditor, CaretShape};
pub use tree::BoxTree;

use crate::geometry::{Color, Rect, Size};
use crate::lifecycle::ViewLifecycle;
use crate::style::{Dimension, Display, Position, Style};
use crate::text::{FontDescription, TextFormat, TextLayout};
use crate::thickness::{Border, Margin, Padding};

/// The concrete kind of a box, as printed in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, StrumDisplay)]
pub enum BoxClass {
    /// A block or inline flow container.
    FlowBox,
    /// A run of text.
    TextBox,
    /// A decoded image.
    ImageBox,
    /// A filled polygon.
    ShapeBox,
    /// The unique root of a tree.
    RootBox,
}

/// Per-aspect change flags, cleared by `did_paint`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ChangeFlags {
    /// `background-color` changed, or the size did.
    pub background: bool,
    /// Border changed, or the size did while a border is present.
    pub border: bool,
    /// Leaf content (text, image, shape, color, font) changed.
    pub content: bool,
    /// Position within the parent changed.
    pub origin: bool,
    /// Padding changed.
    pub padding: bool,
    /// Extent changed.
    pub size: bool,
    /// The box must be repainted.
    pub should_paint: bool,
    /// The box itself changed since it was last painted.
    pub changed: bool,
}

impl ChangeFlags {
    const fn fresh() -> Self {
        Self {
            background: true,
            border: true,
            content: false,
            origin: true,
            padding: true,
            size: true,
            should_paint: true,
            changed: true,
        }
    }
}

/// Child links of the container kinds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerData {
    first_child: Option<BoxId>,
    last_child: Option<BoxId>,
    is_child_changed: bool,
}

impl ContainerData {
    /// The first child, if any.
    #[must_use]
    pub const fn first_child(&self) -> Option<BoxId> {
        self.first_child
    }

    /// The last child, if any.
    #[must_use]
    pub const fn last_child(&self) -> Option<BoxId> {
        self.last_child
    }

    /// True when some descendant changed since the last paint.
    #[must_use]
    pub const fn is_child_changed(&self) -> bool {
        self.is_child_changed
    }
}

/// Content of a text box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextData {
    text: String,
    color: Color,
    baseline: f32,
    font: FontDescription,
    text_format: Option<TextFormat>,
    text_layout: Option<TextLayout>,
}

impl TextData {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            color: Color::BLACK,
            baseline: 0.0,
            font: FontDescription::default(),
            text_format: None,
            text_layout: None,
        }
    }

    /// The text run.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of characters in the run; selection offsets range over
    /// `0..=content_length()`.
    #[must_use]
    pub fn content_length(&self) -> usize {
        self.text.chars().count()
    }

    /// `color`
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Baseline offset from the top of the content box, set by layout.
    #[must_use]
    pub const fn baseline(&self) -> f32 {
        self.baseline
    }

    /// The resolved font.
    #[must_use]
    pub const fn font(&self) -> &FontDescription {
        &self.font
    }

    /// Cached format; dropped when a font property changes.
    #[must_use]
    pub const fn text_format(&self) -> Option<&TextFormat> {
        self.text_format.as_ref()
    }

    /// Cached shaped text; dropped when the font, text or size changes.
    #[must_use]
    pub const fn text_layout(&self) -> Option<&TextLayout> {
        self.text_layout.as_ref()
    }
}

/// State owned by the root box.
#[derive(Debug)]
pub struct RootData {
    container: ContainerData,
    viewport_size: Size,
    selection: BoxSelection,
    is_selection_changed: bool,
    lifecycle: Rc<ViewLifecycle>,
}

impl RootData {
    fn new(lifecycle: Rc<ViewLifecycle>) -> Self {
        Self {
            container: ContainerData::default(),
            viewport_size: Size::default(),
            selection: BoxSelection::default(),
            is_selection_changed: false,
            lifecycle,
        }
    }

    /// Child links of the root.
    #[must_use]
    pub const fn container(&self) -> &ContainerData {
        &self.container
    }

    /// Size of the viewport the root covers.
    #[must_use]
    pub const fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    /// The current selection.
    #[must_use]
    pub const fn selection(&self) -> &BoxSelection {
        &self.selection
    }

    /// True when the selection changed since the last paint.
    #[must_use]
    pub const fn is_selection_changed(&self) -> bool {
        self.is_selection_changed
    }

    /// The phase gate shared with the view.
    #[must_use]
    pub fn lifecycle(&self) -> &ViewLifecycle {
        &self.lifecycle
    }
}

/// What a box is, with the state that only that kind carries.
#[derive(Debug)]
pub enum BoxKind {
    /// [§ 9.4 Normal flow](https://www.w3.org/TR/CSS2/visuren.html#normal-flow)
    Flow(ContainerData),
    /// A text run.
    Text(TextData),
    /// [§ 3.1 Replaced elements](https://www.w3.org/TR/css-display-3/#replaced-element)
    Image(ImageBitmap),
    /// A filled polygon.
    Shape(ShapeData),
    /// [§ 9.1.2 Containing blocks](https://www.w3.org/TR/CSS2/visuren.html#containing-block):
    /// the root box establishes the initial containing block.
    Root(RootData),
}

/// One node of the box tree.
#[derive(Debug)]
pub struct LayoutBox {
    id: BoxId,
    sequence_id: u32,
    node: Option<NodeId>,
    root_box: BoxId,
    parent: Option<BoxId>,
    next_sibling: Option<BoxId>,
    previous_sibling: Option<BoxId>,
    version: u64,
    bounds: Rect,
    background: Color,
    border: Border,
    margin: Margin,
    padding: Padding,
    display: Display,
    position: Position,
    top: Dimension,
    left: Dimension,
    right: Dimension,
    bottom: Dimension,
    width: Dimension,
    height: Dimension,
    flags: ChangeFlags,
    kind: BoxKind,
}

impl LayoutBox {
    fn new(id: BoxId, root_box: BoxId, sequence_id: u32, node: Option<NodeId>, kind: BoxKind) -> Self {
        let display = match kind {
            BoxKind::Text(_) | BoxKind::Image(_) | BoxKind::Shape(_) => Display::Inline,
            BoxKind::Flow(_) | BoxKind::Root(_) => Display::Block,
        };
        Self {
            id,
            sequence_id,
            node,
            root_box,
            parent: None,
            next_sibling: None,
            previous_sibling: None,
            version: 0,
            bounds: Rect::default(),
            background: Color::TRANSPARENT,
            border: Border::default(),
            margin: Margin::default(),
            padding: Padding::default(),
            display,
            position: Position::Static,
            top: Dimension::Auto,
            left: Dimension::Auto,
            right: Dimension::Auto,
            bottom: Dimension::Auto,
            width: Dimension::Auto,
            height: Dimension::Auto,
            flags: ChangeFlags::fresh(),
            kind,
        }
    }

    /// This box's handle.
    #[must_use]
    pub const fn id(&self) -> BoxId {
        self.id
    }

    /// Creation order within the tree, for diagnostics.
    #[must_use]
    pub const fn sequence_id(&self) -> u32 {
        self.sequence_id
    }

    /// The document node this box was generated for.
    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Anonymous boxes have no document node and are destroyed as soon as
    /// they are detached by `remove_all_children` or `remove_descendants`.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.node.is_none()
    }

    /// The root of the tree this box was created in.
    #[must_use]
    pub const fn root_box(&self) -> BoxId {
        self.root_box
    }

    /// The containing box, if attached.
    #[must_use]
    pub const fn parent(&self) -> Option<BoxId> {
        self.parent
    }

    /// The next sibling, if any.
    #[must_use]
    pub const fn next_sibling(&self) -> Option<BoxId> {
        self.next_sibling
    }

    /// The previous sibling, if any.
    #[must_use]
    pub const fn previous_sibling(&self) -> Option<BoxId> {
        self.previous_sibling
    }

    /// The tree version at which this box last changed.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Border box, relative to the parent's content box.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    /// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
    ///
    /// Bounds minus the border and padding insets.
    #[must_use]
    pub fn content_bounds(&self) -> Rect {
        let padding_box = self.border.thickness.inset(self.bounds);
        self.padding.0.inset(padding_box)
    }

    /// `background-color`; transparent means none.
    #[must_use]
    pub const fn background(&self) -> Color {
        self.background
    }

    /// The border.
    #[must_use]
    pub const fn border(&self) -> Border {
        self.border
    }

    /// The margin.
    #[must_use]
    pub const fn margin(&self) -> Margin {
        self.margin
    }

    /// The padding.
    #[must_use]
    pub const fn padding(&self) -> Padding {
        self.padding
    }

    /// `display`
    #[must_use]
    pub const fn display(&self) -> Display {
        self.display
    }

    /// `position`
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// `top`
    #[must_use]
    pub const fn top(&self) -> Dimension {
        self.top
    }

    /// `left`
    #[must_use]
    pub const fn left(&self) -> Dimension {
        self.left
    }

    /// `right`
    #[must_use]
    pub const fn right(&self) -> Dimension {
        self.right
    }

    /// `bottom`
    #[must_use]
    pub const fn bottom(&self) -> Dimension {
        self.bottom
    }

    /// `width`
    #[must_use]
    pub const fn width(&self) -> Dimension {
        self.width
    }

    /// `height`
    #[must_use]
    pub const fn height(&self) -> Dimension {
        self.height
    }

    /// The kind-specific state.
    #[must_use]
    pub const fn kind(&self) -> &BoxKind {
        &self.kind
    }

    /// The concrete class name.
    #[must_use]
    pub const fn class(&self) -> BoxClass {
        match self.kind {
            BoxKind::Flow(_) => BoxClass::FlowBox,
            BoxKind::Text(_) => BoxClass::TextBox,
            BoxKind::Image(_) => BoxClass::ImageBox,
            BoxKind::Shape(_) => BoxClass::ShapeBox,
            BoxKind::Root(_) => BoxClass::RootBox,
        }
    }

    /// Flow and root boxes hold children.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self.kind, BoxKind::Flow(_) | BoxKind::Root(_))
    }

    /// Child links, for container kinds.
    #[must_use]
    pub const fn as_container(&self) -> Option<&ContainerData> {
        match &self.kind {
            BoxKind::Flow(container) => Some(container),
            BoxKind::Root(root) => Some(&root.container),
            _ => None,
        }
    }

    fn container_mut(&mut self) -> Option<&mut ContainerData> {
        match &mut self.kind {
            BoxKind::Flow(container) => Some(container),
            BoxKind::Root(root) => Some(&mut root.container),
            _ => None,
        }
    }

    /// Text content, for text boxes.
    #[must_use]
    pub const fn as_text(&self) -> Option<&TextData> {
        match &self.kind {
            BoxKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Root state, for the root box.
    #[must_use]
    pub const fn as_root(&self) -> Option<&RootData> {
        match &self.kind {
            BoxKind::Root(root) => Some(root),
            _ => None,
        }
    }

    /// First child, for containers.
    #[must_use]
    pub fn first_child(&self) -> Option<BoxId> {
        self.as_container().and_then(ContainerData::first_child)
    }

    /// Last child, for containers.
    #[must_use]
    pub fn last_child(&self) -> Option<BoxId> {
        self.as_container().and_then(ContainerData::last_child)
    }

    /// Selection offsets range over `0..=content_length()`; non-text boxes
    /// have no content length.
    #[must_use]
    pub fn content_length(&self) -> usize {
        self.as_text().map_or(0, TextData::content_length)
    }

    /// A copy of the change flags.
    #[must_use]
    pub const fn change_flags(&self) -> ChangeFlags {
        self.flags
    }

    /// The box changed since it was last painted.
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        self.flags.changed
    }

    /// Some descendant changed since the last paint. Always false for
    /// leaves.
    #[must_use]
    pub fn is_child_changed(&self) -> bool {
        self.as_container().is_some_and(ContainerData::is_child_changed)
    }

    /// Background flag.
    #[must_use]
    pub const fn is_background_changed(&self) -> bool {
        self.flags.background
    }

    /// Border flag.
    #[must_use]
    pub const fn is_border_changed(&self) -> bool {
        self.flags.border
    }

    /// Content flag.
    #[must_use]
    pub const fn is_content_changed(&self) -> bool {
        self.flags.content
    }

    /// Origin flag.
    #[must_use]
    pub const fn is_origin_changed(&self) -> bool {
        self.flags.origin
    }

    /// Padding flag.
    #[must_use]
    pub const fn is_padding_changed(&self) -> bool {
        self.flags.padding
    }

    /// Size flag.
    #[must_use]
    pub const fn is_size_changed(&self) -> bool {
        self.flags.size
    }

    /// The box must be repainted.
    #[must_use]
    pub const fn should_paint(&self) -> bool {
        self.flags.should_paint
    }

    /// Rebuild a [`Style`] from the resolved fields alone. Text boxes report
    /// their color and font.
    #[must_use]
    pub fn compute_actual_style(&self) -> Style {
        if let BoxKind::Text(text) = &self.kind {
            return Style::new()
                .with_color(text.color)
                .with_font_family(text.font.family.clone())
                .with_font_size(text.font.size)
                .with_font_weight(text.font.weight)
                .with_font_style(text.font.style);
        }
        Style::new()
            .with_background(self.background)
            .with_border(self.border)
            .with_padding(self.padding)
            .with_margin(self.margin)
            .with_display(self.display)
            .with_position(self.position)
            .with_offset(self.left, self.top)
            .with_far_offset(self.right, self.bottom)
            .with_size(self.width, self.height)
    }
}

impl fmt::Display for LayoutBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bounds = self.bounds;
        write!(
            f,
            "{}.{} ({},{})+({}x{})",
            self.class(),
            self.sequence_id,
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thickness::Thickness;

    fn flow_box(sequence_id: u32) -> LayoutBox {
        let mut arena = arena::BoxArena::new();
        let id = arena.insert_with(|id| LayoutBox::new(id, id, 0, None, BoxKind::Flow(ContainerData::default())));
        LayoutBox::new(id, id, sequence_id, None, BoxKind::Flow(ContainerData::default()))
    }

    #[test]
    fn test_fresh_box_flags() {
        let layout_box = flow_box(1);
        let flags = layout_box.change_flags();
        assert!(flags.background && flags.border && flags.origin && flags.padding);
        assert!(flags.size && flags.should_paint && flags.changed);
        assert!(!flags.content);
        assert!(!layout_box.is_child_changed());
    }

    #[test]
    fn test_content_bounds_subtracts_border_and_padding() {
        let mut layout_box = flow_box(1);
        layout_box.bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        layout_box.border = Border::uniform(Color::BLACK, 10.0);
        layout_box.padding = Padding(Thickness::uniform(5.0));
        assert_eq!(layout_box.content_bounds(), Rect::new(15.0, 15.0, 70.0, 20.0));
    }

    #[test]
    fn test_display_prints_class_and_sequence() {
        let mut layout_box = flow_box(12);
        layout_box.bounds = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(layout_box.to_string(), "FlowBox.12 (1,2)+(3x4)");
    }
}
