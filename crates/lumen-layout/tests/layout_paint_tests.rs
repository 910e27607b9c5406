//! Tests for the layout and paint drivers.
//!
//! The shaper used here advances every glyph by half the font size and makes
//! lines exactly one font size tall, so a 16px glyph is 8px wide and a line
//! is 16px tall.

use std::rc::Rc;

use lumen_layout::{
    ApproximateTextShaper, Border, BoxId, BoxSelection, BoxSelectionEditor, BoxTree, CaretShape,
    Color, Dimension, DisplayItem, ImageBitmap, LayoutConfig, Layouter, Margin, Padding, Painter,
    Phase, Position, Rect, Size, Style, ViewLifecycle,
};

const SHAPER: ApproximateTextShaper = ApproximateTextShaper {
    char_width_ratio: 0.5,
    line_height_ratio: 1.0,
};

fn new_tree() -> BoxTree {
    let mut tree = BoxTree::new(Rc::new(ViewLifecycle::new()));
    tree.editor().set_viewport_size(Size::new(800.0, 600.0));
    tree
}

fn append_flow(tree: &mut BoxTree, parent: BoxId, style: &Style) -> BoxId {
    let id = tree.create_flow_box(None);
    let mut editor = tree.editor();
    editor.append_child(parent, id);
    editor.set_style(id, style);
    id
}

fn append_text(tree: &mut BoxTree, parent: BoxId, text: &str) -> BoxId {
    let id = tree.create_text_box(None, text);
    tree.editor().append_child(parent, id);
    id
}

fn layout(tree: &mut BoxTree) -> bool {
    Layouter::new(&SHAPER).layout(tree).unwrap()
}

fn fixed_height(height: f32) -> Style {
    Style::new().with_size(Dimension::Auto, Dimension::Length(height))
}

fn texts(items: &[DisplayItem]) -> Vec<(String, f32, f32)> {
    items
        .iter()
        .filter_map(|item| match item {
            DisplayItem::DrawText { origin, text, .. } => Some((text.clone(), origin.x, origin.y)),
            _ => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[test]
fn test_blocks_stack_vertically_with_margins() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = append_flow(
        &mut tree,
        root,
        &fixed_height(50.0).with_margin(Margin::uniform(10.0)),
    );
    let b = append_flow(&mut tree, root, &fixed_height(30.0));

    assert!(layout(&mut tree));

    assert_eq!(tree[a].bounds(), Rect::new(10.0, 10.0, 780.0, 50.0));
    assert_eq!(tree[b].bounds(), Rect::new(0.0, 70.0, 800.0, 30.0));
    assert_eq!(tree.lifecycle().phase(), Phase::LayoutClean);
}

#[test]
fn test_absolute_box_takes_no_room_in_flow() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = append_flow(&mut tree, root, &fixed_height(50.0));
    let positioned = append_flow(
        &mut tree,
        root,
        &Style::new()
            .with_position(Position::Absolute)
            .with_offset(Dimension::Length(5.0), Dimension::Length(7.0))
            .with_size(Dimension::Length(20.0), Dimension::Length(20.0)),
    );
    let b = append_flow(&mut tree, root, &fixed_height(30.0));

    let _ = layout(&mut tree);

    assert_eq!(tree[a].bounds(), Rect::new(0.0, 0.0, 800.0, 50.0));
    assert_eq!(tree[positioned].bounds(), Rect::new(5.0, 7.0, 20.0, 20.0));
    assert_eq!(tree[b].bounds(), Rect::new(0.0, 50.0, 800.0, 30.0));
}

#[test]
fn test_relative_offset_does_not_move_siblings() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = append_flow(
        &mut tree,
        root,
        &fixed_height(10.0)
            .with_position(Position::Relative)
            .with_offset(Dimension::Length(5.0), Dimension::Length(5.0)),
    );
    let b = append_flow(&mut tree, root, &fixed_height(10.0));

    let _ = layout(&mut tree);

    assert_eq!(tree[a].bounds(), Rect::new(5.0, 5.0, 800.0, 10.0));
    assert_eq!(tree[b].bounds(), Rect::new(0.0, 10.0, 800.0, 10.0));
}

#[test]
fn test_inline_children_flow_horizontally() {
    let mut tree = new_tree();
    let root = tree.root();
    let p = append_flow(&mut tree, root, &Style::new());
    let first = append_text(&mut tree, p, "ab");
    let second = append_text(&mut tree, p, "cde");

    let _ = layout(&mut tree);

    assert_eq!(tree[p].bounds(), Rect::new(0.0, 0.0, 800.0, 16.0));
    assert_eq!(tree[first].bounds(), Rect::new(0.0, 0.0, 16.0, 16.0));
    assert_eq!(tree[second].bounds(), Rect::new(16.0, 0.0, 24.0, 16.0));
    let data = tree[first].as_text().unwrap();
    assert!((data.baseline() - 12.8).abs() < 0.001);
    assert!(data.text_layout().is_some());
}

#[test]
fn test_padding_and_border_inset_children() {
    let mut tree = new_tree();
    let root = tree.root();
    let outer = append_flow(
        &mut tree,
        root,
        &Style::new()
            .with_border(Border::uniform(Color::BLACK, 2.0))
            .with_padding(Padding::uniform(3.0)),
    );
    let inner = append_flow(&mut tree, outer, &fixed_height(10.0));

    let _ = layout(&mut tree);

    assert_eq!(tree[outer].bounds(), Rect::new(0.0, 0.0, 800.0, 20.0));
    assert_eq!(tree[inner].bounds(), Rect::new(0.0, 0.0, 790.0, 10.0));
    assert_eq!(
        tree[outer].content_bounds(),
        Rect::new(5.0, 5.0, 790.0, 10.0)
    );
}

#[test]
fn test_text_wraps_to_containing_width() {
    let mut tree = new_tree();
    let root = tree.root();
    let p = append_flow(
        &mut tree,
        root,
        &Style::new().with_size(Dimension::Length(40.0), Dimension::Auto),
    );
    let text = append_text(&mut tree, p, "aaa bbb");

    let _ = layout(&mut tree);

    assert_eq!(tree[p].bounds(), Rect::new(0.0, 0.0, 40.0, 32.0));
    assert_eq!(tree[text].bounds(), Rect::new(0.0, 0.0, 24.0, 32.0));
    let list = Painter::new().paint(&mut tree).unwrap();
    assert_eq!(
        texts(list.items()),
        vec![("aaa".to_string(), 0.0, 0.0), ("bbb".to_string(), 0.0, 16.0)]
    );
}

#[test]
fn test_text_stays_on_one_line_without_wrapping() {
    let mut tree = new_tree();
    let root = tree.root();
    let p = append_flow(
        &mut tree,
        root,
        &Style::new().with_size(Dimension::Length(40.0), Dimension::Auto),
    );
    let text = append_text(&mut tree, p, "aaa bbb");
    let config = LayoutConfig {
        wrap_text: false,
        ..LayoutConfig::default()
    };

    let _ = Layouter::with_config(&SHAPER, config)
        .layout(&mut tree)
        .unwrap();

    assert_eq!(tree[text].bounds(), Rect::new(0.0, 0.0, 56.0, 16.0));
    assert_eq!(tree[text].as_text().unwrap().text_layout().unwrap().lines().len(), 1);
}

#[test]
fn test_image_uses_intrinsic_size() {
    let mut tree = new_tree();
    let root = tree.root();
    let image = tree.create_image_box(None, ImageBitmap::new(3, 2, vec![255; 24]));
    tree.editor().append_child(root, image);

    let _ = layout(&mut tree);

    assert_eq!(tree[image].bounds(), Rect::new(0.0, 0.0, 3.0, 2.0));
    let list = Painter::new().paint(&mut tree).unwrap();
    assert!(list.items().iter().any(|item| matches!(
        item,
        DisplayItem::DrawImage { rect, .. } if *rect == Rect::new(0.0, 0.0, 3.0, 2.0)
    )));
}

#[test]
fn test_layout_of_clean_tree_does_nothing() {
    let mut tree = new_tree();
    let root = tree.root();
    let _ = append_flow(&mut tree, root, &fixed_height(10.0));
    assert!(layout(&mut tree));
    let _ = Painter::new().paint(&mut tree).unwrap();

    assert!(!layout(&mut tree));
    assert_eq!(tree.lifecycle().phase(), Phase::PaintClean);
}

#[test]
fn test_viewport_resize_relays_out_blocks() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = append_flow(&mut tree, root, &fixed_height(10.0));
    let _ = layout(&mut tree);
    let _ = Painter::new().paint(&mut tree).unwrap();

    tree.editor().set_viewport_size(Size::new(400.0, 300.0));
    assert!(layout(&mut tree));

    assert_eq!(tree[a].bounds(), Rect::new(0.0, 0.0, 400.0, 10.0));
    assert!(tree[a].is_size_changed());
}

// ---------------------------------------------------------------------------
// Paint
// ---------------------------------------------------------------------------

#[test]
fn test_first_paint_draws_everything_and_clears_flags() {
    let mut tree = new_tree();
    let root = tree.root();
    let red = Color::rgb(255, 0, 0);
    let a = append_flow(
        &mut tree,
        root,
        &fixed_height(50.0)
            .with_margin(Margin::uniform(10.0))
            .with_background(red),
    );
    let b = append_flow(&mut tree, root, &fixed_height(30.0));
    let _ = layout(&mut tree);

    let list = Painter::new().paint(&mut tree).unwrap();

    assert_eq!(
        list.items(),
        &[DisplayItem::FillRect {
            rect: Rect::new(10.0, 10.0, 780.0, 50.0),
            color: red,
        }]
    );
    assert_eq!(list.repainted(), &[root, a, b]);
    assert!(tree.is_paint_clean());
    assert!(!tree[a].is_changed());
    assert_eq!(tree.lifecycle().phase(), Phase::PaintClean);
}

#[test]
fn test_second_paint_is_empty() {
    let mut tree = new_tree();
    let root = tree.root();
    let _ = append_flow(
        &mut tree,
        root,
        &fixed_height(20.0).with_background(Color::WHITE),
    );
    let _ = layout(&mut tree);
    let _ = Painter::new().paint(&mut tree).unwrap();

    let list = Painter::new().paint(&mut tree).unwrap();

    assert!(list.is_empty());
    assert!(list.repainted().is_empty());
}

#[test]
fn test_repaint_only_changed_box() {
    let mut tree = new_tree();
    let root = tree.root();
    let _ = append_flow(
        &mut tree,
        root,
        &fixed_height(50.0).with_background(Color::WHITE),
    );
    let b = append_flow(&mut tree, root, &fixed_height(30.0));
    let _ = layout(&mut tree);
    let _ = Painter::new().paint(&mut tree).unwrap();

    let blue = Color::rgb(0, 0, 255);
    tree.editor().set_style(b, &Style::new().with_background(blue));
    let _ = layout(&mut tree);
    let list = Painter::new().paint(&mut tree).unwrap();

    assert_eq!(
        list.items(),
        &[DisplayItem::FillRect {
            rect: Rect::new(0.0, 50.0, 800.0, 30.0),
            color: blue,
        }]
    );
    assert_eq!(list.repainted(), &[b]);
}

#[test]
fn test_border_paints_four_sides() {
    let mut tree = new_tree();
    let root = tree.root();
    let _ = append_flow(
        &mut tree,
        root,
        &Style::new()
            .with_position(Position::Absolute)
            .with_size(Dimension::Length(20.0), Dimension::Length(10.0))
            .with_border(Border::uniform(Color::BLACK, 2.0)),
    );
    let _ = layout(&mut tree);

    let list = Painter::new().paint(&mut tree).unwrap();

    let rects: Vec<Rect> = list
        .items()
        .iter()
        .filter_map(|item| match item {
            DisplayItem::FillRect { rect, .. } => Some(*rect),
            _ => None,
        })
        .collect();
    assert_eq!(
        rects,
        vec![
            Rect::new(0.0, 0.0, 24.0, 2.0),
            Rect::new(0.0, 12.0, 24.0, 2.0),
            Rect::new(0.0, 2.0, 2.0, 10.0),
            Rect::new(22.0, 2.0, 2.0, 10.0),
        ]
    );
}

#[test]
fn test_text_is_drawn_at_absolute_position() {
    let mut tree = new_tree();
    let root = tree.root();
    let _ = append_flow(&mut tree, root, &fixed_height(20.0));
    let p = append_flow(&mut tree, root, &Style::new());
    let _ = append_text(&mut tree, p, "ab");
    let _ = append_text(&mut tree, p, "cd");
    let _ = layout(&mut tree);

    let list = Painter::new().paint(&mut tree).unwrap();

    assert_eq!(
        texts(list.items()),
        vec![
            ("ab".to_string(), 0.0, 20.0),
            ("cd".to_string(), 16.0, 20.0)
        ]
    );
}

#[test]
fn test_caret_is_painted_after_text() {
    let mut tree = new_tree();
    let root = tree.root();
    let text = append_text(&mut tree, root, "abcd");
    let mut selection = BoxSelection::default();
    BoxSelectionEditor::collapse(&tree, &mut selection, text, 1);
    tree.editor().set_selection(selection);
    let _ = layout(&mut tree);

    let list = Painter::new().paint(&mut tree).unwrap();

    assert_eq!(
        list.items().last(),
        Some(&DisplayItem::DrawCaret {
            rect: Rect::new(8.0, 0.0, 1.0, 16.0),
            color: Color::BLACK,
        })
    );
    assert!(!tree.is_selection_changed());
}

#[test]
fn test_box_caret_covers_next_character() {
    let mut tree = new_tree();
    let root = tree.root();
    let text = append_text(&mut tree, root, "abcd");
    let mut selection = BoxSelection::default();
    BoxSelectionEditor::set_caret_shape(&mut selection, CaretShape::Box);
    BoxSelectionEditor::collapse(&tree, &mut selection, text, 2);
    tree.editor().set_selection(selection);
    let _ = layout(&mut tree);

    let list = Painter::new().paint(&mut tree).unwrap();

    assert!(list.items().iter().any(|item| matches!(
        item,
        DisplayItem::DrawCaret { rect, .. } if *rect == Rect::new(16.0, 0.0, 8.0, 16.0)
    )));
}

#[test]
fn test_selection_change_repaints_clean_text() {
    let mut tree = new_tree();
    let root = tree.root();
    let text = append_text(&mut tree, root, "abcd");
    let _ = layout(&mut tree);
    let _ = Painter::new().paint(&mut tree).unwrap();

    let mut selection = BoxSelection::default();
    BoxSelectionEditor::collapse(&tree, &mut selection, text, 0);
    tree.editor().set_selection(selection);
    let list = Painter::new().paint(&mut tree).unwrap();

    assert!(
        list.items()
            .iter()
            .any(|item| matches!(item, DisplayItem::DrawCaret { .. }))
    );
}

#[test]
fn test_range_highlights_across_boxes() {
    let mut tree = new_tree();
    let root = tree.root();
    let first = append_text(&mut tree, root, "abcd");
    let second = append_text(&mut tree, root, "efgh");
    let mut selection = BoxSelection::default();
    BoxSelectionEditor::collapse(&tree, &mut selection, second, 1);
    BoxSelectionEditor::extend_to(&tree, &mut selection, first, 2);
    tree.editor().set_selection(selection);
    let _ = layout(&mut tree);

    let list = Painter::new().paint(&mut tree).unwrap();

    let highlights: Vec<Rect> = list
        .items()
        .iter()
        .filter_map(|item| match item {
            DisplayItem::FillSelection { rect, .. } => Some(*rect),
            _ => None,
        })
        .collect();
    assert_eq!(
        highlights,
        vec![
            Rect::new(16.0, 0.0, 16.0, 16.0),
            Rect::new(32.0, 0.0, 8.0, 16.0)
        ]
    );
    assert!(
        !list
            .items()
            .iter()
            .any(|item| matches!(item, DisplayItem::DrawCaret { .. }))
    );
}

#[test]
fn test_paint_during_layout_is_rejected() {
    let mut tree = new_tree();
    let lifecycle = tree.lifecycle_handle();
    let _scope = lifecycle.start(Phase::InLayout).unwrap();

    assert!(Painter::new().paint(&mut tree).is_err());
}
