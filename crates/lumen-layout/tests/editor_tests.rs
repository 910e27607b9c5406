//! Tests for the box editor: versions, dirty propagation, phase gating and
//! content updates.

use std::cell::Cell;
use std::rc::Rc;

use lumen_dom::NodeId;
use lumen_layout::{
    ApproximateTextShaper, Border, BoxSelection, BoxSelectionEditor, BoxTree, ChangeFlags, Color,
    Layouter, Margin, Painter, Phase, Rect, Size, Style, ViewLifecycle,
};

fn new_tree() -> BoxTree {
    BoxTree::new(Rc::new(ViewLifecycle::new()))
}

/// Run a paint pass so every flag in the tree is cleared.
fn paint_clean(tree: &mut BoxTree) {
    let _ = Painter::new().paint(tree).unwrap();
    assert!(tree.is_paint_clean());
}

#[test]
fn test_mark_dirty_bumps_tree_version() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.create_flow_box(None);
    tree.editor().append_child(root, a);
    let before = tree.version();

    tree.editor().mark_dirty(a);

    assert_eq!(tree.version(), before + 1);
    assert_eq!(tree[a].version(), tree.version());
}

#[test]
fn test_append_child_copies_container_version() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.create_flow_box(None);
    let b = tree.create_flow_box(None);
    tree.editor().append_child(root, a);
    tree.editor().append_child(a, b);

    assert_eq!(tree[b].version(), tree[a].version());
    assert_eq!(tree[a].version(), tree.version());
}

#[test]
fn test_versions_only_increase() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.create_flow_box(None);
    let b = tree.create_text_box(None, "b");
    let mut seen = vec![tree.version()];
    let mut editor = tree.editor();
    editor.append_child(root, a);
    editor.append_child(a, b);
    editor.set_text(b, "changed");
    editor.set_style(a, &Style::new().with_background(Color::WHITE));
    editor.remove_child(a, b);
    seen.push(tree.version());

    assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(tree.version(), 5);
}

#[test]
fn test_identical_style_does_not_mark_dirty() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.create_flow_box(None);
    tree.editor().append_child(root, a);
    let style = Style::new()
        .with_background(Color::rgb(255, 0, 0))
        .with_margin(Margin::uniform(4.0));

    tree.editor().set_style(a, &style);
    let after_first = tree.version();
    tree.editor().set_style(a, &style);

    assert_eq!(tree.version(), after_first);
    assert_eq!(tree[a].background(), Color::rgb(255, 0, 0));
}

#[test]
fn test_set_style_flags_only_changed_aspects() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.create_flow_box(None);
    tree.editor().append_child(root, a);
    paint_clean(&mut tree);

    tree.editor()
        .set_style(a, &Style::new().with_background(Color::rgb(0, 0, 255)));

    let flags = tree[a].change_flags();
    assert!(flags.changed);
    assert!(flags.background);
    assert!(!flags.size);
    assert!(!flags.origin);
    assert!(tree.root_box().is_child_changed());
}

#[test]
fn test_dirty_propagation_reaches_root() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.create_flow_box(None);
    let b = tree.create_flow_box(None);
    let c = tree.create_text_box(None, "c");
    let mut editor = tree.editor();
    editor.append_child(root, a);
    editor.append_child(a, b);
    editor.append_child(b, c);
    paint_clean(&mut tree);

    tree.editor().mark_dirty(c);

    assert!(tree[c].is_changed());
    assert!(tree[b].is_child_changed());
    assert!(tree[a].is_child_changed());
    assert!(tree.root_box().is_child_changed());
    assert!(!tree[b].is_changed());
}

#[test]
fn test_dirty_propagation_stops_at_changed_ancestor() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.create_flow_box(None);
    let b = tree.create_flow_box(None);
    let c = tree.create_text_box(None, "c");
    let mut editor = tree.editor();
    editor.append_child(root, a);
    editor.append_child(a, b);
    editor.append_child(b, c);
    paint_clean(&mut tree);

    tree.editor().mark_dirty(b);
    tree.editor().mark_dirty(c);

    // b already changed, so it is not also told about its child.
    assert!(tree[b].is_changed());
    assert!(!tree[b].is_child_changed());
    assert!(tree[a].is_child_changed());
}

#[test]
fn test_mark_dirty_schedules_visual_update_for_attached_boxes() {
    let lifecycle = Rc::new(ViewLifecycle::new());
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    lifecycle.set_schedule_callback(move || counter.set(counter.get() + 1));
    let mut tree = BoxTree::new(Rc::clone(&lifecycle));
    let root = tree.root();
    let attached = tree.create_flow_box(None);
    let detached = tree.create_flow_box(None);
    tree.editor().append_child(root, attached);
    let after_append = calls.get();

    tree.editor().mark_dirty(detached);
    assert_eq!(calls.get(), after_append);

    tree.editor().mark_dirty(attached);
    assert_eq!(calls.get(), after_append + 1);
    assert!(lifecycle.is_visual_update_requested());
}

#[test]
fn test_did_paint_clears_all_flags() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.create_flow_box(None);
    tree.editor().append_child(root, a);
    let lifecycle = tree.lifecycle_handle();
    {
        let _scope = lifecycle.start(Phase::InPaint).unwrap();
        tree.editor().did_paint(a);
        tree.editor().did_paint(root);
    }

    assert_eq!(tree[a].change_flags(), ChangeFlags::default());
    assert!(!tree.root_box().is_child_changed());
    assert_eq!(lifecycle.phase(), Phase::PaintClean);
}

#[test]
fn test_set_should_paint_walks_up_until_already_set() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.create_flow_box(None);
    let b = tree.create_text_box(None, "b");
    let mut editor = tree.editor();
    editor.append_child(root, a);
    editor.append_child(a, b);
    paint_clean(&mut tree);

    tree.editor().set_should_paint(b);

    assert!(tree[b].should_paint());
    assert!(tree[a].should_paint());
    assert!(tree.root_box().should_paint());
    assert!(!tree[b].is_changed());
}

#[test]
#[should_panic(expected = "append_child is not allowed in InLayout")]
fn test_structure_change_during_layout_panics() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.create_flow_box(None);
    let lifecycle = tree.lifecycle_handle();
    let _scope = lifecycle.start(Phase::InLayout).unwrap();
    tree.editor().append_child(root, a);
}

#[test]
#[should_panic(expected = "set_style is not allowed in InPaint")]
fn test_style_change_during_paint_panics() {
    let mut tree = new_tree();
    let root = tree.root();
    let lifecycle = tree.lifecycle_handle();
    let _scope = lifecycle.start(Phase::InPaint).unwrap();
    tree.editor()
        .set_style(root, &Style::new().with_background(Color::WHITE));
}

#[test]
#[should_panic(expected = "set_bounds is only allowed in layout")]
fn test_set_bounds_outside_layout_panics() {
    let mut tree = new_tree();
    let a = tree.create_flow_box(None);
    tree.editor().set_bounds(a, Rect::new(0.0, 0.0, 10.0, 10.0));
}

#[test]
fn test_set_bounds_flags_follow_what_changed() {
    let mut tree = new_tree();
    let root = tree.root();
    let plain = tree.create_flow_box(None);
    let bordered = tree.create_flow_box(None);
    let mut editor = tree.editor();
    editor.append_child(root, plain);
    editor.append_child(root, bordered);
    editor.set_style(
        bordered,
        &Style::new().with_border(Border::uniform(Color::BLACK, 1.0)),
    );
    paint_clean(&mut tree);
    let lifecycle = tree.lifecycle_handle();
    let clear_flags = |tree: &mut BoxTree| {
        let _scope = lifecycle.start(Phase::InPaint).unwrap();
        let mut editor = tree.editor();
        editor.did_paint(plain);
        editor.did_paint(bordered);
    };

    // A resize repaints the background, and the border only if there is one.
    {
        let _scope = lifecycle.start(Phase::InLayout).unwrap();
        let mut editor = tree.editor();
        editor.set_bounds(plain, Rect::new(0.0, 0.0, 10.0, 10.0));
        editor.set_bounds(bordered, Rect::new(0.0, 0.0, 10.0, 10.0));
    }
    assert_eq!(
        tree[plain].change_flags(),
        ChangeFlags {
            background: true,
            size: true,
            ..ChangeFlags::default()
        }
    );
    assert_eq!(
        tree[bordered].change_flags(),
        ChangeFlags {
            background: true,
            border: true,
            size: true,
            ..ChangeFlags::default()
        }
    );
    clear_flags(&mut tree);

    // A move only touches the origin.
    {
        let _scope = lifecycle.start(Phase::InLayout).unwrap();
        tree.editor().set_bounds(plain, Rect::new(5.0, 5.0, 10.0, 10.0));
    }
    assert_eq!(
        tree[plain].change_flags(),
        ChangeFlags {
            origin: true,
            ..ChangeFlags::default()
        }
    );
    clear_flags(&mut tree);

    // The same bounds again change nothing.
    let version = tree.version();
    {
        let _scope = lifecycle.start(Phase::InLayout).unwrap();
        tree.editor().set_bounds(plain, Rect::new(5.0, 5.0, 10.0, 10.0));
    }
    assert_eq!(tree[plain].change_flags(), ChangeFlags::default());
    assert_eq!(tree[plain].bounds(), Rect::new(5.0, 5.0, 10.0, 10.0));
    assert_eq!(tree.version(), version);
}

#[test]
fn test_resizing_text_box_drops_cached_layout() {
    let mut tree = new_tree();
    let root = tree.root();
    let text = tree.create_text_box(None, "wrap me");
    tree.editor().append_child(root, text);
    let shaper = ApproximateTextShaper::default();
    let lifecycle = tree.lifecycle_handle();
    let _scope = lifecycle.start(Phase::InLayout).unwrap();
    tree.editor().set_bounds(text, Rect::new(0.0, 0.0, 100.0, 20.0));
    tree.editor().allocate_text_layout(text, &shaper);
    assert!(tree[text].as_text().unwrap().text_layout().is_some());

    tree.editor().set_bounds(text, Rect::new(4.0, 0.0, 100.0, 20.0));
    assert!(tree[text].as_text().unwrap().text_layout().is_some());

    tree.editor().set_bounds(text, Rect::new(4.0, 0.0, 60.0, 20.0));
    let data = tree[text].as_text().unwrap();
    assert!(data.text_layout().is_none());
    assert!(data.text_format().is_some());
}

#[test]
#[should_panic(expected = "did_paint is only allowed in paint")]
fn test_did_paint_outside_paint_panics() {
    let mut tree = new_tree();
    let root = tree.root();
    tree.editor().did_paint(root);
}

#[test]
#[should_panic(expected = "would create a cycle")]
fn test_append_ancestor_to_descendant_panics() {
    let mut tree = new_tree();
    let a = tree.create_flow_box(None);
    let b = tree.create_flow_box(None);
    tree.editor().append_child(a, b);
    tree.editor().append_child(b, a);
}

#[test]
#[should_panic(expected = "would create a cycle")]
fn test_append_to_self_panics() {
    let mut tree = new_tree();
    let a = tree.create_flow_box(None);
    tree.editor().append_child(a, a);
}

#[test]
#[should_panic(expected = "append_child with an attached child")]
fn test_double_parenting_panics() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.create_flow_box(None);
    let b = tree.create_flow_box(None);
    let c = tree.create_flow_box(None);
    tree.editor().append_child(root, a);
    tree.editor().append_child(root, b);
    tree.editor().append_child(a, c);
    tree.editor().append_child(b, c);
}

#[test]
#[should_panic(expected = "append_child target is not a container")]
fn test_append_to_text_box_panics() {
    let mut tree = new_tree();
    let text = tree.create_text_box(None, "leaf");
    let a = tree.create_flow_box(None);
    tree.editor().append_child(text, a);
}

#[test]
fn test_remove_all_children_destroys_only_anonymous_boxes() {
    let mut tree = new_tree();
    let root = tree.root();
    let container = tree.create_flow_box(Some(NodeId(1)));
    let backed = tree.create_flow_box(Some(NodeId(2)));
    let anonymous = tree.create_flow_box(None);
    let nested = tree.create_text_box(None, "inner");
    let mut editor = tree.editor();
    editor.append_child(root, container);
    editor.append_child(container, backed);
    editor.append_child(container, anonymous);
    editor.append_child(anonymous, nested);

    tree.editor().remove_all_children(container);

    assert!(tree.contains(backed));
    assert_eq!(tree[backed].parent(), None);
    assert!(!tree.contains(anonymous));
    assert!(!tree.contains(nested));
    assert_eq!(tree.children(container).count(), 0);
}

#[test]
fn test_remove_descendants_keeps_node_backed_boxes_alive() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.create_flow_box(Some(NodeId(1)));
    let b = tree.create_text_box(Some(NodeId(2)), "b");
    let anonymous = tree.create_flow_box(None);
    let mut editor = tree.editor();
    editor.append_child(root, a);
    editor.append_child(a, b);
    editor.append_child(root, anonymous);

    tree.editor().remove_descendants(root);

    assert_eq!(tree.len(), 3);
    assert_eq!(tree[a].parent(), None);
    assert_eq!(tree[b].parent(), None);
    assert!(!tree.contains(anonymous));
}

#[test]
fn test_set_viewport_size_is_noop_when_unchanged() {
    let mut tree = new_tree();
    tree.editor().set_viewport_size(Size::new(800.0, 600.0));
    assert!(tree.root_box().is_size_changed());
    assert_eq!(tree.root_box().bounds(), Rect::new(0.0, 0.0, 800.0, 600.0));
    paint_clean(&mut tree);

    tree.editor().set_viewport_size(Size::new(800.0, 600.0));

    assert!(!tree.root_box().is_size_changed());
    assert_eq!(tree.lifecycle().phase(), Phase::PaintClean);
}

#[test]
fn test_set_selection_is_noop_when_equal() {
    let mut tree = new_tree();
    let root = tree.root();
    let text = tree.create_text_box(None, "abc");
    tree.editor().append_child(root, text);
    let mut selection = BoxSelection::default();
    BoxSelectionEditor::collapse(&tree, &mut selection, text, 1);
    tree.editor().set_selection(selection.clone());
    assert!(tree.is_selection_changed());
    paint_clean(&mut tree);

    tree.editor().set_selection(selection);

    assert!(!tree.is_selection_changed());
}

#[test]
fn test_set_text_drops_text_layout() {
    let mut tree = new_tree();
    let root = tree.root();
    let text = tree.create_text_box(None, "hello");
    tree.editor().set_viewport_size(Size::new(200.0, 100.0));
    tree.editor().append_child(root, text);
    let shaper = ApproximateTextShaper::default();
    assert!(Layouter::new(&shaper).layout(&mut tree).unwrap());
    assert!(tree[text].as_text().unwrap().text_layout().is_some());
    paint_clean(&mut tree);

    tree.editor().set_text(text, "goodbye");

    let data = tree[text].as_text().unwrap();
    assert_eq!(data.text(), "goodbye");
    assert!(data.text_layout().is_none());
    assert!(tree[text].is_content_changed());
    assert!(tree[text].is_changed());
}

#[test]
fn test_set_text_clamps_selection() {
    let mut tree = new_tree();
    let root = tree.root();
    let text = tree.create_text_box(None, "abcd");
    tree.editor().append_child(root, text);
    let mut selection = BoxSelection::default();
    BoxSelectionEditor::collapse(&tree, &mut selection, text, 4);
    tree.editor().set_selection(selection);

    tree.editor().set_text(text, "ab");

    assert_eq!(tree.selection().focus_offset(), 2);
    assert_eq!(tree.selection().anchor_offset(), 2);
}

#[test]
fn test_text_style_resets_font_caches() {
    let mut tree = new_tree();
    let root = tree.root();
    let text = tree.create_text_box(None, "hello");
    tree.editor().set_viewport_size(Size::new(200.0, 100.0));
    tree.editor().append_child(root, text);
    let shaper = ApproximateTextShaper::default();
    let _ = Layouter::new(&shaper).layout(&mut tree).unwrap();
    paint_clean(&mut tree);

    tree.editor().set_style(text, &Style::new().with_font_size(24.0));

    let data = tree[text].as_text().unwrap();
    assert!((data.font().size - 24.0).abs() < f32::EPSILON);
    assert!(data.text_format().is_none());
    assert!(data.text_layout().is_none());
    assert!(tree[text].is_content_changed());
}

#[test]
#[should_panic(expected = "set_content_changed on a container")]
fn test_set_content_changed_on_container_panics() {
    let mut tree = new_tree();
    let a = tree.create_flow_box(None);
    tree.editor().set_content_changed(a);
}
