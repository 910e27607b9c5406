//! Serializable dumps of a box tree, for diagnostics and tests.

use serde::Serialize;

use crate::boxes::{BoxClass, BoxId, BoxTree, ChangeFlags};
use crate::geometry::Rect;
use crate::style::Style;

/// One box and its subtree, as plain data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSnapshot {
    /// Concrete class.
    pub class: BoxClass,
    /// Creation order within the tree.
    pub sequence_id: u32,
    /// Index of the backing document node, if any.
    pub node: Option<usize>,
    /// Border box relative to the parent's content box.
    pub bounds: Rect,
    /// Version at which the box last changed.
    pub version: u64,
    /// Change flags at capture time.
    pub flags: ChangeFlags,
    /// Whether any descendant changed.
    pub child_changed: bool,
    /// Style rebuilt from the box's resolved fields.
    pub style: Style,
    /// Text run, for text boxes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Children in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BoxSnapshot>,
}

impl BoxSnapshot {
    /// Capture the subtree rooted at `id`. Returns `None` for a destroyed
    /// box.
    #[must_use]
    pub fn capture(tree: &BoxTree, id: BoxId) -> Option<Self> {
        let layout_box = tree.get(id)?;
        Some(Self {
            class: layout_box.class(),
            sequence_id: layout_box.sequence_id(),
            node: layout_box.node().map(|node| node.0),
            bounds: layout_box.bounds(),
            version: layout_box.version(),
            flags: layout_box.change_flags(),
            child_changed: layout_box.is_child_changed(),
            style: layout_box.compute_actual_style(),
            text: layout_box.as_text().map(|text| text.text().to_string()),
            children: tree
                .children(id)
                .filter_map(|child| Self::capture(tree, child))
                .collect(),
        })
    }

    /// An indented one-line-per-box outline, using the boxes' display form.
    #[must_use]
    pub fn outline(tree: &BoxTree) -> String {
        let mut out = String::new();
        for id in tree.descendants_or_self(tree.root()) {
            let depth = tree.ancestors(id).count();
            out.push_str(&"  ".repeat(depth));
            out.push_str(&tree[id].to_string());
            out.push('\n');
        }
        out
    }
}

/// Render the whole tree as pretty-printed JSON.
///
/// # Errors
///
/// Returns the serializer's error; the snapshot types themselves always
/// serialize.
pub fn dump_json(tree: &BoxTree) -> serde_json::Result<String> {
    let snapshot = BoxSnapshot::capture(tree, tree.root());
    serde_json::to_string_pretty(&snapshot)
}
