//! Property tests for tree shape and version bookkeeping under random edits.

use std::rc::Rc;

use lumen_layout::{BoxId, BoxTree, ViewLifecycle};
use quickcheck_macros::quickcheck;

const POOL_SIZE: usize = 6;

/// Forward child links must mirror backward links, and every child must
/// point back at its container.
fn links_are_consistent(tree: &BoxTree, ids: &[BoxId]) -> bool {
    ids.iter().all(|&container| {
        let forward: Vec<BoxId> = tree.children(container).collect();
        let mut backward = Vec::new();
        let mut runner = tree[container].last_child();
        while let Some(child) = runner {
            backward.push(child);
            runner = tree[child].previous_sibling();
        }
        backward.reverse();
        forward == backward && forward.iter().all(|&child| tree[child].parent() == Some(container))
    })
}

/// Apply `(box, target, detach)` edits to a pool of flow boxes: either
/// detach `box` from its parent or append it to `target` when that is legal.
/// The root is in the pool as a container only.
fn apply_edits(tree: &mut BoxTree, pool: &[BoxId], edits: &[(u8, u8, bool)]) -> Vec<u64> {
    let mut versions = vec![tree.version()];
    for &(which, target, detach) in edits {
        let child = pool[usize::from(which) % pool.len()];
        let container = pool[usize::from(target) % pool.len()];
        let parent = tree[child].parent();
        if detach {
            if let Some(parent) = parent {
                tree.editor().remove_child(parent, child);
            }
        } else if parent.is_none()
            && child != tree.root()
            && child != container
            && !tree.is_descendant_of(container, child)
        {
            tree.editor().append_child(container, child);
        }
        versions.push(tree.version());
    }
    versions
}

fn pool_tree() -> (BoxTree, Vec<BoxId>) {
    let mut tree = BoxTree::new(Rc::new(ViewLifecycle::new()));
    let root = tree.root();
    let mut pool = vec![root];
    pool.extend((0..POOL_SIZE).map(|_| tree.create_flow_box(None)));
    (tree, pool)
}

#[quickcheck]
fn prop_random_edits_keep_sibling_links_consistent(edits: Vec<(u8, u8, bool)>) -> bool {
    let (mut tree, pool) = pool_tree();
    let _ = apply_edits(&mut tree, &pool, &edits);
    links_are_consistent(&tree, &pool)
}

#[quickcheck]
fn prop_tree_version_never_decreases(edits: Vec<(u8, u8, bool)>) -> bool {
    let (mut tree, pool) = pool_tree();
    let versions = apply_edits(&mut tree, &pool, &edits);
    versions.windows(2).all(|pair| pair[0] <= pair[1])
}

#[quickcheck]
fn prop_attached_boxes_carry_a_version_no_newer_than_the_tree(edits: Vec<(u8, u8, bool)>) -> bool {
    let (mut tree, pool) = pool_tree();
    let _ = apply_edits(&mut tree, &pool, &edits);
    let root = tree.root();
    tree.descendants_or_self(root)
        .all(|id| tree[id].version() <= tree.version())
}

#[quickcheck]
fn prop_pre_order_visits_each_attached_box_once(edits: Vec<(u8, u8, bool)>) -> bool {
    let (mut tree, pool) = pool_tree();
    let _ = apply_edits(&mut tree, &pool, &edits);
    let root = tree.root();
    let mut visited: Vec<BoxId> = tree.descendants_or_self(root).collect();
    let count = visited.len();
    visited.sort();
    visited.dedup();
    let attached = pool.iter().filter(|&&id| tree.in_document(id)).count();
    visited.len() == count && count == attached
}
