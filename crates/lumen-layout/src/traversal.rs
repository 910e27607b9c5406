//! Read-only walks over a [`BoxTree`].
//!
//! The iterators borrow the tree immutably, so the tree cannot be edited
//! while one is alive. They are `Clone`; cloning an iterator restarts the
//! walk from the position it was cloned at.

use crate::boxes::{BoxId, BoxTree, LayoutBox};

/// Single-step navigation helpers.
#[derive(Debug, Clone, Copy)]
pub struct BoxTraversal;

impl BoxTraversal {
    /// First child of `id`, if it is a container with children.
    #[must_use]
    pub fn first_child_of(tree: &BoxTree, id: BoxId) -> Option<BoxId> {
        tree.get(id)?.first_child()
    }

    /// Last child of `id`, if it is a container with children.
    #[must_use]
    pub fn last_child_of(tree: &BoxTree, id: BoxId) -> Option<BoxId> {
        tree.get(id)?.last_child()
    }

    /// Next sibling of `id`.
    #[must_use]
    pub fn next_sibling_of(tree: &BoxTree, id: BoxId) -> Option<BoxId> {
        tree.get(id)?.next_sibling()
    }

    /// Previous sibling of `id`.
    #[must_use]
    pub fn previous_sibling_of(tree: &BoxTree, id: BoxId) -> Option<BoxId> {
        tree.get(id)?.previous_sibling()
    }

    /// Parent of `id`.
    #[must_use]
    pub fn parent_of(tree: &BoxTree, id: BoxId) -> Option<BoxId> {
        tree.get(id)?.parent()
    }

    /// The box after `id` in pre-order: its first child, else its next
    /// sibling, else the nearest ancestor's next sibling. `None` past the
    /// last box.
    #[must_use]
    pub fn next_of(tree: &BoxTree, id: BoxId) -> Option<BoxId> {
        Self::next_within(tree, id, None)
    }

    /// Like [`BoxTraversal::next_of`], but never leaves the subtree rooted
    /// at `scope`.
    fn next_within(tree: &BoxTree, id: BoxId, scope: Option<BoxId>) -> Option<BoxId> {
        if let Some(child) = Self::first_child_of(tree, id) {
            return Some(child);
        }
        let mut runner = id;
        loop {
            if Some(runner) == scope {
                return None;
            }
            if let Some(next) = Self::next_sibling_of(tree, runner) {
                return Some(next);
            }
            runner = Self::parent_of(tree, runner)?;
        }
    }
}

/// Proper ancestors, nearest first.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    tree: &'a BoxTree,
    next: Option<BoxId>,
}

impl<'a> Ancestors<'a> {
    /// Walk up from the parent of `id`.
    #[must_use]
    pub fn new(tree: &'a BoxTree, id: BoxId) -> Self {
        Self {
            tree,
            next: BoxTraversal::parent_of(tree, id),
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = BoxId;

    fn next(&mut self) -> Option<BoxId> {
        let current = self.next?;
        self.next = BoxTraversal::parent_of(self.tree, current);
        Some(current)
    }
}

/// `id` followed by its ancestors.
#[derive(Debug, Clone)]
pub struct AncestorsOrSelf<'a> {
    tree: &'a BoxTree,
    next: Option<BoxId>,
}

impl<'a> AncestorsOrSelf<'a> {
    /// Walk up from `id` itself.
    #[must_use]
    pub fn new(tree: &'a BoxTree, id: BoxId) -> Self {
        Self {
            tree,
            next: tree.contains(id).then_some(id),
        }
    }
}

impl Iterator for AncestorsOrSelf<'_> {
    type Item = BoxId;

    fn next(&mut self) -> Option<BoxId> {
        let current = self.next?;
        self.next = BoxTraversal::parent_of(self.tree, current);
        Some(current)
    }
}

/// Direct children, first to last.
#[derive(Debug, Clone)]
pub struct Children<'a> {
    tree: &'a BoxTree,
    next: Option<BoxId>,
}

impl<'a> Children<'a> {
    /// The children of `id`; empty for leaves.
    #[must_use]
    pub fn new(tree: &'a BoxTree, id: BoxId) -> Self {
        Self {
            tree,
            next: BoxTraversal::first_child_of(tree, id),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = BoxId;

    fn next(&mut self) -> Option<BoxId> {
        let current = self.next?;
        self.next = BoxTraversal::next_sibling_of(self.tree, current);
        Some(current)
    }
}

/// Every box under a scope, in pre-order, excluding the scope.
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    tree: &'a BoxTree,
    scope: BoxId,
    next: Option<BoxId>,
}

impl<'a> Descendants<'a> {
    /// The subtree strictly below `scope`.
    #[must_use]
    pub fn new(tree: &'a BoxTree, scope: BoxId) -> Self {
        Self {
            tree,
            scope,
            next: BoxTraversal::first_child_of(tree, scope),
        }
    }
}

impl Iterator for Descendants<'_> {
    type Item = BoxId;

    fn next(&mut self) -> Option<BoxId> {
        let current = self.next?;
        self.next = BoxTraversal::next_within(self.tree, current, Some(self.scope));
        Some(current)
    }
}

/// A scope followed by every box under it, in pre-order.
#[derive(Debug, Clone)]
pub struct DescendantsOrSelf<'a> {
    tree: &'a BoxTree,
    scope: BoxId,
    next: Option<BoxId>,
}

impl<'a> DescendantsOrSelf<'a> {
    /// The subtree rooted at `scope`.
    #[must_use]
    pub fn new(tree: &'a BoxTree, scope: BoxId) -> Self {
        Self {
            tree,
            scope,
            next: tree.contains(scope).then_some(scope),
        }
    }
}

impl Iterator for DescendantsOrSelf<'_> {
    type Item = BoxId;

    fn next(&mut self) -> Option<BoxId> {
        let current = self.next?;
        self.next = BoxTraversal::next_within(self.tree, current, Some(self.scope));
        Some(current)
    }
}

impl BoxTree {
    /// See [`Ancestors`].
    #[must_use]
    pub fn ancestors(&self, id: BoxId) -> Ancestors<'_> {
        Ancestors::new(self, id)
    }

    /// See [`AncestorsOrSelf`].
    #[must_use]
    pub fn ancestors_or_self(&self, id: BoxId) -> AncestorsOrSelf<'_> {
        AncestorsOrSelf::new(self, id)
    }

    /// See [`Children`].
    #[must_use]
    pub fn children(&self, id: BoxId) -> Children<'_> {
        Children::new(self, id)
    }

    /// See [`Descendants`].
    #[must_use]
    pub fn descendants(&self, scope: BoxId) -> Descendants<'_> {
        Descendants::new(self, scope)
    }

    /// See [`DescendantsOrSelf`].
    #[must_use]
    pub fn descendants_or_self(&self, scope: BoxId) -> DescendantsOrSelf<'_> {
        DescendantsOrSelf::new(self, scope)
    }

    /// The boxes of the subtree at `scope`, in pre-order.
    pub fn boxes_under(&self, scope: BoxId) -> impl Iterator<Item = &LayoutBox> {
        self.descendants_or_self(scope).map(|id| &self[id])
    }
}
