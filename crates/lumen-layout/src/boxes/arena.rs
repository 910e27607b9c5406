//! Generational slot storage for boxes.

use std::fmt;

use serde::Serialize;

use super::LayoutBox;

/// Handle to a box in a [`BoxTree`](super::BoxTree).
///
/// A slot freed by `destroy_box` and later reused gets a new generation, so
/// a handle kept past destruction never resolves to an unrelated box.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BoxId {
    index: u32,
    generation: u32,
}

impl BoxId {
    const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the arena.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoxId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Default)]
pub(super) struct BoxArena {
    slots: Vec<Option<LayoutBox>>,
    // last generation per slot, kept across frees
    generations: Vec<u32>,
    free_list: Vec<u32>,
    len: usize,
}

impl BoxArena {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn insert_with(&mut self, make: impl FnOnce(BoxId) -> LayoutBox) -> BoxId {
        let id = if let Some(index) = self.free_list.pop() {
            let slot = index as usize;
            let generation = self.generations[slot].saturating_add(1);
            self.generations[slot] = generation;
            BoxId::new(index, generation)
        } else {
            #[allow(clippy::cast_possible_truncation)]
            let index = self.slots.len() as u32;
            self.slots.push(None);
            self.generations.push(1);
            BoxId::new(index, 1)
        };
        self.slots[id.index as usize] = Some(make(id));
        self.len += 1;
        id
    }

    pub(super) fn contains(&self, id: BoxId) -> bool {
        self.get(id).is_some()
    }

    pub(super) fn get(&self, id: BoxId) -> Option<&LayoutBox> {
        let slot = id.index as usize;
        if self.generations.get(slot) != Some(&id.generation) {
            return None;
        }
        self.slots.get(slot)?.as_ref()
    }

    pub(super) fn get_mut(&mut self, id: BoxId) -> Option<&mut LayoutBox> {
        let slot = id.index as usize;
        if self.generations.get(slot) != Some(&id.generation) {
            return None;
        }
        self.slots.get_mut(slot)?.as_mut()
    }

    pub(super) fn remove(&mut self, id: BoxId) -> Option<LayoutBox> {
        let slot = id.index as usize;
        if self.generations.get(slot) != Some(&id.generation) {
            return None;
        }
        let removed = self.slots.get_mut(slot)?.take()?;
        self.free_list.push(id.index);
        self.len -= 1;
        Some(removed)
    }

    pub(super) const fn len(&self) -> usize {
        self.len
    }

    pub(super) fn iter(&self) -> impl Iterator<Item = &LayoutBox> {
        self.slots.iter().filter_map(Option::as_ref)
    }
}
