//! Slot storage with stable, reusable ids.
//!
//! Values live in a `Vec<Option<T>>`. Freed slots are pushed on a free list
//! and handed out again by the next insert, so a long-running cache under
//! eviction churn stops allocating once it reaches its working size.
//!
//! ```text
//!   slots:     [ Some(a) | None | Some(c) | None ]
//!   free_list: [ 3, 1 ]            ◄── next insert reuses slot 1
//! ```
//!
//! A [`SlotId`] is only meaningful for the arena that issued it, and only
//! until that slot is removed. Callers that keep ids in an external index
//! (the cache's key map) are responsible for dropping them on removal.

/// Index of an occupied slot in a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    /// Raw slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Creates an arena with room for `capacity` values before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value`, reusing a freed slot when one is available.
    pub fn insert(&mut self, value: T) -> SlotId {
        let idx = match self.free_list.pop() {
            Some(idx) => {
                debug_assert!(self.slots[idx].is_none(), "free slot {idx} is occupied");
                self.slots[idx] = Some(value);
                idx
            },
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            },
        };
        self.len += 1;
        SlotId(idx)
    }

    /// Takes the value out of `id`, freeing the slot. Returns `None` for a
    /// vacant or out-of-range id.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let value = self.slots.get_mut(id.0)?.take()?;
        self.free_list.push(id.0);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: SlotId) -> bool {
        matches!(self.slots.get(id.0), Some(Some(_)))
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every value. The backing allocation is kept for reuse.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.len = 0;
    }

    /// Slots allocated, occupied or free.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Releases memory held by vacant trailing slots, keeping room for at
    /// least `min_capacity` values.
    ///
    /// Vacant slots below the highest occupied one stay on the free list, so
    /// ids that are still live keep their index. The cache calls this after
    /// `clear` to return a burst-sized arena to its preallocated size.
    pub fn shrink_to(&mut self, min_capacity: usize) {
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
        let end = self.slots.len();
        self.free_list.retain(|&idx| idx < end);
        self.slots.shrink_to(min_capacity);
        self.free_list.shrink_to_fit();
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
