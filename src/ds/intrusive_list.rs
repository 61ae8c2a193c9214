//! Doubly linked recency list backed by a [`SlotArena`].
//!
//! Nodes are linked by [`SlotId`] instead of pointers, so the list needs no
//! `unsafe` and a node id stays valid for as long as the node is linked. The
//! cache keeps those ids in its key index, which makes promote and unlink
//! O(1).
//!
//! ```text
//!   arena (SlotArena<Node<T>>)
//!   ┌────────┬─────────────────────────────────────────────┐
//!   │ SlotId │ Node { value, prev, next }                  │
//!   ├────────┼─────────────────────────────────────────────┤
//!   │ id_1   │ { value: A, prev: None,   next: id_2 }      │
//!   │ id_2   │ { value: B, prev: id_1,   next: id_3 }      │
//!   │ id_3   │ { value: C, prev: id_2,   next: None }      │
//!   └────────┴─────────────────────────────────────────────┘
//!
//!   head (MRU) ─► [id_1] ◄──► [id_2] ◄──► [id_3] ◄── tail (LRU)
//! ```
//!
//! | Operation              | Cost |
//! |------------------------|------|
//! | `push_front`           | O(1) |
//! | `pop_back`             | O(1) |
//! | `move_to_front`        | O(1) |
//! | `remove(id)`           | O(1) |
//! | `next_id`              | O(1) |
//! | `iter`, `check_links`  | O(n) |

use std::collections::HashSet;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Recency-ordered list whose nodes live in a [`SlotArena`].
#[derive(Debug)]
pub struct IntrusiveList<T> {
    arena: SlotArena<Node<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> IntrusiveList<T> {
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    /// Creates an empty list with reserved node capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.arena.contains(id)
    }

    /// Id of the most recently used node.
    pub fn front_id(&self) -> Option<SlotId> {
        self.head
    }

    /// Id of the least recently used node.
    pub fn back_id(&self) -> Option<SlotId> {
        self.tail
    }

    /// Value at the back (LRU end).
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|id| self.get(id))
    }

    /// Neighbour of `id` towards the back (less recently used).
    pub fn next_id(&self, id: SlotId) -> Option<SlotId> {
        self.arena.get(id).and_then(|node| node.next)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.arena.get_mut(id).map(|node| &mut node.value)
    }

    /// Iterates values from front (MRU) to back (LRU).
    pub fn iter(&self) -> IntrusiveListIter<'_, T> {
        IntrusiveListIter {
            list: self,
            current: self.head,
        }
    }

    /// Links a new node at the front and returns its id.
    pub fn push_front(&mut self, value: T) -> SlotId {
        let id = self.arena.insert(Node {
            value,
            prev: None,
            next: self.head,
        });
        match self.head {
            Some(head) => {
                if let Some(node) = self.arena.get_mut(head) {
                    node.prev = Some(id);
                }
            },
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        id
    }

    /// Unlinks and returns the back (LRU) value.
    pub fn pop_back(&mut self) -> Option<T> {
        let id = self.tail?;
        self.remove(id)
    }

    /// Unlinks node `id` and returns its value.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.detach(id)?;
        self.arena.remove(id).map(|node| node.value)
    }

    /// Moves `id` to the front; returns `false` if `id` is not linked.
    pub fn move_to_front(&mut self, id: SlotId) -> bool {
        if !self.arena.contains(id) {
            return false;
        }
        if self.head == Some(id) {
            return true;
        }
        self.detach(id);
        self.attach_front(id);
        true
    }

    /// Unlinks every node. Arena capacity is retained.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
    }

    /// Node slots allocated, linked or free.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Releases free node slots beyond `min_capacity`. See
    /// [`SlotArena::shrink_to`].
    pub fn shrink_to(&mut self, min_capacity: usize) {
        self.arena.shrink_to(min_capacity);
    }

    /// Walks the list front to back and verifies that `prev`/`next` links
    /// agree, that there is no cycle, and that every arena node is linked.
    pub fn check_links(&self) -> Result<(), InvariantError> {
        if self.head.is_none() || self.tail.is_none() {
            if self.head.is_some() || self.tail.is_some() || !self.arena.is_empty() {
                return Err(InvariantError::new(format!(
                    "list: head {:?} / tail {:?} disagree with {} arena nodes",
                    self.head,
                    self.tail,
                    self.arena.len()
                )));
            }
            return Ok(());
        }

        let mut seen = HashSet::with_capacity(self.len());
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            if !seen.insert(id) {
                return Err(InvariantError::new(format!("list: cycle at {:?}", id)));
            }
            let node = self
                .arena
                .get(id)
                .ok_or_else(|| InvariantError::new(format!("list: stale SlotId {:?}", id)))?;
            if node.prev != prev {
                return Err(InvariantError::new(format!(
                    "list: {:?}.prev is {:?}, expected {:?}",
                    id, node.prev, prev
                )));
            }
            if node.next.is_none() && self.tail != Some(id) {
                return Err(InvariantError::new(format!(
                    "list: last node {:?} is not the tail {:?}",
                    id, self.tail
                )));
            }
            prev = Some(id);
            current = node.next;
        }

        if seen.len() != self.arena.len() {
            return Err(InvariantError::new(format!(
                "list: {} linked nodes but {} arena nodes",
                seen.len(),
                self.arena.len()
            )));
        }
        Ok(())
    }

    fn detach(&mut self, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let node = self.arena.get(id)?;
            (node.prev, node.next)
        };

        match prev {
            Some(prev_id) => {
                if let Some(prev_node) = self.arena.get_mut(prev_id) {
                    prev_node.next = next;
                }
            },
            None => self.head = next,
        }

        match next {
            Some(next_id) => {
                if let Some(next_node) = self.arena.get_mut(next_id) {
                    next_node.prev = prev;
                }
            },
            None => self.tail = prev,
        }

        if let Some(node) = self.arena.get_mut(id) {
            node.prev = None;
            node.next = None;
        }
        Some(())
    }

    fn attach_front(&mut self, id: SlotId) {
        let old_head = self.head;
        match self.arena.get_mut(id) {
            Some(node) => {
                node.prev = None;
                node.next = old_head;
            },
            None => return,
        }
        match old_head {
            Some(old_head) => {
                if let Some(head_node) = self.arena.get_mut(old_head) {
                    head_node.prev = Some(id);
                }
            },
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }
}

impl<T> Default for IntrusiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Front-to-back iterator over list values.
pub struct IntrusiveListIter<'a, T> {
    list: &'a IntrusiveList<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for IntrusiveListIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.list.arena.get(id)?;
        self.current = node.next;
        Some(&node.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<T: Copy>(list: &IntrusiveList<T>) -> Vec<T> {
        list.iter().copied().collect()
    }

    #[test]
    fn intrusive_list_push_front_orders_mru_first() {
        let mut list = IntrusiveList::new();
        list.push_front(1);
        list.push_front(2);
        list.push_front(3);
        assert_eq!(collect(&list), vec![3, 2, 1]);
        assert_eq!(list.back(), Some(&1));
        assert_eq!(list.len(), 3);
        list.check_links().unwrap();
    }

    #[test]
    fn intrusive_list_pop_back_is_lru() {
        let mut list = IntrusiveList::new();
        list.push_front("a");
        list.push_front("b");
        assert_eq!(list.pop_back(), Some("a"));
        assert_eq!(list.pop_back(), Some("b"));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
        list.check_links().unwrap();
    }

    #[test]
    fn intrusive_list_move_to_front_edges() {
        let mut list = IntrusiveList::new();
        let a = list.push_front(1);
        let b = list.push_front(2);
        let c = list.push_front(3);

        // Already at front.
        assert!(list.move_to_front(c));
        assert_eq!(collect(&list), vec![3, 2, 1]);

        // Tail to front.
        assert!(list.move_to_front(a));
        assert_eq!(collect(&list), vec![1, 3, 2]);
        assert_eq!(list.back_id(), Some(b));

        // Middle to front.
        assert!(list.move_to_front(c));
        assert_eq!(collect(&list), vec![3, 1, 2]);
        list.check_links().unwrap();

        list.remove(b);
        assert!(!list.move_to_front(b));
    }

    #[test]
    fn intrusive_list_remove_middle_and_ends() {
        let mut list = IntrusiveList::new();
        let a = list.push_front('a');
        let b = list.push_front('b');
        let c = list.push_front('c');

        assert_eq!(list.remove(b), Some('b'));
        assert_eq!(collect(&list), vec!['c', 'a']);
        assert_eq!(list.remove(c), Some('c'));
        assert_eq!(list.front_id(), Some(a));
        assert_eq!(list.remove(a), Some('a'));
        assert_eq!(list.front_id(), None);
        assert_eq!(list.back_id(), None);
        assert_eq!(list.remove(a), None);
        list.check_links().unwrap();
    }

    #[test]
    fn intrusive_list_neighbour_walk_front_to_back() {
        let mut list = IntrusiveList::new();
        list.push_front(10);
        list.push_front(20);
        list.push_front(30);

        let mut walked = Vec::new();
        let mut cursor = list.front_id();
        while let Some(id) = cursor {
            walked.push(*list.get(id).unwrap());
            cursor = list.next_id(id);
        }
        assert_eq!(walked, vec![30, 20, 10]);
        assert_eq!(list.back_id().and_then(|id| list.next_id(id)), None);
    }

    #[test]
    fn intrusive_list_shrink_after_clear_keeps_working() {
        let mut list = IntrusiveList::new();
        for i in 0..1_000u32 {
            list.push_front(i);
        }
        list.clear();
        list.shrink_to(8);
        assert!(list.capacity() < 1_000);

        let id = list.push_front(7);
        assert_eq!(list.get(id), Some(&7));
        list.check_links().unwrap();
    }

    #[test]
    fn intrusive_list_get_mut_and_clear() {
        let mut list = IntrusiveList::with_capacity(4);
        let id = list.push_front(5);
        *list.get_mut(id).unwrap() = 50;
        assert_eq!(list.get(id), Some(&50));

        list.clear();
        assert!(list.is_empty());
        assert!(!list.contains(id));
        assert_eq!(list.back(), None);
        list.check_links().unwrap();
    }

    #[test]
    fn intrusive_list_slot_reuse_keeps_links_sound() {
        let mut list = IntrusiveList::new();
        for round in 0..50u32 {
            let id = list.push_front(round);
            if round % 3 == 0 {
                list.remove(id);
            } else if round % 3 == 1 {
                list.pop_back();
            }
            list.check_links().unwrap();
        }
    }
}
