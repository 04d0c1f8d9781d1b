//! Bounded double-ended deque over the occupied slots of a [`SlotArena`].
//!
//! [`SlotDeque`] threads a doubly linked list through the arena by slot
//! index. Pushing acquires a free slot and links it at one end; popping
//! unlinks the end slot and releases it (zeroed) back to the arena. All
//! operations are O(1) except acquisition, which is the arena's
//! first-fit scan.
//!
//! The deque never allocates after construction and never dereferences
//! an empty end: peeks return `None` and pops are no-ops when empty.

use std::iter::FusedIterator;

use slotline_core::{ConfigError, FrameSeq, SlotIndex};

use crate::arena::SlotArena;
use crate::config::PoolConfig;
use crate::handle::SlotHandle;
use crate::slot::{SlotMut, SlotRef};

/// Fixed-capacity double-ended queue of byte slots.
///
/// `front` and `back` index into the in-use subset of the arena. From
/// `front`, `prev` links lead to `back` in exactly `size` steps; from
/// `back`, `next` links lead to `front`.
#[derive(Debug)]
pub struct SlotDeque {
    arena: SlotArena,
    front: Option<SlotIndex>,
    back: Option<SlotIndex>,
    size: usize,
    next_seq: FrameSeq,
}

impl SlotDeque {
    /// Build an empty deque with a freshly allocated arena.
    pub fn new(config: &PoolConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            arena: SlotArena::new(config)?,
            front: None,
            back: None,
            size: 0,
            next_seq: FrameSeq::default(),
        })
    }

    /// Acquire a slot and link it at the front.
    ///
    /// Returns `None` without side effects if the deque is full.
    pub fn push_front(&mut self) -> Option<SlotMut<'_>> {
        let index = self.acquire_for_push()?;
        match self.front {
            None => self.back = Some(index),
            Some(old) => {
                self.arena.slot_mut(index).prev = Some(old);
                self.arena.slot_mut(old).next = Some(index);
            }
        }
        self.front = Some(index);
        self.size += 1;
        Some(SlotMut::new(index, self.arena.slot_mut(index)))
    }

    /// Acquire a slot and link it at the back.
    ///
    /// Returns `None` without side effects if the deque is full.
    pub fn push_back(&mut self) -> Option<SlotMut<'_>> {
        let index = self.acquire_for_push()?;
        match self.back {
            None => self.front = Some(index),
            Some(old) => {
                self.arena.slot_mut(index).next = Some(old);
                self.arena.slot_mut(old).prev = Some(index);
            }
        }
        self.back = Some(index);
        self.size += 1;
        Some(SlotMut::new(index, self.arena.slot_mut(index)))
    }

    /// Peek at the front slot.
    pub fn front(&self) -> Option<SlotRef<'_>> {
        self.front.map(|i| SlotRef::new(i, self.arena.slot(i)))
    }

    /// Peek at the back slot.
    pub fn back(&self) -> Option<SlotRef<'_>> {
        self.back.map(|i| SlotRef::new(i, self.arena.slot(i)))
    }

    /// Remove the front slot, zeroing and releasing it.
    ///
    /// Returns `false` (and does nothing) on an empty deque.
    pub fn pop_front(&mut self) -> bool {
        let Some(old) = self.front else {
            return false;
        };
        let new_front = self.arena.slot(old).prev;
        match new_front {
            Some(i) => self.arena.slot_mut(i).next = None,
            None => self.back = None,
        }
        self.front = new_front;
        self.release(old);
        true
    }

    /// Remove the back slot, zeroing and releasing it.
    ///
    /// Returns `false` (and does nothing) on an empty deque.
    pub fn pop_back(&mut self) -> bool {
        let Some(old) = self.back else {
            return false;
        };
        let new_back = self.arena.slot(old).next;
        match new_back {
            Some(i) => self.arena.slot_mut(i).prev = None,
            None => self.front = None,
        }
        self.back = new_back;
        self.release(old);
        true
    }

    /// Pop every slot, leaving the deque empty.
    pub fn clear(&mut self) {
        while self.pop_front() {}
    }

    /// Iterate occupied slots from front to back.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            arena: &self.arena,
            head: self.front,
            tail: self.back,
            remaining: self.size,
        }
    }

    /// Number of occupied slots.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Alias for [`size`](Self::size).
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Whether every slot is occupied; the next push will return `None`.
    pub fn is_full(&self) -> bool {
        self.size == self.arena.capacity()
    }

    /// Maximum number of occupied slots.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Size of each slot in bytes.
    pub fn item_size(&self) -> usize {
        self.arena.slot_size()
    }

    /// The sequence number the next push will assign.
    pub fn next_seq(&self) -> FrameSeq {
        self.next_seq
    }

    /// The underlying arena.
    pub fn arena(&self) -> &SlotArena {
        &self.arena
    }

    /// Walk both link chains and cross-check them against the arena.
    ///
    /// Returns a description of the first violated invariant.
    pub fn check_invariants(&self) -> Result<(), String> {
        let capacity = self.arena.capacity();
        if self.size > capacity {
            return Err(format!("size {} exceeds capacity {capacity}", self.size));
        }
        if self.size != self.arena.in_use() {
            return Err(format!(
                "size {} disagrees with {} in-use slots",
                self.size,
                self.arena.in_use()
            ));
        }
        if (self.size == 0) != self.front.is_none() || (self.size == 0) != self.back.is_none() {
            return Err(format!(
                "size {} inconsistent with front {:?} / back {:?}",
                self.size, self.front, self.back
            ));
        }
        if let Some(f) = self.front {
            if self.arena.slot(f).next.is_some() {
                return Err(format!("front slot {f} has a next link"));
            }
        }
        if let Some(b) = self.back {
            if self.arena.slot(b).prev.is_some() {
                return Err(format!("back slot {b} has a prev link"));
            }
        }

        let mut seen = vec![false; capacity];
        let mut cursor = self.front;
        let mut last = None;
        let mut steps = 0;
        while let Some(i) = cursor {
            if steps == self.size {
                return Err(format!("prev chain from front longer than {}", self.size));
            }
            let slot = self.arena.slot(i);
            if !slot.in_use {
                return Err(format!("slot {i} is linked but free"));
            }
            if std::mem::replace(&mut seen[i.as_usize()], true) {
                return Err(format!("slot {i} reached twice"));
            }
            if let Some(p) = slot.prev {
                if self.arena.slot(p).next != Some(i) {
                    return Err(format!("slot {p} does not link back to {i}"));
                }
            }
            last = Some(i);
            cursor = slot.prev;
            steps += 1;
        }
        if steps != self.size {
            return Err(format!("prev chain has {steps} slots, size is {}", self.size));
        }
        if last != self.back {
            return Err(format!("prev chain ends at {last:?}, back is {:?}", self.back));
        }

        let mut cursor = self.back;
        let mut last = None;
        let mut steps = 0;
        while let Some(i) = cursor {
            if steps == self.size {
                return Err(format!("next chain from back longer than {}", self.size));
            }
            last = Some(i);
            cursor = self.arena.slot(i).next;
            steps += 1;
        }
        if steps != self.size || last != self.front {
            return Err(format!(
                "next chain has {steps} slots ending at {last:?}, expected {} ending at {:?}",
                self.size, self.front
            ));
        }

        for (i, slot) in self.arena.slots() {
            if slot.in_use != seen[i.as_usize()] {
                return Err(format!(
                    "slot {i} in_use={} but reachable={}",
                    slot.in_use,
                    seen[i.as_usize()]
                ));
            }
        }
        Ok(())
    }

    fn acquire_for_push(&mut self) -> Option<SlotIndex> {
        if self.is_full() {
            return None;
        }
        let handle = self.arena.acquire()?;
        let slot = self.arena.slot_mut(handle.index());
        slot.seq = self.next_seq;
        slot.next = None;
        slot.prev = None;
        self.next_seq = self.next_seq.next();
        Some(handle.index())
    }

    fn release(&mut self, index: SlotIndex) {
        let handle = SlotHandle::new(index, self.arena.slot(index).generation);
        let released = self.arena.release(handle);
        debug_assert!(released, "deque released a slot it did not own");
        self.size -= 1;
    }
}

/// Front-to-back iterator over a [`SlotDeque`]'s occupied slots.
///
/// Double-ended: `next_back` walks from the back towards the front.
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    arena: &'a SlotArena,
    head: Option<SlotIndex>,
    tail: Option<SlotIndex>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = SlotRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let i = self.head?;
        let slot = self.arena.slot(i);
        self.head = slot.prev;
        self.remaining -= 1;
        Some(SlotRef::new(i, slot))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let i = self.tail?;
        let slot = self.arena.slot(i);
        self.tail = slot.next;
        self.remaining -= 1;
        Some(SlotRef::new(i, slot))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a SlotDeque {
    type Item = SlotRef<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
