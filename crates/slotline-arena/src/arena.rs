//! Fixed pool of fixed-size byte slots with used/free tracking.
//!
//! [`SlotArena`] pre-allocates every slot once at construction and never
//! grows. Acquisition is a first-fit scan by ascending index; release
//! zeroes the slot so the next acquirer never sees a previous frame.

use slotline_core::{ConfigError, SlotIndex};

use crate::config::PoolConfig;
use crate::handle::SlotHandle;
use crate::slot::Slot;

/// Arena of `capacity` slots of `slot_size` bytes each.
///
/// The arena only tracks which slots are in use. Ordering between
/// occupied slots is the job of [`SlotDeque`](crate::SlotDeque), which
/// owns the arena and is the only caller of `acquire`/`release` in
/// normal operation.
#[derive(Debug)]
pub struct SlotArena {
    slots: Vec<Slot>,
    slot_size: usize,
    in_use: usize,
}

impl SlotArena {
    /// Allocate a zeroed arena for the given config.
    pub fn new(config: &PoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let slots = (0..config.capacity)
            .map(|_| Slot::new(config.slot_size))
            .collect();
        Ok(Self {
            slots,
            slot_size: config.slot_size,
            in_use: 0,
        })
    }

    /// Mark the lowest-indexed free slot in use and return its handle.
    ///
    /// Returns `None` when every slot is in use; that is not an error,
    /// the caller applies its own full-pool policy. O(capacity).
    pub fn acquire(&mut self) -> Option<SlotHandle> {
        let (i, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| !slot.in_use)?;
        slot.in_use = true;
        slot.generation = slot.generation.wrapping_add(1);
        self.in_use += 1;
        // Capacity is validated to fit u32.
        Some(SlotHandle::new(SlotIndex(i as u32), slot.generation))
    }

    /// Zero the slot's bytes and mark it free.
    ///
    /// Returns `true` if the slot was released. Releasing a handle that
    /// is not live (already released, or issued for an earlier
    /// acquisition) panics in debug builds and returns `false` in
    /// release builds, leaving the arena untouched.
    pub fn release(&mut self, handle: SlotHandle) -> bool {
        let live = self.is_live(handle);
        debug_assert!(live, "double release of {handle}");
        if !live {
            return false;
        }
        let slot = &mut self.slots[handle.index.as_usize()];
        slot.scrub();
        slot.in_use = false;
        self.in_use -= 1;
        true
    }

    /// Whether `handle` names the current acquisition of an in-use slot.
    pub fn is_live(&self, handle: SlotHandle) -> bool {
        self.slots
            .get(handle.index.as_usize())
            .is_some_and(|slot| slot.in_use && slot.generation == handle.generation)
    }

    /// Whether the slot at `index` is currently in use.
    ///
    /// Out-of-range indices report `false`.
    pub fn is_in_use(&self, index: SlotIndex) -> bool {
        self.slots
            .get(index.as_usize())
            .is_some_and(|slot| slot.in_use)
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Size of each slot in bytes.
    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    /// Number of slots currently in use.
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Number of free slots.
    pub fn free(&self) -> usize {
        self.slots.len() - self.in_use
    }

    /// Bytes of slot storage held by the arena.
    pub fn memory_bytes(&self) -> usize {
        self.slots.len() * self.slot_size
    }

    pub(crate) fn slot(&self, index: SlotIndex) -> &Slot {
        &self.slots[index.as_usize()]
    }

    pub(crate) fn slot_mut(&mut self, index: SlotIndex) -> &mut Slot {
        &mut self.slots[index.as_usize()]
    }

    pub(crate) fn slots(&self) -> impl Iterator<Item = (SlotIndex, &Slot)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (SlotIndex(i as u32), slot))
    }
}
