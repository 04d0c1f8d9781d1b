//! Slot handles.
//!
//! A [`SlotHandle`] names one acquisition of one arena slot. It is
//! generation-scoped: the `generation` field allows O(1) detection of a
//! handle that outlived its acquisition (double release, stale peek)
//! without any side table.

use std::fmt;

use slotline_core::SlotIndex;

/// One acquisition of an arena slot.
///
/// Issued by [`SlotArena::acquire`](crate::SlotArena::acquire). The
/// arena bumps a slot's generation every time it is acquired, so a
/// handle whose generation no longer matches refers to a previous
/// occupant and is rejected by [`release`](crate::SlotArena::release).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct SlotHandle {
    pub(crate) index: SlotIndex,
    pub(crate) generation: u32,
}

impl SlotHandle {
    pub(crate) fn new(index: SlotIndex, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena position of the slot.
    pub fn index(&self) -> SlotIndex {
        self.index
    }

    /// Acquisition generation this handle was issued for.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for SlotHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotHandle(idx={}, gen={})", self.index, self.generation)
    }
}
