//! Slot storage and borrowed views over a slot's bytes.

use slotline_core::{FrameSeq, SlotIndex};

use crate::handle::SlotHandle;

/// One fixed-size byte buffer in the arena, plus its intrusive links.
///
/// Owned exclusively by [`SlotArena`](crate::SlotArena). Only the arena
/// flips `in_use`; only the deque rewrites `next`/`prev`.
#[derive(Debug)]
pub(crate) struct Slot {
    /// Slot storage, `slot_size` bytes, zeroed whenever the slot is free.
    pub(crate) data: Box<[u8]>,
    /// Number of bytes the producer filled, `0..=data.len()`.
    pub(crate) len: usize,
    /// Push sequence number of the frame occupying this slot.
    pub(crate) seq: FrameSeq,
    /// Bumped on every acquisition.
    pub(crate) generation: u32,
    pub(crate) in_use: bool,
    /// Neighbour towards the front end.
    pub(crate) next: Option<SlotIndex>,
    /// Neighbour towards the back end.
    pub(crate) prev: Option<SlotIndex>,
}

impl Slot {
    pub(crate) fn new(slot_size: usize) -> Self {
        Self {
            data: vec![0u8; slot_size].into_boxed_slice(),
            len: 0,
            seq: FrameSeq::default(),
            generation: 0,
            in_use: false,
            next: None,
            prev: None,
        }
    }

    /// Reset contents and links to the free state. Does not touch
    /// `in_use` or `generation`.
    pub(crate) fn scrub(&mut self) {
        self.data.fill(0);
        self.len = 0;
        self.seq = FrameSeq::default();
        self.next = None;
        self.prev = None;
    }
}

/// Read-only view of an occupied slot.
///
/// Borrowed from the deque; the borrow checker keeps it from outliving
/// the next mutation of the deque.
#[derive(Clone, Copy, Debug)]
pub struct SlotRef<'a> {
    index: SlotIndex,
    slot: &'a Slot,
}

impl<'a> SlotRef<'a> {
    pub(crate) fn new(index: SlotIndex, slot: &'a Slot) -> Self {
        Self { index, slot }
    }

    /// The bytes the producer filled (`raw()[..len()]`).
    pub fn bytes(&self) -> &'a [u8] {
        &self.slot.data[..self.slot.len]
    }

    /// The full slot region, including any unfilled (zeroed) tail.
    pub fn raw(&self) -> &'a [u8] {
        &self.slot.data
    }

    /// Number of filled bytes.
    pub fn len(&self) -> usize {
        self.slot.len
    }

    /// Whether the producer filled nothing.
    pub fn is_empty(&self) -> bool {
        self.slot.len == 0
    }

    /// Push sequence number of this frame.
    pub fn seq(&self) -> FrameSeq {
        self.slot.seq
    }

    /// Handle for the acquisition backing this view.
    pub fn handle(&self) -> SlotHandle {
        SlotHandle::new(self.index, self.slot.generation)
    }
}

/// Writable view of a freshly pushed slot.
///
/// Returned by [`SlotDeque::push_front`](crate::SlotDeque::push_front)
/// and [`SlotDeque::push_back`](crate::SlotDeque::push_back). The slot
/// starts zeroed with a filled length of 0; record how many bytes were
/// written with [`set_len`](SlotMut::set_len), or use
/// [`fill_from`](SlotMut::fill_from) which does both.
#[derive(Debug)]
pub struct SlotMut<'a> {
    index: SlotIndex,
    slot: &'a mut Slot,
}

impl<'a> SlotMut<'a> {
    pub(crate) fn new(index: SlotIndex, slot: &'a mut Slot) -> Self {
        Self { index, slot }
    }

    /// The full writable slot region.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.slot.data
    }

    /// The bytes filled so far.
    pub fn bytes(&self) -> &[u8] {
        &self.slot.data[..self.slot.len]
    }

    /// Record how many leading bytes of the slot hold frame data.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the slot size.
    pub fn set_len(&mut self, len: usize) {
        assert!(
            len <= self.slot.data.len(),
            "slot length {len} exceeds slot size {}",
            self.slot.data.len()
        );
        self.slot.len = len;
    }

    /// Copy `src` into the slot and record its length.
    ///
    /// Input longer than the slot is truncated; returns the number of
    /// bytes actually stored.
    pub fn fill_from(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.slot.data.len());
        self.slot.data[..n].copy_from_slice(&src[..n]);
        self.slot.len = n;
        n
    }

    /// Slot size in bytes.
    pub fn capacity(&self) -> usize {
        self.slot.data.len()
    }

    /// Push sequence number assigned to this frame.
    pub fn seq(&self) -> FrameSeq {
        self.slot.seq
    }

    /// Handle for the acquisition backing this view.
    pub fn handle(&self) -> SlotHandle {
        SlotHandle::new(self.index, self.slot.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_slot_is_zeroed_and_unlinked() {
        let slot = Slot::new(8);
        assert_eq!(&*slot.data, &[0u8; 8]);
        assert_eq!(slot.len, 0);
        assert!(!slot.in_use);
        assert!(slot.next.is_none() && slot.prev.is_none());
    }

    #[test]
    fn fill_from_truncates_to_slot_size() {
        let mut slot = Slot::new(4);
        let mut view = SlotMut::new(SlotIndex(0), &mut slot);
        assert_eq!(view.fill_from(b"abcdef"), 4);
        assert_eq!(view.bytes(), b"abcd");
        assert_eq!(view.capacity(), 4);
    }

    #[test]
    fn set_len_exposes_written_prefix() {
        let mut slot = Slot::new(6);
        {
            let mut view = SlotMut::new(SlotIndex(1), &mut slot);
            view.as_mut_slice()[..3].copy_from_slice(b"xyz");
            view.set_len(3);
        }
        let view = SlotRef::new(SlotIndex(1), &slot);
        assert_eq!(view.bytes(), b"xyz");
        assert_eq!(view.raw(), b"xyz\0\0\0");
        assert_eq!(view.len(), 3);
        assert!(!view.is_empty());
    }

    #[test]
    #[should_panic(expected = "exceeds slot size")]
    fn set_len_past_capacity_panics() {
        let mut slot = Slot::new(2);
        SlotMut::new(SlotIndex(0), &mut slot).set_len(3);
    }

    #[test]
    fn scrub_clears_contents_and_links() {
        let mut slot = Slot::new(3);
        slot.data.copy_from_slice(b"abc");
        slot.len = 3;
        slot.seq = FrameSeq(5);
        slot.next = Some(SlotIndex(1));
        slot.prev = Some(SlotIndex(2));
        slot.scrub();
        assert_eq!(&*slot.data, &[0u8; 3]);
        assert_eq!(slot.len, 0);
        assert_eq!(slot.seq, FrameSeq(0));
        assert!(slot.next.is_none() && slot.prev.is_none());
    }
}
