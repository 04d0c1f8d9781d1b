//! Strongly-typed identifiers for arena slots and buffered frames.

use std::fmt;

/// Position of a slot within the fixed slot arena.
///
/// Slot indices are stable for the lifetime of the arena: index `n`
/// always refers to the n-th pre-allocated slot, whether it is currently
/// in use or free. Links between occupied slots are expressed as indices
/// rather than references.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(pub u32);

impl SlotIndex {
    /// The index as a `usize`, for indexing into slot storage.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SlotIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonic sequence number assigned to each frame at push time.
///
/// Sequence numbers are issued by the deque in push order, starting at
/// zero, and are never reused. Consumers use them to detect gaps left
/// by overwrite-oldest eviction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FrameSeq(pub u64);

impl FrameSeq {
    /// The sequence number that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for FrameSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FrameSeq {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
