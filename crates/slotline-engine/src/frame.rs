//! Owned copies of buffered frames.

use slotline_arena::SlotRef;
use slotline_core::FrameSeq;

/// A frame copied out of the queue.
///
/// Owning the bytes lets the slot be released before the consumer
/// looks at them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Frame {
    /// Push sequence number; strictly increasing in arrival order.
    pub seq: FrameSeq,
    /// The bytes the producer stored.
    pub bytes: Vec<u8>,
}

impl Frame {
    /// Copy the filled bytes of a slot.
    pub fn from_slot(slot: SlotRef<'_>) -> Self {
        Self {
            seq: slot.seq(),
            bytes: slot.bytes().to_vec(),
        }
    }

    /// The frame's bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the frame has no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
