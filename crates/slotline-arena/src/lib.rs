//! Fixed slot arena and bounded double-ended deque.
//!
//! Provides the bounded buffer pool at the heart of slotline: a fixed
//! number of fixed-size byte slots, allocated once, with a doubly linked
//! occupancy order threaded through them by index.
//!
//! # Architecture
//!
//! ```text
//! SlotDeque (orchestrator)
//! ├── front / back: Option<SlotIndex>, size
//! └── SlotArena (owns all storage, never resized)
//!     └── Slot × capacity
//!         ├── data: Box<[u8]> (slot_size bytes, zeroed on release)
//!         ├── len, seq, generation, in_use
//!         └── next / prev: Option<SlotIndex>
//! ```
//!
//! # Link orientation
//!
//! Walking from `front` along `prev` links reaches `back`; walking from
//! `back` along `next` links reaches `front`. Pushing at the back links
//! the new slot behind the current back, so with back-insertion the
//! oldest frame sits at the front.
//!
//! The deque is not synchronized. Shared access goes through
//! `slotline-engine`'s `FrameQueue`, which holds it behind one mutex.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod config;
pub mod deque;
pub mod handle;
pub mod slot;

// Public re-exports for the primary API surface.
pub use arena::SlotArena;
pub use config::PoolConfig;
pub use deque::{Iter, SlotDeque};
pub use handle::SlotHandle;
pub use slot::{SlotMut, SlotRef};
