//! Benchmark profiles and utilities for the slotline frame buffer.
//!
//! Provides pre-built [`ReceiverConfig`] profiles for benchmarking:
//!
//! - [`uart_profile`]: 3 slots of 1 KiB, the classic UART receive pool
//! - [`burst_profile`]: 64 slots of 256 bytes for bursty short frames
//! - [`payload`]: deterministic frame contents via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::time::Duration;

use slotline_arena::PoolConfig;
use slotline_engine::{OverflowPolicy, Readiness, ReceiverConfig};

/// Build the UART receive profile: 3 × 1024-byte slots, evict-oldest,
/// one reserved slot for readiness.
pub fn uart_profile() -> ReceiverConfig {
    ReceiverConfig {
        pool: PoolConfig::default(),
        readiness: Readiness::LEGACY,
        read_timeout: Duration::from_millis(10),
        ..ReceiverConfig::default()
    }
}

/// Build a burst profile: 64 × 256-byte slots, drop-newest.
///
/// Deep enough that a consumer polling every few milliseconds keeps up
/// with short frames at line rate.
pub fn burst_profile() -> ReceiverConfig {
    ReceiverConfig {
        pool: PoolConfig::new(256, 64),
        overflow: OverflowPolicy::DropNewest,
        read_timeout: Duration::from_millis(10),
        ..ReceiverConfig::default()
    }
}

/// Generate a deterministic `len`-byte payload.
///
/// Bytes come from a simple LCG over `seed`, so two calls with the same
/// arguments return the same frame.
pub fn payload(seed: u64, len: usize) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 56) as u8
        })
        .collect()
}
