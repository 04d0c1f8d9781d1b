//! Pool configuration parameters.

use slotline_core::ConfigError;

/// Configuration for the slot arena and the deque built on it.
///
/// Controls slot size and slot count. Validated at construction; all
/// values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Size of each slot in bytes.
    ///
    /// Default: 1024. A single transport read fills at most one slot.
    pub slot_size: usize,

    /// Number of slots in the pool.
    ///
    /// Default: 3. This is also the maximum number of buffered frames;
    /// once reached, the producer evicts or drops according to its
    /// overflow policy.
    pub capacity: usize,
}

impl PoolConfig {
    /// Default slot size in bytes.
    pub const DEFAULT_SLOT_SIZE: usize = 1024;

    /// Default slot count.
    pub const DEFAULT_CAPACITY: usize = 3;

    /// Create a config with the given slot size and slot count.
    pub fn new(slot_size: usize, capacity: usize) -> Self {
        Self {
            slot_size,
            capacity,
        }
    }

    /// Check that the pool can be built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_size == 0 {
            return Err(ConfigError::ZeroSlotSize);
        }
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if u32::try_from(self.capacity).is_err() {
            return Err(ConfigError::CapacityOverflow {
                value: self.capacity,
            });
        }
        Ok(())
    }

    /// Total bytes of slot storage the pool will pre-allocate.
    pub fn total_bytes(&self) -> usize {
        self.slot_size.saturating_mul(self.capacity)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SLOT_SIZE, Self::DEFAULT_CAPACITY)
    }
}
