//! Ring sizing.
//!
//! The default is one memory page worth of [`Timestamp`] slots, so a bulk reader
//! amortizes its per-call overhead over a full page of entries.

use crate::error::{RingError, RingResult};
use crate::timestamp::Timestamp;

/// Page size the default capacity is derived from.
pub const PAGE_SIZE: usize = 4096;

/// Default slot count: one page of timestamps.
pub const DEFAULT_CAPACITY: usize = PAGE_SIZE / core::mem::size_of::<Timestamp>();

const _: () = assert!(DEFAULT_CAPACITY.is_power_of_two() && DEFAULT_CAPACITY >= 2);

/// Construction parameters for a [`PulseRing`](crate::PulseRing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RingConfig {
    /// Slot count. Must be a power of two and at least 2; one slot always stays empty.
    pub capacity: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl RingConfig {
    pub const fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn validate(&self) -> RingResult<()> {
        validate_capacity(self.capacity)
    }
}

pub(crate) fn validate_capacity(capacity: usize) -> RingResult<()> {
    if capacity < 2 || !capacity.is_power_of_two() {
        return Err(RingError::InvalidCapacity { capacity });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_page_of_timestamps() {
        assert_eq!(DEFAULT_CAPACITY, 256);
        assert_eq!(RingConfig::default().capacity, DEFAULT_CAPACITY);
        assert!(RingConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_capacities() {
        for capacity in [0, 1, 3, 6, 100] {
            assert_eq!(
                RingConfig::with_capacity(capacity).validate(),
                Err(RingError::InvalidCapacity { capacity })
            );
        }
        assert!(RingConfig::with_capacity(2).validate().is_ok());
        assert!(RingConfig::with_capacity(1 << 20).validate().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn loads_from_toml() {
        let cfg: RingConfig = toml::from_str("capacity = 64").unwrap();
        assert_eq!(cfg.capacity, 64);

        let cfg: RingConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, RingConfig::default());
    }
}
