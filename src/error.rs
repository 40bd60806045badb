use thiserror::Error;

/// Construction-time failures. Nothing after construction is an error.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    /// Capacity is not a power of two, or is smaller than 2.
    #[error("invalid ring capacity {capacity}: must be a power of two and at least 2")]
    InvalidCapacity {
        /// Requested slot count.
        capacity: usize,
    },

    /// Slot storage could not be allocated.
    #[error("out of memory allocating {capacity} ring slots")]
    OutOfMemory {
        /// Requested slot count.
        capacity: usize,
    },
}

/// Convenience type alias for ring construction.
pub type RingResult<T> = Result<T, RingError>;
