//! Interrupt-time pulse capture for no-std targets.
//!
//! # Highlights
//! - Lock-free SPSC ring of arrival timestamps, synchronized with acquire/release only.
//! - Producer side never blocks, allocates, or logs: safe to call from an ISR.
//! - Consumer side drains in bulk, oldest first, e.g. for an entropy harvester.
//! - Overflow drops the newest pulse and counts it; unread data is never overwritten.
//!
//! # Quick start
//! ```
//! use pulse_ring::{PulseHandler, PulseRing, Timestamp};
//!
//! let ring = PulseRing::new(8).unwrap();
//! let mut handler = PulseHandler::new(ring.producer(), || Timestamp::new(1, 250));
//! let mut consumer = ring.consumer();
//!
//! handler.on_pulse();
//! assert_eq!(consumer.available(), 1);
//! assert_eq!(consumer.drain(16), [Timestamp::new(1, 250)]);
//! ```
//!
//! # No-std
//! The crate is `#![no_std]` and needs `alloc` only to allocate slot storage once at
//! construction. The `std` feature adds `SystemClock`. Tests require `std`.
//!
//! # Safety and concurrency
//! Exactly one producer and one consumer may be active. `producer()`/`consumer()` panic if
//! a handle of the same kind is already alive; `try_producer()`/`try_consumer()` return
//! `None` instead. Mutating calls take `&mut self`, so each role is serialized. Callers that
//! need several consumers must serialize them externally before reaching the ring.
//!
//! # Semantics
//! - Capacity is a power of two; `capacity - 1` slots are usable.
//! - `push` on a full ring is a counted drop, not an error. `drain` on an empty ring returns
//!   nothing, not an error.
//! - Only construction fails: [`RingError::InvalidCapacity`] or [`RingError::OutOfMemory`].
#![no_std]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod config;
pub mod error;
pub mod pulse_ring;
pub mod source;
pub mod timestamp;

pub use config::{DEFAULT_CAPACITY, PAGE_SIZE, RingConfig};
pub use error::{RingError, RingResult};
pub use pulse_ring::{Consumer, Producer, PulseRing};
#[cfg(feature = "std")]
pub use source::SystemClock;
pub use source::{Clock, PulseHandler};
pub use timestamp::Timestamp;
