//! Producer-side glue for an edge-triggered pulse source.
//!
//! The host registers an interrupt (or any serialized callback) for the detector's
//! rising edge and calls [`PulseHandler::on_pulse`] from it. Pin and IRQ
//! registration are the host's business.

use crate::pulse_ring::Producer;
use crate::timestamp::Timestamp;

/// Source of arrival timestamps. Must be callable from interrupt context.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

impl<F: Fn() -> Timestamp> Clock for F {
    #[inline]
    fn now(&self) -> Timestamp {
        self()
    }
}

/// Wall-clock time since the UNIX epoch.
#[cfg(feature = "std")]
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(Timestamp::from)
            .unwrap_or(Timestamp::ZERO)
    }
}

/// Interrupt-time pulse recorder: stamps each pulse and pushes it into the ring.
pub struct PulseHandler<'a, C: Clock> {
    producer: Producer<'a, Timestamp>,
    clock: C,
    pulses: usize,
}

impl<'a, C: Clock> PulseHandler<'a, C> {
    pub fn new(producer: Producer<'a, Timestamp>, clock: C) -> Self {
        Self {
            producer,
            clock,
            pulses: 0,
        }
    }

    /// Record one pulse. Returns `false` if the ring was full and the pulse dropped.
    #[inline]
    pub fn on_pulse(&mut self) -> bool {
        self.pulses = self.pulses.wrapping_add(1);
        let now = self.clock.now();
        self.producer.push(now)
    }

    /// Pulses seen, stored or dropped.
    #[inline]
    pub fn pulses(&self) -> usize {
        self.pulses
    }

    #[inline]
    pub fn dropped(&self) -> usize {
        self.producer.dropped()
    }

    /// Give the producer role back.
    pub fn into_producer(self) -> Producer<'a, Timestamp> {
        self.producer
    }
}
