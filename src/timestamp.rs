//! Pulse arrival instants.

use core::time::Duration;

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Arrival instant of one pulse: whole seconds plus a sub-second part.
///
/// The ring never interprets the value; ordering is by seconds, then nanoseconds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    secs: u64,
    nanos: u32,
}

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp { secs: 0, nanos: 0 };

    /// Build a timestamp, carrying `nanos >= 1s` into the seconds field.
    pub const fn new(secs: u64, nanos: u32) -> Self {
        let carry = (nanos / NANOS_PER_SEC) as u64;
        Self {
            secs: secs.saturating_add(carry),
            nanos: nanos % NANOS_PER_SEC,
        }
    }

    #[inline]
    pub const fn as_secs(&self) -> u64 {
        self.secs
    }

    #[inline]
    pub const fn subsec_nanos(&self) -> u32 {
        self.nanos
    }

    /// Raw bit pattern: seconds in the high 64 bits, nanoseconds in the low bits.
    #[inline]
    pub const fn to_bits(&self) -> u128 {
        ((self.secs as u128) << 64) | self.nanos as u128
    }
}

impl From<Duration> for Timestamp {
    fn from(d: Duration) -> Self {
        Self::new(d.as_secs(), d.subsec_nanos())
    }
}

impl From<Timestamp> for Duration {
    fn from(ts: Timestamp) -> Self {
        Duration::new(ts.secs, ts.nanos)
    }
}
