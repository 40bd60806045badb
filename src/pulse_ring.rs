//! Lock-free SPSC ring of pulse timestamps with a drop-newest overflow policy.
//!
//! # Overview
//! - Single producer (the interrupt-time pulse path), single consumer (a bulk reader).
//! - Fixed power-of-two capacity; one slot always stays empty so `head == tail` means empty.
//! - The producer never blocks, allocates, or logs. When the ring is full the newest pulse
//!   is dropped and counted; unread data is never overwritten.
//! - The consumer drains in FIFO order, in bulk or one at a time.
//!
//! # Memory ordering
//! `head` is written only by the producer, `tail` only by the consumer. The producer writes
//! the slot, then publishes `head` with `Release`; the consumer loads `head` with `Acquire`
//! before reading slots. Symmetrically the consumer copies a slot out, then publishes `tail`
//! with `Release`; the producer loads `tail` with `Acquire` before reusing slots. The slot
//! array itself is never accessed atomically: the index handshake keeps both sides on
//! disjoint slots.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::UnsafeCell;
use core::mem::MaybeUninit;

use crossbeam_utils::CachePadded;
use tracing::{debug, trace, warn};

#[cfg(not(feature = "portable-atomic"))]
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
#[cfg(feature = "portable-atomic")]
use portable_atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::config::{RingConfig, validate_capacity};
use crate::error::{RingError, RingResult};
use crate::timestamp::Timestamp;

fn alloc_slots<T>(capacity: usize) -> RingResult<Box<[UnsafeCell<MaybeUninit<T>>]>> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|_| RingError::OutOfMemory { capacity })?;
    slots.extend((0..capacity).map(|_| UnsafeCell::new(MaybeUninit::uninit())));
    Ok(slots.into_boxed_slice())
}

/// Bounded SPSC ring. The producer drops the newest value on overflow.
pub struct PulseRing<T: Copy = Timestamp> {
    head: CachePadded<AtomicUsize>,
    tail: CachePadded<AtomicUsize>,
    dropped: AtomicUsize,
    mask: usize,
    producer_active: AtomicBool,
    consumer_active: AtomicBool,
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

unsafe impl<T: Copy + Send> Sync for PulseRing<T> {}

impl<T: Copy> PulseRing<T> {
    /// Allocate a ring with `capacity` slots, `capacity - 1` of them usable.
    pub fn new(capacity: usize) -> RingResult<Self> {
        validate_capacity(capacity)?;
        let slots = alloc_slots(capacity)?;
        debug!(capacity, "pulse ring created");
        Ok(Self {
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            dropped: AtomicUsize::new(0),
            mask: capacity - 1,
            producer_active: AtomicBool::new(false),
            consumer_active: AtomicBool::new(false),
            slots,
        })
    }

    pub fn with_config(config: &RingConfig) -> RingResult<Self> {
        Self::new(config.capacity)
    }

    /// Ring sized to one page of timestamps.
    pub fn with_default_capacity() -> RingResult<Self> {
        Self::with_config(&RingConfig::default())
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Maximum number of values held at once.
    #[inline]
    pub fn usable_capacity(&self) -> usize {
        self.mask
    }

    #[inline(always)]
    fn occupied(&self, head: usize, tail: usize) -> usize {
        head.wrapping_sub(tail) & self.mask
    }

    /// Number of values waiting to be drained. Callable from any thread.
    #[inline]
    pub fn available(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        self.occupied(head, tail)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// Total pushes discarded because the ring was full.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Take the producer role, or `None` if a producer handle is alive.
    pub fn try_producer(&self) -> Option<Producer<'_, T>> {
        if self.producer_active.swap(true, Ordering::Acquire) {
            return None;
        }
        Some(Producer { ring: self })
    }

    /// Take the producer role.
    ///
    /// # Panics
    /// If another producer handle is alive.
    pub fn producer(&self) -> Producer<'_, T> {
        match self.try_producer() {
            Some(producer) => producer,
            None => panic!("pulse ring already has an active producer"),
        }
    }

    /// Take the consumer role, or `None` if a consumer handle is alive.
    pub fn try_consumer(&self) -> Option<Consumer<'_, T>> {
        if self.consumer_active.swap(true, Ordering::Acquire) {
            return None;
        }
        Some(Consumer {
            ring: self,
            seen_dropped: self.dropped(),
        })
    }

    /// Take the consumer role.
    ///
    /// # Panics
    /// If another consumer handle is alive.
    pub fn consumer(&self) -> Consumer<'_, T> {
        match self.try_consumer() {
            Some(consumer) => consumer,
            None => panic!("pulse ring already has an active consumer"),
        }
    }
}

impl<T: Copy> Drop for PulseRing<T> {
    fn drop(&mut self) {
        debug!(
            capacity = self.capacity(),
            pending = self.available(),
            dropped = self.dropped(),
            "pulse ring destroyed"
        );
    }
}

/// Producer handle. Safe to use from contexts that cannot block or allocate.
pub struct Producer<'a, T: Copy = Timestamp> {
    ring: &'a PulseRing<T>,
}

impl<'a, T: Copy> Producer<'a, T> {
    /// Store `value`, or drop it if the ring is full.
    ///
    /// Returns `false` on a drop; the drop is also counted in [`PulseRing::dropped`].
    #[inline]
    pub fn push(&mut self, value: T) -> bool {
        let ring = self.ring;
        let head = ring.head.load(Ordering::Relaxed);
        let tail = ring.tail.load(Ordering::Acquire);

        if ring.occupied(head, tail) == ring.mask {
            // Single writer, so no read-modify-write is needed.
            let dropped = ring.dropped.load(Ordering::Relaxed);
            ring.dropped.store(dropped.wrapping_add(1), Ordering::Relaxed);
            return false;
        }

        // SAFETY: `head` lies outside the consumer's window [tail, head) until the
        // release store below publishes it.
        unsafe { (*ring.slots[head].get()).as_mut_ptr().write(value) };

        ring.head.store((head + 1) & ring.mask, Ordering::Release);
        true
    }

    /// Slots that can be pushed before the next drop.
    #[inline]
    pub fn free(&self) -> usize {
        let head = self.ring.head.load(Ordering::Relaxed);
        let tail = self.ring.tail.load(Ordering::Acquire);
        self.ring.mask - self.ring.occupied(head, tail)
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.free() == 0
    }

    #[inline]
    pub fn dropped(&self) -> usize {
        self.ring.dropped()
    }
}

impl<T: Copy> Drop for Producer<'_, T> {
    fn drop(&mut self) {
        self.ring.producer_active.store(false, Ordering::Release);
    }
}

/// Consumer handle for bulk, in-order draining.
pub struct Consumer<'a, T: Copy = Timestamp> {
    ring: &'a PulseRing<T>,
    seen_dropped: usize,
}

impl<'a, T: Copy> Consumer<'a, T> {
    /// Values ready to drain.
    #[inline]
    pub fn available(&self) -> usize {
        let tail = self.ring.tail.load(Ordering::Relaxed);
        let head = self.ring.head.load(Ordering::Acquire);
        self.ring.occupied(head, tail)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    #[inline]
    pub fn dropped(&self) -> usize {
        self.ring.dropped()
    }

    /// Drain up to `max` values, oldest first, handing each to `hook`.
    /// Returns the number drained; `0` when the ring is empty.
    ///
    /// Each slot is freed for the producer right after it is copied out, before
    /// `hook` sees the copy.
    pub fn drain_with(&mut self, max: usize, mut hook: impl FnMut(T)) -> usize {
        let ring = self.ring;
        let head = ring.head.load(Ordering::Acquire);
        let mut tail = ring.tail.load(Ordering::Relaxed);
        let n = max.min(ring.occupied(head, tail));

        for _ in 0..n {
            // SAFETY: [tail, head) was published by the producer's release store on
            // `head`, observed by the acquire load above; the producer won't reuse a
            // slot until `tail` has moved past it.
            let value = unsafe { (*ring.slots[tail].get()).assume_init_read() };
            tail = (tail + 1) & ring.mask;
            ring.tail.store(tail, Ordering::Release);
            hook(value);
        }

        if n > 0 {
            trace!(drained = n, "pulse ring drained");
        }
        self.note_drops();
        n
    }

    /// Drain into `out`, oldest first. Returns how many leading entries were filled.
    pub fn drain_into(&mut self, out: &mut [T]) -> usize {
        let mut filled = 0;
        self.drain_with(out.len(), |value| {
            out[filled] = value;
            filled += 1;
        })
    }

    /// Drain up to `max` values, oldest first.
    pub fn drain(&mut self, max: usize) -> Vec<T> {
        let mut out = Vec::with_capacity(max.min(self.available()));
        self.drain_with(max, |value| out.push(value));
        out
    }

    /// Drain exactly one value, or `None` if empty.
    pub fn drain_one(&mut self) -> Option<T> {
        let mut out = None;
        self.drain_with(1, |value| out = Some(value));
        out
    }

    fn note_drops(&mut self) {
        let dropped = self.ring.dropped();
        if dropped != self.seen_dropped {
            warn!(
                lost = dropped.wrapping_sub(self.seen_dropped),
                total = dropped,
                "pulse ring overflowed, newest pulses dropped"
            );
            self.seen_dropped = dropped;
        }
    }
}

impl<T: Copy> Drop for Consumer<'_, T> {
    fn drop(&mut self) {
        self.ring.consumer_active.store(false, Ordering::Release);
    }
}
