//! Cross-thread stress tests: one thread plays the interrupt-time producer, another
//! drains in bulk.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;

use pulse_ring::{PulseHandler, PulseRing, Timestamp};
use tracing_subscriber::EnvFilter;

const TOTAL: u64 = 200_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Nanoseconds derived from seconds, so a torn read shows up as a mismatch.
fn stamp(i: u64) -> Timestamp {
    Timestamp::new(i, (i.wrapping_mul(2_654_435_761) % 1_000_000_000) as u32)
}

fn assert_untorn(ts: Timestamp) {
    assert_eq!(ts, stamp(ts.as_secs()), "torn timestamp {ts:?}");
}

#[test]
fn concurrent_push_and_drain_account_for_every_pulse() {
    init_tracing();
    let ring = PulseRing::<Timestamp>::new(64).unwrap();
    let done = AtomicBool::new(false);

    let drained = thread::scope(|s| {
        let mut producer = ring.producer();
        let done = &done;
        s.spawn(move || {
            for i in 0..TOTAL {
                producer.push(stamp(i));
            }
            done.store(true, Ordering::Release);
        });

        let mut consumer = ring.consumer();
        let mut drained = 0u64;
        let mut last: Option<u64> = None;
        loop {
            let finished = done.load(Ordering::Acquire);
            let n = consumer.drain_with(16, |ts| {
                assert_untorn(ts);
                if let Some(prev) = last {
                    assert!(ts.as_secs() > prev, "out of order: {} after {prev}", ts.as_secs());
                }
                last = Some(ts.as_secs());
                drained += 1;
            });
            if finished && n == 0 {
                break;
            }
        }
        drained
    });

    assert!(ring.is_empty());
    assert_eq!(drained + ring.dropped() as u64, TOTAL);
}

#[test]
fn backpressured_producer_loses_nothing() {
    init_tracing();
    let ring = PulseRing::<Timestamp>::new(16).unwrap();

    let seen = thread::scope(|s| {
        let mut producer = ring.producer();
        s.spawn(move || {
            for i in 0..TOTAL {
                while producer.is_full() {
                    std::hint::spin_loop();
                }
                assert!(producer.push(stamp(i)));
            }
        });

        let mut consumer = ring.consumer();
        let mut buf = [Timestamp::ZERO; 32];
        let mut next = 0u64;
        while next < TOTAL {
            let n = consumer.drain_into(&mut buf);
            for ts in &buf[..n] {
                assert_eq!(*ts, stamp(next));
                next += 1;
            }
        }
        next
    });

    assert_eq!(seen, TOTAL);
    assert_eq!(ring.dropped(), 0);
    assert!(ring.is_empty());
}

#[test]
fn pulse_handler_from_another_thread() {
    init_tracing();
    let ring = PulseRing::new(256).unwrap();
    let ticks = AtomicU64::new(0);
    const PULSES: usize = 50_000;

    let (drained, pulses) = thread::scope(|s| {
        let ticks = &ticks;
        let mut handler = PulseHandler::new(ring.producer(), move || {
            stamp(ticks.fetch_add(1, Ordering::Relaxed))
        });
        let isr = s.spawn(move || {
            for _ in 0..PULSES {
                handler.on_pulse();
            }
            handler.pulses()
        });

        let mut consumer = ring.consumer();
        let mut drained = 0usize;
        let mut drain = |consumer: &mut pulse_ring::Consumer<'_>| {
            let batch = consumer.drain(64);
            for ts in &batch {
                assert_untorn(*ts);
            }
            drained += batch.len();
            batch.len()
        };
        while !isr.is_finished() {
            drain(&mut consumer);
        }
        let pulses = isr.join().unwrap();
        while drain(&mut consumer) > 0 {}
        (drained, pulses)
    });

    assert_eq!(pulses, PULSES);
    assert_eq!(drained + ring.dropped(), PULSES);
}
