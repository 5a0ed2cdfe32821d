//! Concurrency tests: many threads hammering one generator

use std::collections::HashMap;
use std::sync::Arc;

use seqgen_core::prelude::{ManualClock, SequenceConfig, SequenceGenerator, Timestamp};
use seqgen_tests::*;

fn worker_count() -> usize {
    num_cpus::get().clamp(4, 16)
}

#[test]
fn test_unique_across_threads_system_clock() {
    // Ceiling above the total so the counter alone keeps identifiers apart
    let generator = Arc::new(
        SequenceGenerator::from_config(SequenceConfig::with_max_per_msec(1_000_000)).unwrap(),
    );
    let threads = worker_count();
    let per_thread = 5_000;

    let ids = generate_concurrently(Arc::clone(&generator), threads, per_thread).unwrap();

    assert_eq!(ids.len(), threads * per_thread);
    assert_eq!(distinct(&ids), threads * per_thread);
    assert_eq!(generator.counter(), (threads * per_thread) as u64);
}

#[test]
fn test_unique_with_default_configuration() {
    // Default ceiling of 1000, system clock, thread-local RNG. A duplicate
    // needs two calls in the same millisecond on the same counter value
    // (only possible after a wraparound inside that millisecond) that also
    // draw the same suffix. For k calls sharing such a slot the odds are
    // C(k, 2) / 900_000, and k stays at 1 until one millisecond sees more
    // than 1001 calls.
    let generator = Arc::new(SequenceGenerator::with_defaults());
    let threads = 8;
    let per_thread = 50_000;

    let ids = generate_concurrently(Arc::clone(&generator), threads, per_thread).unwrap();

    let mut slots: HashMap<(&str, u64), usize> = HashMap::new();
    for id in &ids {
        let parts = generator.decompose(id.as_str()).unwrap();
        assert!(parts.counter <= 1000);
        *slots.entry((parts.timestamp, parts.counter)).or_default() += 1;
    }
    let shared_pairs: usize = slots.values().map(|&k| k * (k - 1) / 2).sum();
    println!(
        "{} ids, {} slots, {} pairs sharing a slot (expected duplicates {:.4})",
        ids.len(),
        slots.len(),
        shared_pairs,
        shared_pairs as f64 / 900_000.0
    );

    assert_eq!(ids.len(), threads * per_thread);
    assert_eq!(distinct(&ids), threads * per_thread);
}

#[test]
fn test_unique_across_threads_frozen_clock() {
    // Every call lands in the same millisecond
    let generator = Arc::new(frozen_generator(100_000));
    let ids = generate_concurrently(Arc::clone(&generator), 8, 10_000).unwrap();

    assert_eq!(distinct(&ids), 80_000);
}

#[test]
fn test_every_counter_value_handed_out_evenly() {
    // 10 counter values, 10_000 calls: each value must appear exactly 1_000 times
    let generator = Arc::new(frozen_generator(9));
    let ids = generate_concurrently(Arc::clone(&generator), 8, 1_250).unwrap();

    let mut histogram: HashMap<u64, usize> = HashMap::new();
    for id in &ids {
        let parts = generator.decompose(id.as_str()).unwrap();
        assert!(parts.counter <= 9);
        *histogram.entry(parts.counter).or_default() += 1;
    }

    assert_eq!(histogram.len(), 10);
    assert!(histogram.values().all(|&n| n == 1_000), "{histogram:?}");
    assert_eq!(generator.counter(), 10);
}

#[test]
fn test_counter_increases_within_each_thread() {
    let generator = Arc::new(frozen_generator(1_000_000));
    let threads = worker_count();
    let per_thread = 2_000;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let generator = Arc::clone(&generator);
            std::thread::spawn(move || {
                (0..per_thread)
                    .map(|_| {
                        let id = generator.generate_sequence_no().unwrap();
                        generator.decompose(id.as_str()).unwrap().counter
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all = Vec::new();
    for handle in handles {
        let counters = handle.join().unwrap();
        assert!(counters.windows(2).all(|w| w[0] < w[1]));
        all.extend(counters);
    }

    // Together the threads consumed exactly 0..total
    all.sort_unstable();
    let expected: Vec<u64> = (0..(threads * per_thread) as u64).collect();
    assert_eq!(all, expected);
}

#[test]
fn test_failures_under_contention_do_not_leak_counter_values() {
    // Every third draw fails; successful calls still get a gapless counter run
    let fail_on: Vec<usize> = (0..6_000).filter(|n| n % 3 == 0).collect();
    let generator = Arc::new(
        SequenceGenerator::new(
            SequenceConfig::with_max_per_msec(1_000_000),
            ManualClock::new(Timestamp::from_millis(FROZEN_MILLIS)),
            FailingSuffix::new(fail_on),
        )
        .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let generator = Arc::clone(&generator);
            std::thread::spawn(move || {
                (0..1_500)
                    .filter_map(|_| generator.generate_sequence_no().ok())
                    .map(|id| generator.decompose(id.as_str()).unwrap().counter)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut counters: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    counters.sort_unstable();

    assert_eq!(counters.len(), 4_000);
    assert_eq!(counters, (0..4_000).collect::<Vec<u64>>());
    assert_eq!(generator.counter(), 4_000);
}
