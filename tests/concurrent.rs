//! Lock-free recording from multiple threads.

use hdrhist::Histogram;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread;

const TRACKABLE_MAX: i64 = 3600 * 1000 * 1000;
const SIGFIG: u8 = 3;

#[test]
fn concurrent_recording_preserves_total() {
    let hist = Arc::new(Histogram::new(TRACKABLE_MAX, SIGFIG).unwrap());
    let threads = 4_i64;
    let per_thread = 10_000_i64;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let h = Arc::clone(&hist);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(t as u64);
                let mut local_min = i64::MAX;
                let mut local_max = 0;
                for _ in 0..per_thread {
                    let v = rng.gen_range(1..TRACKABLE_MAX);
                    h.record(v).unwrap();
                    local_min = local_min.min(v);
                    local_max = local_max.max(v);
                }
                (local_min, local_max)
            })
        })
        .collect();

    let mut global_min = i64::MAX;
    let mut global_max = 0;
    for handle in handles {
        let (min, max) = handle.join().unwrap();
        global_min = global_min.min(min);
        global_max = global_max.max(max);
    }

    assert_eq!(hist.total(), threads * per_thread);
    let sum: i64 = hist
        .iter_recorded()
        .map(|iv| iv.count_since_last_iteration())
        .sum();
    assert_eq!(sum, threads * per_thread);

    assert_eq!(hist.min(), hist.lowest_equivalent(global_min));
    assert_eq!(hist.max(), hist.highest_equivalent(global_max));
}

#[test]
fn concurrent_recording_same_cell() {
    let hist = Arc::new(Histogram::new(100_000, SIGFIG).unwrap());
    let threads = 8_i64;
    let per_thread = 50_000_i64;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let h = Arc::clone(&hist);
            thread::spawn(move || {
                for _ in 0..per_thread {
                    h.record(1000).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(hist.total(), threads * per_thread);
    assert_eq!(hist.count_at(1000), threads * per_thread);
    assert_eq!(hist.min(), 1000);
    assert_eq!(hist.max(), 1000);
}

#[test]
fn concurrent_recording_with_counts() {
    let hist = Arc::new(Histogram::new(100_000, SIGFIG).unwrap());

    let handles: Vec<_> = (0..4_i64)
        .map(|t| {
            let h = Arc::clone(&hist);
            thread::spawn(move || {
                for _ in 0..1000 {
                    h.record_n(100 * (t + 1), 3).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(hist.total(), 4 * 1000 * 3);
    for t in 1..=4_i64 {
        assert_eq!(hist.count_at(100 * t), 3000);
    }
    assert_eq!(hist.min(), 100);
    assert_eq!(hist.max(), 400);
}

#[test]
fn readers_race_recorders_without_tearing() {
    let hist = Arc::new(Histogram::new(TRACKABLE_MAX, SIGFIG).unwrap());
    let writer = {
        let h = Arc::clone(&hist);
        thread::spawn(move || {
            let mut rng = StdRng::seed_from_u64(7);
            for _ in 0..100_000 {
                let v = rng.gen_range(1..1_000_000);
                h.record(v).unwrap();
            }
        })
    };

    // queries interleave with recording; results are weakly consistent but
    // must stay inside the recorded value range
    for _ in 0..100 {
        let p99 = hist.value_at_percentile(99.0);
        assert!((0..1_000_000 + 1_000_000 / 1000).contains(&p99));
        let total = hist.total();
        assert!((0..=100_000).contains(&total));
        let _ = hist.mean();
        let _ = hist.iter_recorded().count();
    }

    writer.join().unwrap();
    assert_eq!(hist.total(), 100_000);
}

#[test]
fn concurrent_merge_into_shared_target() {
    let sources: Vec<_> = (0..4_i64)
        .map(|t| {
            let h = Histogram::new(100_000, SIGFIG).unwrap();
            for i in 0..1000_i64 {
                h.record((i % 100) * 10 + t * 7 + 1).unwrap();
            }
            h
        })
        .collect();

    let dst = Arc::new(Histogram::new(100_000, SIGFIG).unwrap());
    let handles: Vec<_> = sources
        .into_iter()
        .map(|src| {
            let dst = Arc::clone(&dst);
            thread::spawn(move || dst.add(&src))
        })
        .collect();

    let mut dropped = 0;
    for handle in handles {
        dropped += handle.join().unwrap();
    }

    assert_eq!(dropped, 0);
    assert_eq!(dst.total(), 4000);
}
