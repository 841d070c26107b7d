//! Property-based tests for upload progress
//!
//! Tests invariants:
//! - Percentages are within 0..=100
//! - Reports strictly increase and finish at 100
//! - Slicing preserves every byte

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use proptest::prelude::*;

use crate::core::api::progress::{chunk, percent, ProgressTracker};
use crate::core::api::ProgressFn;

fn recorder() -> (ProgressFn, Arc<Mutex<Vec<u8>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (Arc::new(move |p| sink.lock().unwrap().push(p)), seen)
}

proptest! {
    /// Property: percent is bounded and monotonic in `sent`
    #[test]
    fn prop_percent_bounded_and_monotonic(total in 1u64..10_000_000, a in 0u64..20_000_000, b in 0u64..20_000_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(percent(hi, total) <= 100);
        prop_assert!(percent(lo, total) <= percent(hi, total));
        prop_assert_eq!(percent(total, total), 100);
    }

    /// Property: streaming a payload in slices reports an increasing sequence
    /// ending at 100
    #[test]
    fn prop_tracker_reports_increase_to_completion(size in 1usize..50_000, chunk_size in 1usize..8_192) {
        let bytes = Bytes::from(vec![0u8; size]);
        let (on_progress, seen) = recorder();
        let tracker = ProgressTracker::new(bytes.len() as u64, on_progress);

        let slices = chunk(&bytes, chunk_size);
        prop_assert_eq!(slices.iter().map(Bytes::len).sum::<usize>(), size);
        for slice in &slices {
            tracker.advance(slice.len());
        }
        tracker.complete();

        let seen = seen.lock().unwrap().clone();
        prop_assert_eq!(seen.last().copied(), Some(100));
        prop_assert!(seen.windows(2).all(|w| w[0] < w[1]), "not increasing: {:?}", seen);
    }
}
