//! Upload progress reporting.
//!
//! The file body is handed to reqwest as a stream of fixed-size slices; each
//! slice pulled by the transport advances a shared tracker which reports
//! `round(sent * 100 / total)` to the caller. Reports are deduplicated and
//! never decrease.

use std::sync::atomic::{AtomicI16, AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;

/// Progress callback receiving a 0..=100 percentage.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// A callback that ignores progress.
pub fn no_progress() -> ProgressFn {
    Arc::new(|_| {})
}

/// Percentage of `total` covered by `sent`, rounded to the nearest integer.
/// An empty payload is complete by definition.
pub fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let sent = sent.min(total);
    ((sent as f64 * 100.0) / total as f64).round() as u8
}

/// Shared byte counter feeding a [`ProgressFn`].
pub struct ProgressTracker {
    total: u64,
    sent: AtomicU64,
    /// Last percentage reported, -1 before the first report.
    last: AtomicI16,
    on_progress: ProgressFn,
}

impl ProgressTracker {
    pub fn new(total: u64, on_progress: ProgressFn) -> Arc<Self> {
        Arc::new(Self {
            total,
            sent: AtomicU64::new(0),
            last: AtomicI16::new(-1),
            on_progress,
        })
    }

    /// Record `n` more bytes handed to the transport.
    pub fn advance(&self, n: usize) {
        let sent = self.sent.fetch_add(n as u64, Ordering::Relaxed) + n as u64;
        self.report(percent(sent, self.total));
    }

    /// Force a final 100% report (no-op if already reported).
    pub fn complete(&self) {
        self.report(100);
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    fn report(&self, pct: u8) {
        let prev = self.last.fetch_max(pct as i16, Ordering::AcqRel);
        if (pct as i16) > prev {
            (self.on_progress)(pct);
        }
    }
}

/// Split `bytes` into slices of at most `chunk_size` bytes.
pub fn chunk(bytes: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    let chunk_size = chunk_size.max(1);
    (0..bytes.len())
        .step_by(chunk_size)
        .map(|start| bytes.slice(start..(start + chunk_size).min(bytes.len())))
        .collect()
}

/// Build a streaming request body that advances `tracker` per slice.
pub fn tracked_body(bytes: Bytes, chunk_size: usize, tracker: Arc<ProgressTracker>) -> reqwest::Body {
    let slices = chunk(&bytes, chunk_size);
    let stream = futures::stream::iter(slices).map(move |slice| {
        tracker.advance(slice.len());
        Ok::<Bytes, std::io::Error>(slice)
    });
    reqwest::Body::wrap_stream(stream)
}
