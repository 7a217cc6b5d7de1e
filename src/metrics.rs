use std::sync::atomic::{AtomicU64, Ordering};

/// Per-stage item counters.
///
/// The stage worker increments these as it runs; the stage reports a
/// snapshot when it finishes. Items count as "dropped" when a transform
/// rejects them or a downstream hand-off fails, both non-fatal per-item
/// events.
#[derive(Debug, Default)]
pub struct StageCounters {
    processed: AtomicU64,
    dropped: AtomicU64,
}

impl StageCounters {
    /// Create zeroed counters for a stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully processed item.
    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dropped item.
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Total items processed so far.
    pub fn total_processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Total items dropped so far.
    pub fn total_dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Format the counters as a human-readable summary line.
    pub fn format(&self) -> String {
        format!(
            "processed: {}, dropped: {}",
            self.total_processed(),
            self.total_dropped()
        )
    }
}
