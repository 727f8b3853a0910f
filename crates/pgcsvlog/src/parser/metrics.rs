use std::sync::atomic::{AtomicU64, Ordering};
use serde::Serialize;

use super::model::{EnrichState, LogRecord};

/// Counters by enrichment outcome.
#[derive(Debug, Default)]
pub struct OutcomeMetrics {
    pub no_match: AtomicU64,
    pub duration_only: AtomicU64,
    pub with_query: AtomicU64,
    pub with_plan: AtomicU64,
}

/// Sentinel counters (coercion that fell back to an invalid value)
#[derive(Debug, Default)]
pub struct SentinelMetrics {
    pub invalid_timestamps: AtomicU64,
    pub invalid_numbers: AtomicU64,
}

/// Metrics for the enrichment stage.
///
/// Updated by the stream adapters after each record, never by the enricher
/// itself. All operations use `Ordering::Relaxed`; `snapshot()` may tear
/// across fields while a run is in progress.
#[derive(Debug, Default)]
pub struct EnrichMetrics {
    pub records: AtomicU64,
    pub extension_rows: AtomicU64,
    pub outcomes: OutcomeMetrics,
    pub sentinels: SentinelMetrics,
}

impl EnrichMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one emitted record.
    #[inline]
    pub fn record(&self, record: &LogRecord) {
        self.records.fetch_add(1, Ordering::Relaxed);

        let outcome = match record.state() {
            EnrichState::NoMatch => &self.outcomes.no_match,
            EnrichState::DurationOnly => &self.outcomes.duration_only,
            EnrichState::DurationWithQuery => &self.outcomes.with_query,
            EnrichState::DurationWithPlan => &self.outcomes.with_plan,
        };
        outcome.fetch_add(1, Ordering::Relaxed);

        let bad_timestamps = [&record.log_time, &record.session_start_time]
            .iter()
            .filter(|ts| !ts.is_valid())
            .count() as u64;
        if bad_timestamps > 0 {
            self.sentinels.invalid_timestamps.fetch_add(bad_timestamps, Ordering::Relaxed);
        }

        let bad_numbers = [record.process_id, record.session_line_num]
            .iter()
            .filter(|n| n.is_nan())
            .count() as u64;
        if bad_numbers > 0 {
            self.sentinels.invalid_numbers.fetch_add(bad_numbers, Ordering::Relaxed);
        }

        if !record.extensions.is_empty() {
            self.extension_rows.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let no_match = self.outcomes.no_match.load(Ordering::Relaxed);
        let duration_only = self.outcomes.duration_only.load(Ordering::Relaxed);
        let with_query = self.outcomes.with_query.load(Ordering::Relaxed);
        let with_plan = self.outcomes.with_plan.load(Ordering::Relaxed);

        MetricsSnapshot {
            records: self.records.load(Ordering::Relaxed),
            duration_lines: duration_only + with_query + with_plan,
            no_match,
            duration_only,
            with_query,
            with_plan,
            invalid_timestamps: self.sentinels.invalid_timestamps.load(Ordering::Relaxed),
            invalid_numbers: self.sentinels.invalid_numbers.load(Ordering::Relaxed),
            extension_rows: self.extension_rows.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`EnrichMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub records: u64,
    pub duration_lines: u64,
    pub no_match: u64,
    pub duration_only: u64,
    pub with_query: u64,
    pub with_plan: u64,
    pub invalid_timestamps: u64,
    pub invalid_numbers: u64,
    pub extension_rows: u64,
}
