//! Running success/latency accounting across compilations.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Point-in-time view of the accumulated analytics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    /// Compilations attempted, including failures.
    pub total_compilations: u64,
    /// Compilations whose overall confidence cleared the success bar.
    pub successful_compilations: u64,
    /// Mean compilation time in milliseconds.
    pub average_time_ms: f64,
    /// Success percentage. 100 before the first compilation.
    pub success_rate: f64,
}

#[derive(Debug, Default)]
struct Totals {
    total: u64,
    successes: u64,
    elapsed_ms: u64,
}

/// Accumulator updated after every compilation, failed ones included.
#[derive(Debug, Default)]
pub struct CompilerAnalytics {
    totals: RwLock<Totals>,
}

impl CompilerAnalytics {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one finished compilation.
    pub fn record(&self, elapsed_ms: u64, success: bool) {
        let mut totals = self.totals.write();
        totals.total += 1;
        totals.elapsed_ms += elapsed_ms;
        if success {
            totals.successes += 1;
        }
    }

    /// Records one compilation that failed before producing output.
    pub fn record_failure(&self, elapsed_ms: u64) {
        self.record(elapsed_ms, false);
    }

    /// Current snapshot.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn snapshot(&self) -> AnalyticsSnapshot {
        let totals = self.totals.read();
        if totals.total == 0 {
            return AnalyticsSnapshot {
                total_compilations: 0,
                successful_compilations: 0,
                average_time_ms: 0.0,
                success_rate: 100.0,
            };
        }
        AnalyticsSnapshot {
            total_compilations: totals.total,
            successful_compilations: totals.successes,
            average_time_ms: totals.elapsed_ms as f64 / totals.total as f64,
            success_rate: totals.successes as f64 / totals.total as f64 * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_full_success_rate() {
        let analytics = CompilerAnalytics::new();
        let snapshot = analytics.snapshot();
        assert_eq!(snapshot.total_compilations, 0);
        assert!((snapshot.success_rate - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn failures_count_against_the_rate() {
        let analytics = CompilerAnalytics::new();
        analytics.record(10, true);
        analytics.record_failure(30);
        let snapshot = analytics.snapshot();
        assert_eq!(snapshot.total_compilations, 2);
        assert_eq!(snapshot.successful_compilations, 1);
        assert!((snapshot.success_rate - 50.0).abs() < f64::EPSILON);
        assert!((snapshot.average_time_ms - 20.0).abs() < f64::EPSILON);
    }
}
