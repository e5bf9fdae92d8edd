use serde::{Deserialize, Serialize};

/// Passing and total feature counts, with `passing <= total`.
///
/// Scoped either to a single phase or to every phase in the store, depending
/// on how it was taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub passing: u32,
    pub total: u32,
}

impl ProgressSnapshot {
    pub fn new(passing: u32, total: u32) -> Self {
        Self {
            passing: passing.min(total),
            total,
        }
    }

    /// Percentage passing, rounded to one decimal place. Zero when empty.
    pub fn percentage(&self) -> f64 {
        percentage(self.passing, self.total)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// One-line progress summary, e.g. `Progress (Phase 2): 3/4 tests passing (75.0%)`.
    pub fn summary_line(&self, phase: Option<u32>) -> String {
        let label = match phase {
            Some(p) => format!(" (Phase {})", p),
            None => String::new(),
        };

        if self.total > 0 {
            format!(
                "Progress{}: {}/{} tests passing ({:.1}%)",
                label,
                self.passing,
                self.total,
                self.percentage()
            )
        } else {
            format!("Progress{}: No features in database yet", label)
        }
    }
}

/// `round(100 * passing / total, 1)`, or `0.0` when `total` is zero.
///
/// Exact halves round to even (6.25 -> 6.2), as decimal formatting does.
pub fn percentage(passing: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = f64::from(passing) / f64::from(total) * 100.0;
    format!("{:.1}", raw).parse().unwrap_or(raw)
}

/// Completion state of one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStatus {
    pub phase: u32,
    pub passing: u32,
    pub total: u32,
    pub complete: bool,
}

/// The active phase and whether it is already fully passing.
///
/// An active phase that is complete means the next phase has not been
/// started yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPhase {
    pub phase: u32,
    pub complete: bool,
}

/// Webhook payload sent when the passing count increases.
///
/// Delivered as the single element of a JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub event: String,
    pub passing: u32,
    pub total: u32,
    pub percentage: f64,
    pub previous_passing: u32,
    pub tests_completed_this_session: u32,
    /// Labels of features that started passing since the last check, in
    /// priority order. Empty when the previous cache predates id tracking.
    pub completed_tests: Vec<String>,
    pub project: String,
    pub timestamp: String,
}

pub const PROGRESS_EVENT: &str = "test_progress";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_one_decimal() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(3, 3), 100.0);
    }

    #[test]
    fn percentage_rounds_exact_halves_to_even() {
        assert_eq!(percentage(1, 16), 6.2);
        assert_eq!(percentage(5, 16), 31.2);
        assert_eq!(percentage(3, 16), 18.8);
        assert_eq!(percentage(1, 8), 12.5);
    }

    #[test]
    fn percentage_of_empty_store_is_zero() {
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn summary_line_reports_counts() {
        let snapshot = ProgressSnapshot::new(3, 4);
        assert_eq!(
            snapshot.summary_line(None),
            "Progress: 3/4 tests passing (75.0%)"
        );
        assert_eq!(
            snapshot.summary_line(Some(2)),
            "Progress (Phase 2): 3/4 tests passing (75.0%)"
        );
    }

    #[test]
    fn summary_line_without_features() {
        let snapshot = ProgressSnapshot::default();
        assert_eq!(
            snapshot.summary_line(Some(1)),
            "Progress (Phase 1): No features in database yet"
        );
    }

    #[test]
    fn new_clamps_passing_to_total() {
        let snapshot = ProgressSnapshot::new(5, 3);
        assert_eq!(snapshot.passing, 3);
    }
}
