use std::collections::HashMap;
use std::time::Instant;
use tracing::{info, warn};

/// Counts per-item outcomes of a tagging pass and logs a summary at the end
pub struct ProgressTracker {
    total: usize,
    added: usize,
    already_present: usize,
    failed: usize,
    skipped: usize,
    start_time: Instant,
    error_counts: HashMap<String, usize>,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        if total > 10 {
            info!("Starting operation: {} items to process", total);
        }
        Self {
            total,
            added: 0,
            already_present: 0,
            failed: 0,
            skipped: 0,
            start_time: Instant::now(),
            error_counts: HashMap::new(),
        }
    }

    pub fn record_added(&mut self) {
        self.added += 1;
    }

    pub fn record_already_present(&mut self) {
        self.already_present += 1;
    }

    /// Dry-run items that would have been added
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Record a failure grouped under `error_category` in the summary
    pub fn record_failed_with_error(&mut self, error_category: &str) {
        self.failed += 1;
        *self.error_counts.entry(error_category.to_string()).or_insert(0) += 1;
    }

    #[cfg(test)]
    fn added(&self) -> usize {
        self.added
    }

    #[cfg(test)]
    fn already_present(&self) -> usize {
        self.already_present
    }

    #[cfg(test)]
    fn failed(&self) -> usize {
        self.failed
    }

    #[cfg(test)]
    fn skipped(&self) -> usize {
        self.skipped
    }

    #[cfg(test)]
    fn processed(&self) -> usize {
        self.added + self.already_present + self.failed + self.skipped
    }

    pub fn log_summary(&self, operation_name: &str) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if self.failed > 0 {
            warn!(
                "{} completed: {} total in {:.1}s | Added: {} | Already present: {} | Failed: {} | Skipped: {}",
                operation_name, self.total, elapsed,
                self.added, self.already_present, self.failed, self.skipped
            );

            let mut error_entries: Vec<_> = self.error_counts.iter().collect();
            error_entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            let error_summary: Vec<String> = error_entries
                .iter()
                .map(|(category, count)| format!("{}: {}", category, count))
                .collect();
            info!("Error breakdown: {}", error_summary.join(", "));
        } else {
            info!(
                "{} completed: {} total in {:.1}s | Added: {} | Already present: {} | Skipped: {}",
                operation_name, self.total, elapsed,
                self.added, self.already_present, self.skipped
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut tracker = ProgressTracker::new(5);
        tracker.record_added();
        tracker.record_added();
        tracker.record_already_present();
        tracker.record_skipped();
        tracker.record_failed_with_error("http");

        assert_eq!(tracker.added(), 2);
        assert_eq!(tracker.already_present(), 1);
        assert_eq!(tracker.skipped(), 1);
        assert_eq!(tracker.failed(), 1);
        assert_eq!(tracker.processed(), 5);
        tracker.log_summary("test");
    }
}
