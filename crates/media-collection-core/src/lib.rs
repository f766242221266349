pub mod matcher;
pub mod probe;
pub mod progress;
pub mod reconcile;
pub mod reference;

#[cfg(any(test, feature = "test-util"))]
pub mod fake;

pub use matcher::{MatchOutcome, MatchSet, TitleHits, TitleMatcher};
pub use probe::{default_probes, run_probes, ProbeResult};
pub use progress::ProgressTracker;
pub use reconcile::{CollectionReconciler, ReconcileReport, TagOutcome, TagStatus};
pub use reference::{ReferenceList, EON_TITLES, NON_EON_TITLES};
