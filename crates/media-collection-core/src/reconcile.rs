use crate::matcher::MatchSet;
use crate::progress::ProgressTracker;
use media_collection_models::{CollectionSummary, LibrarySection, MovieItem};
use media_collection_sources::{MediaServer, SourceError};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagStatus {
    Added,
    AlreadyTagged,
    /// Dry run: the tag is missing and would have been added
    WouldAdd,
    /// Reading or writing this movie's tags failed; other movies were still processed
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct TagOutcome {
    pub movie: MovieItem,
    pub status: TagStatus,
}

#[derive(Debug, Clone)]
pub struct ReconcileReport {
    pub collection: String,
    /// The collection as it was before this pass, if it existed
    pub existing: Option<CollectionSummary>,
    pub outcomes: Vec<TagOutcome>,
    pub dry_run: bool,
}

impl ReconcileReport {
    fn count(&self, pred: impl Fn(&TagStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    pub fn added_count(&self) -> usize {
        self.count(|s| *s == TagStatus::Added)
    }

    pub fn already_tagged_count(&self) -> usize {
        self.count(|s| *s == TagStatus::AlreadyTagged)
    }

    pub fn would_add_count(&self) -> usize {
        self.count(|s| *s == TagStatus::WouldAdd)
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, TagStatus::Failed(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&MovieItem, &str)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            TagStatus::Failed(reason) => Some((&o.movie, reason.as_str())),
            _ => None,
        })
    }
}

/// Ensures every matched movie carries a collection tag.
///
/// Per-movie failures are recorded in the report and never stop the pass.
/// There is no rollback: a pass can leave some movies tagged and others not.
pub struct CollectionReconciler<'a, S: MediaServer + ?Sized> {
    server: &'a S,
    section: &'a LibrarySection,
    collection: &'a str,
    dry_run: bool,
}

impl<'a, S: MediaServer + ?Sized> CollectionReconciler<'a, S> {
    pub fn new(server: &'a S, section: &'a LibrarySection, collection: &'a str) -> Self {
        Self {
            server,
            section,
            collection,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Look up the target collection. Informational only; tagging proceeds either way.
    pub async fn existing_collection(&self) -> Result<Option<CollectionSummary>, SourceError> {
        let collections = self.server.collections(self.section).await?;
        Ok(collections.into_iter().find(|c| c.title == self.collection))
    }

    /// Look up the collection, then tag every match
    pub async fn reconcile(&self, matches: &MatchSet) -> Result<ReconcileReport, SourceError> {
        let existing = self.existing_collection().await?;
        Ok(self.tag_all(matches, existing, |_| {}).await)
    }

    /// Tag every match, calling `on_outcome` after each movie is processed.
    /// `existing` is carried into the report as-is.
    pub async fn tag_all<F>(
        &self,
        matches: &MatchSet,
        existing: Option<CollectionSummary>,
        mut on_outcome: F,
    ) -> ReconcileReport
    where
        F: FnMut(&TagOutcome),
    {
        match &existing {
            Some(c) => info!(collection = %c.title, items = c.child_count, "Collection already exists"),
            None => debug!(collection = %self.collection, "Collection does not exist yet"),
        }

        let mut tracker = ProgressTracker::new(matches.len());
        let mut outcomes = Vec::with_capacity(matches.len());

        for movie in matches.iter() {
            let status = match self.tag_movie(movie).await {
                Ok(status) => status,
                Err(e) => {
                    warn!(movie = %movie, error = %e, "Failed to tag movie");
                    tracker.record_failed_with_error(e.category());
                    TagStatus::Failed(e.to_string())
                }
            };
            match status {
                TagStatus::Added => tracker.record_added(),
                TagStatus::AlreadyTagged => tracker.record_already_present(),
                TagStatus::WouldAdd => tracker.record_skipped(),
                TagStatus::Failed(_) => {}
            }

            let outcome = TagOutcome {
                movie: movie.clone(),
                status,
            };
            on_outcome(&outcome);
            outcomes.push(outcome);
        }

        tracker.log_summary(&format!("Collection '{}' update", self.collection));

        ReconcileReport {
            collection: self.collection.to_string(),
            existing,
            outcomes,
            dry_run: self.dry_run,
        }
    }

    async fn tag_movie(&self, movie: &MovieItem) -> Result<TagStatus, SourceError> {
        // Search results can carry a truncated tag list, so read the item itself
        let current = self.server.metadata(&movie.rating_key).await?;
        if current.has_collection(self.collection) {
            debug!(movie = %movie, "Already in collection");
            return Ok(TagStatus::AlreadyTagged);
        }
        if self.dry_run {
            return Ok(TagStatus::WouldAdd);
        }

        // Tag edits replace the whole list, so send the tags just read
        self.server
            .add_collection(self.section, &current, self.collection)
            .await?;
        debug!(movie = %movie, collection = %self.collection, "Added to collection");
        Ok(TagStatus::Added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{movie, FakeServer};
    use media_collection_config::MatchKey;
    use std::sync::atomic::Ordering;

    fn match_set(movies: &[MovieItem]) -> MatchSet {
        let mut set = MatchSet::new(MatchKey::RatingKey);
        for m in movies {
            set.insert(m.clone());
        }
        set
    }

    #[tokio::test]
    async fn test_adds_missing_tags_and_skips_tagged() {
        let mut tagged = movie("2", "Skyfall", 2012);
        tagged.collections = vec!["James Bond".to_string()];
        let movies = vec![movie("1", "Dr. No", 1962), tagged, movie("3", "Spectre", 2015)];
        let server = FakeServer::new(movies.clone());

        let report = CollectionReconciler::new(&server, &server.section, "James Bond")
            .reconcile(&match_set(&movies))
            .await
            .unwrap();

        assert_eq!(report.added_count(), 2);
        assert_eq!(report.already_tagged_count(), 1);
        assert_eq!(report.failed_count(), 0);
        assert_eq!(server.tags_of("1"), vec!["James Bond"]);
        assert_eq!(server.tags_of("2"), vec!["James Bond"]);
        assert!(report.existing.is_none());
    }

    #[tokio::test]
    async fn test_second_run_adds_nothing() {
        let movies = vec![movie("1", "Goldfinger", 1964), movie("2", "Thunderball", 1965)];
        let server = FakeServer::new(movies.clone());
        let matches = match_set(&movies);
        let reconciler = CollectionReconciler::new(&server, &server.section, "James Bond");

        let first = reconciler.reconcile(&matches).await.unwrap();
        assert_eq!(first.added_count(), 2);

        let second = reconciler.reconcile(&matches).await.unwrap();
        assert_eq!(second.added_count(), 0);
        assert_eq!(second.already_tagged_count(), 2);
        assert_eq!(server.adds.load(Ordering::SeqCst), 2);
        assert_eq!(server.tags_of("1"), vec!["James Bond"]);
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let movies = vec![
            movie("1", "Octopussy", 1983),
            movie("2", "A View to a Kill", 1985),
            movie("3", "Licence to Kill", 1989),
            movie("4", "GoldenEye", 1995),
        ];
        let mut server = FakeServer::new(movies.clone());
        server.failing_adds.insert("2".to_string());
        server.failing_reads.insert("3".to_string());

        let mut order = Vec::new();
        let report = CollectionReconciler::new(&server, &server.section, "James Bond")
            .tag_all(&match_set(&movies), None, |o| order.push(o.movie.rating_key.clone()))
            .await;

        assert_eq!(order, vec!["1", "2", "3", "4"]);
        assert_eq!(report.added_count(), 2);
        assert_eq!(report.failed_count(), 2);
        let failed: Vec<&str> = report.failures().map(|(m, _)| m.title.as_str()).collect();
        assert_eq!(failed, vec!["A View to a Kill", "Licence to Kill"]);
        assert_eq!(server.tags_of("4"), vec!["James Bond"]);
    }

    #[tokio::test]
    async fn test_dry_run_does_not_mutate() {
        let movies = vec![movie("1", "Moonraker", 1979)];
        let server = FakeServer::new(movies.clone());

        let report = CollectionReconciler::new(&server, &server.section, "James Bond")
            .dry_run(true)
            .reconcile(&match_set(&movies))
            .await
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.would_add_count(), 1);
        assert_eq!(report.added_count(), 0);
        assert_eq!(server.adds.load(Ordering::SeqCst), 0);
        assert!(server.tags_of("1").is_empty());
    }

    #[tokio::test]
    async fn test_existing_collection_is_reported() {
        let movies = vec![movie("1", "Spectre", 2015)];
        let mut server = FakeServer::new(movies.clone());
        server.collections = vec![
            CollectionSummary {
                rating_key: "77".to_string(),
                title: "Marvel".to_string(),
                child_count: 30,
            },
            CollectionSummary {
                rating_key: "78".to_string(),
                title: "James Bond".to_string(),
                child_count: 12,
            },
        ];

        let report = CollectionReconciler::new(&server, &server.section, "James Bond")
            .reconcile(&match_set(&movies))
            .await
            .unwrap();

        let existing = report.existing.as_ref().unwrap();
        assert_eq!(existing.rating_key, "78");
        assert_eq!(existing.child_count, 12);
        assert_eq!(report.added_count(), 1);
    }

    #[tokio::test]
    async fn test_other_collection_tags_survive() {
        let mut connery = movie("4417", "Goldfinger", 1964);
        connery.collections = vec!["Sean Connery".to_string(), "007 Box Set".to_string()];
        let server = FakeServer::new(vec![connery.clone()]);

        // Search listings can come back without tags
        let listed = movie("4417", "Goldfinger", 1964);
        let report = CollectionReconciler::new(&server, &server.section, "James Bond")
            .reconcile(&match_set(&[listed]))
            .await
            .unwrap();

        assert_eq!(report.added_count(), 1);
        assert_eq!(
            server.tags_of("4417"),
            vec!["Sean Connery", "007 Box Set", "James Bond"]
        );
    }

    #[tokio::test]
    async fn test_tag_match_is_case_sensitive() {
        let mut lower = movie("1", "Live and Let Die", 1973);
        lower.collections = vec!["james bond".to_string()];
        let server = FakeServer::new(vec![lower.clone()]);

        let report = CollectionReconciler::new(&server, &server.section, "James Bond")
            .reconcile(&match_set(&[lower]))
            .await
            .unwrap();

        assert_eq!(report.added_count(), 1);
        assert_eq!(server.tags_of("1"), vec!["james bond", "James Bond"]);
    }
}
