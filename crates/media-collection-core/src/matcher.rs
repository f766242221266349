use crate::reference::ReferenceList;
use media_collection_config::MatchKey;
use media_collection_models::{LibrarySection, MovieItem};
use media_collection_sources::{MediaServer, SearchQuery, SourceError};
use std::collections::HashSet;
use tracing::{debug, info};

/// Matched movies in first-seen order, deduplicated by the chosen key
#[derive(Debug, Clone)]
pub struct MatchSet {
    key: MatchKey,
    entries: Vec<MovieItem>,
    seen: HashSet<String>,
}

impl MatchSet {
    pub fn new(key: MatchKey) -> Self {
        Self {
            key,
            entries: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn key(&self) -> MatchKey {
        self.key
    }

    pub fn key_of<'m>(&self, movie: &'m MovieItem) -> &'m str {
        match self.key {
            MatchKey::RatingKey => &movie.rating_key,
            MatchKey::Title => &movie.title,
        }
    }

    /// Returns false when an entry with the same key is already present
    pub fn insert(&mut self, movie: MovieItem) -> bool {
        let key = self.key_of(&movie).to_string();
        if !self.seen.insert(key) {
            return false;
        }
        self.entries.push(movie);
        true
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    #[cfg(test)]
    pub(crate) fn get(&self, key: &str) -> Option<&MovieItem> {
        self.entries.iter().find(|m| self.key_of(m) == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MovieItem> {
        self.entries.iter()
    }
}

/// Search result for one reference title
#[derive(Debug, Clone)]
pub struct TitleHits {
    pub reference: String,
    /// Every item the search returned
    pub hits: Vec<MovieItem>,
    /// The subset of `hits` that entered the match set
    pub added: Vec<MovieItem>,
}

#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub matches: MatchSet,
    pub per_title: Vec<TitleHits>,
    pub not_found: Vec<String>,
}

impl MatchOutcome {
    /// Total search hits before deduplication
    pub fn total_hits(&self) -> usize {
        self.per_title.iter().map(|t| t.hits.len()).sum()
    }

    /// Reference titles that produced at least one hit
    #[cfg(test)]
    pub(crate) fn found_references(&self) -> impl Iterator<Item = &str> {
        self.per_title
            .iter()
            .filter(|t| !t.hits.is_empty())
            .map(|t| t.reference.as_str())
    }
}

/// Searches a library section for each reference title in order.
///
/// Search failures are not caught; the first one aborts the run.
pub struct TitleMatcher<'a, S: MediaServer + ?Sized> {
    server: &'a S,
    section: &'a LibrarySection,
    key: MatchKey,
}

impl<'a, S: MediaServer + ?Sized> TitleMatcher<'a, S> {
    pub fn new(server: &'a S, section: &'a LibrarySection, key: MatchKey) -> Self {
        Self { server, section, key }
    }

    pub async fn run(&self, references: &ReferenceList) -> Result<MatchOutcome, SourceError> {
        self.run_with(references, |_, _| {}).await
    }

    /// Like `run`, calling `on_title` with the position and result of each title as it completes
    pub async fn run_with<F>(&self, references: &ReferenceList, mut on_title: F) -> Result<MatchOutcome, SourceError>
    where
        F: FnMut(usize, &TitleHits),
    {
        let mut matches = MatchSet::new(self.key);
        let mut per_title = Vec::with_capacity(references.len());
        let mut not_found = Vec::new();

        for (idx, reference) in references.iter().enumerate() {
            let hits = self
                .server
                .search(self.section, &SearchQuery::title(reference))
                .await?;

            let mut added = Vec::new();
            if hits.is_empty() {
                debug!(reference, "No match");
                not_found.push(reference.to_string());
            } else {
                for movie in &hits {
                    if matches.insert(movie.clone()) {
                        debug!(reference, matched = %movie, rating_key = %movie.rating_key, "Matched");
                        added.push(movie.clone());
                    }
                }
            }

            let result = TitleHits {
                reference: reference.to_string(),
                hits,
                added,
            };
            on_title(idx, &result);
            per_title.push(result);
        }

        info!(
            references = references.len(),
            matched = matches.len(),
            not_found = not_found.len(),
            "Title matching complete"
        );

        Ok(MatchOutcome {
            matches,
            per_title,
            not_found,
        })
    }
}
