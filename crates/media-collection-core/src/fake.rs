//! In-memory `MediaServer` for tests.
//!
//! Tag edits replace the movie's whole tag list with the one derived from the
//! item passed in, the way a Plex tag edit does.

use async_trait::async_trait;
use media_collection_models::{CollectionSummary, LibrarySection, MovieItem, ServerIdentity};
use media_collection_sources::{MediaServer, SearchQuery, SourceError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory library that records mutations
pub struct FakeServer {
    pub section: LibrarySection,
    /// Sections listed after `section`
    pub other_sections: Vec<LibrarySection>,
    movies: Vec<MovieItem>,
    tags: Mutex<HashMap<String, Vec<String>>>,
    pub collections: Vec<CollectionSummary>,
    pub failing_searches: HashSet<String>,
    pub failing_adds: HashSet<String>,
    pub failing_reads: HashSet<String>,
    /// Shared so callers can keep reading them after the server is moved
    pub searches: Arc<AtomicUsize>,
    pub adds: Arc<AtomicUsize>,
    /// Every trait call, including `identity` and `sections`
    pub requests: Arc<AtomicUsize>,
}

pub fn movie(rating_key: &str, title: &str, year: u32) -> MovieItem {
    MovieItem {
        rating_key: rating_key.to_string(),
        title: title.to_string(),
        year: Some(year),
        summary: None,
        collections: Vec::new(),
        genres: Vec::new(),
        added_at: None,
    }
}

impl FakeServer {
    pub fn new(movies: Vec<MovieItem>) -> Self {
        let tags = movies
            .iter()
            .map(|m| (m.rating_key.clone(), m.collections.clone()))
            .collect();
        Self {
            section: LibrarySection {
                key: "1".to_string(),
                title: "Movies".to_string(),
                type_: "movie".to_string(),
            },
            other_sections: Vec::new(),
            movies,
            tags: Mutex::new(tags),
            collections: Vec::new(),
            failing_searches: HashSet::new(),
            failing_adds: HashSet::new(),
            failing_reads: HashSet::new(),
            searches: Arc::new(AtomicUsize::new(0)),
            adds: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn tags_of(&self, rating_key: &str) -> Vec<String> {
        self.tags
            .lock()
            .unwrap()
            .get(rating_key)
            .cloned()
            .unwrap_or_default()
    }

    fn with_current_tags(&self, movie: &MovieItem) -> MovieItem {
        MovieItem {
            collections: self.tags_of(&movie.rating_key),
            ..movie.clone()
        }
    }

    fn request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MediaServer for FakeServer {
    fn source_name(&self) -> &str {
        "fake"
    }

    async fn identity(&self) -> Result<ServerIdentity, SourceError> {
        self.request();
        Ok(ServerIdentity {
            friendly_name: "Fake".to_string(),
            machine_identifier: "fake-machine".to_string(),
            version: None,
        })
    }

    async fn sections(&self) -> Result<Vec<LibrarySection>, SourceError> {
        self.request();
        let mut sections = vec![self.section.clone()];
        sections.extend(self.other_sections.iter().cloned());
        Ok(sections)
    }

    async fn movie_count(&self, _section: &LibrarySection) -> Result<usize, SourceError> {
        self.request();
        Ok(self.movies.len())
    }

    async fn search(
        &self,
        _section: &LibrarySection,
        query: &SearchQuery,
    ) -> Result<Vec<MovieItem>, SourceError> {
        self.request();
        self.searches.fetch_add(1, Ordering::SeqCst);
        let (needle, exact) = match query {
            SearchQuery::Title(t) => (t.to_lowercase(), true),
            SearchQuery::Text(t) => (t.to_lowercase(), false),
        };
        if self.failing_searches.contains(&needle) {
            return Err(SourceError::new(format!("search for {} failed", needle)));
        }
        Ok(self
            .movies
            .iter()
            .filter(|m| {
                let title = m.title.to_lowercase();
                if exact {
                    title == needle
                } else {
                    title.contains(&needle)
                }
            })
            .map(|m| self.with_current_tags(m))
            .collect())
    }

    async fn collections(&self, _section: &LibrarySection) -> Result<Vec<CollectionSummary>, SourceError> {
        self.request();
        Ok(self.collections.clone())
    }

    async fn metadata(&self, rating_key: &str) -> Result<MovieItem, SourceError> {
        self.request();
        if self.failing_reads.contains(rating_key) {
            return Err(SourceError::new("metadata read failed"));
        }
        self.movies
            .iter()
            .find(|m| m.rating_key == rating_key)
            .map(|m| self.with_current_tags(m))
            .ok_or_else(|| SourceError::ItemNotFound(rating_key.to_string()))
    }

    async fn add_collection(
        &self,
        _section: &LibrarySection,
        movie: &MovieItem,
        collection: &str,
    ) -> Result<(), SourceError> {
        self.request();
        if self.failing_adds.contains(&movie.rating_key) {
            return Err(SourceError::new("HTTP 500"));
        }
        self.adds.fetch_add(1, Ordering::SeqCst);
        let mut sent = movie.collections.clone();
        if !sent.iter().any(|t| t == collection) {
            sent.push(collection.to_string());
        }
        self.tags.lock().unwrap().insert(movie.rating_key.clone(), sent);
        Ok(())
    }
}
