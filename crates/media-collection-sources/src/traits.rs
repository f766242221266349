use crate::error::SourceError;
use async_trait::async_trait;
use media_collection_models::{CollectionSummary, LibrarySection, MovieItem, ServerIdentity};
use std::fmt;

/// A library query. `Title` filters on the title field; `Text` is the
/// server's free-text section search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    Title(String),
    Text(String),
}

impl SearchQuery {
    pub fn title(value: impl Into<String>) -> Self {
        Self::Title(value.into())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchQuery::Title(value) => write!(f, "title='{}'", value),
            SearchQuery::Text(value) => write!(f, "search('{}')", value),
        }
    }
}

#[async_trait]
pub trait MediaServer: Send + Sync {
    // Source metadata
    fn source_name(&self) -> &str;

    /// Root identity; also serves as the connection/authentication check
    async fn identity(&self) -> Result<ServerIdentity, SourceError>;

    // Library sections
    async fn sections(&self) -> Result<Vec<LibrarySection>, SourceError>;

    /// Find a section by title (case-insensitive, surrounding whitespace ignored).
    /// Fails with `SourceError::LibraryNotFound` listing every available section.
    async fn section(&self, name: &str) -> Result<LibrarySection, SourceError> {
        let sections = self.sections().await?;
        let wanted = name.trim().to_lowercase();
        match sections
            .iter()
            .find(|s| s.title.trim().to_lowercase() == wanted)
        {
            Some(section) => Ok(section.clone()),
            None => Err(SourceError::LibraryNotFound {
                name: name.to_string(),
                available: sections,
            }),
        }
    }

    async fn movie_count(&self, section: &LibrarySection) -> Result<usize, SourceError>;

    // Data retrieval
    async fn search(
        &self,
        section: &LibrarySection,
        query: &SearchQuery,
    ) -> Result<Vec<MovieItem>, SourceError>;
    async fn collections(&self, section: &LibrarySection) -> Result<Vec<CollectionSummary>, SourceError>;

    /// Full metadata for one item, including its current collection tags
    async fn metadata(&self, rating_key: &str) -> Result<MovieItem, SourceError>;

    // Data modification

    /// Tag `movie` with `collection`. `movie.collections` must hold the item's
    /// current tags (as returned by `metadata`); they are kept alongside the new one.
    async fn add_collection(
        &self,
        section: &LibrarySection,
        movie: &MovieItem,
        collection: &str,
    ) -> Result<(), SourceError>;
}
