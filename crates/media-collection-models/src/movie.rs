use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A movie as returned by a library search or metadata lookup.
///
/// `rating_key` is the server's stable identifier for the item. Titles are
/// display metadata and may repeat across distinct films.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieItem {
    pub rating_key: String,
    pub title: String,
    pub year: Option<u32>,
    pub summary: Option<String>,
    /// Collection tag strings currently applied to the item
    #[serde(default)]
    pub collections: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub added_at: Option<DateTime<Utc>>,
}

impl MovieItem {
    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.iter().any(|tag| tag == name)
    }
}

impl fmt::Display for MovieItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{} (unknown year)", self.title),
        }
    }
}
