use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibrarySection {
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub type_: String,
}

impl LibrarySection {
    pub fn is_movie_section(&self) -> bool {
        self.type_ == "movie"
    }
}

/// Identity reported by the server root endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerIdentity {
    pub friendly_name: String,
    pub machine_identifier: String,
    pub version: Option<String>,
}
