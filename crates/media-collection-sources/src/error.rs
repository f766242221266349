use media_collection_models::LibrarySection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Invalid token format: {0}")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Plex rejected the token (401 Unauthorized) for {endpoint}")]
    Unauthorized { endpoint: String },

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("Unexpected response from {endpoint}: {message}")]
    Parse { endpoint: String, message: String },

    /// The named section does not exist; carries what does exist so callers can report it
    #[error("Library '{name}' not found")]
    LibraryNotFound {
        name: String,
        available: Vec<LibrarySection>,
    },

    #[error("Metadata item {0} not found")]
    ItemNotFound(String),

    #[error("{0}")]
    Other(String),
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Short label for grouping failures in summaries
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidToken(_) | Self::Unauthorized { .. } => "auth",
            Self::ClientBuild(_) | Self::Request { .. } => "request",
            Self::Status { .. } => "http-status",
            Self::Parse { .. } => "parse",
            Self::LibraryNotFound { .. } | Self::ItemNotFound(_) => "not-found",
            Self::Other(_) => "other",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::LibraryNotFound { .. } | Self::ItemNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_and_messages() {
        let err = SourceError::ItemNotFound("42".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.category(), "not-found");
        assert_eq!(err.to_string(), "Metadata item 42 not found");

        let err = SourceError::new("boom");
        assert!(!err.is_not_found());
        assert_eq!(err.category(), "other");
        assert_eq!(err.to_string(), "boom");

        let err = SourceError::Unauthorized {
            endpoint: "http://plex/".to_string(),
        };
        assert_eq!(err.category(), "auth");
    }
}
