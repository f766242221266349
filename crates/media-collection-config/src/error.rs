use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No Plex token configured (set PLEX_TOKEN)")]
    MissingToken,

    #[error("Invalid Plex server URL '{0}': expected an http:// or https:// address")]
    InvalidUrl(String),

    #[error("Library name cannot be empty")]
    EmptyLibrary,

    #[error("Collection name cannot be empty")]
    EmptyCollectionName,
}
