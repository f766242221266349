pub mod config;
pub mod error;
pub mod paths;

pub use config::{CollectionConfig, Config, MatchKey, PlexConfig, DEFAULT_COLLECTION_NAME, DEFAULT_LIBRARY, DEFAULT_PLEX_URL};
pub use error::ConfigError;
pub use paths::{config_dir_override, PathManager};
