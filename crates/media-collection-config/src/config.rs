use crate::error::ConfigError;
use crate::paths::PathManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const DEFAULT_PLEX_URL: &str = "https://plex.beveradb.com";
pub const DEFAULT_LIBRARY: &str = "Movies";
pub const DEFAULT_COLLECTION_NAME: &str = "James Bond";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub plex: PlexConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlexConfig {
    #[serde(default = "default_plex_url")]
    pub url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_library")]
    pub library: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(default = "default_collection_name")]
    pub name: String,
    /// Also search for the non-Eon productions (1967 Casino Royale, Never Say Never Again)
    #[serde(default = "default_true")]
    pub include_non_eon: bool,
    #[serde(default)]
    pub match_key: MatchKey,
}

/// How matched movies are deduplicated
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKey {
    /// Server-assigned rating key; distinct films sharing a title stay distinct
    #[default]
    RatingKey,
    /// Display title; films sharing a title collapse into one match
    Title,
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKey::RatingKey => write!(f, "rating key"),
            MatchKey::Title => write!(f, "title"),
        }
    }
}

fn default_plex_url() -> String {
    DEFAULT_PLEX_URL.to_string()
}

fn default_library() -> String {
    DEFAULT_LIBRARY.to_string()
}

fn default_collection_name() -> String {
    DEFAULT_COLLECTION_NAME.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for PlexConfig {
    fn default() -> Self {
        Self {
            url: default_plex_url(),
            token: String::new(),
            library: default_library(),
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: default_collection_name(),
            include_non_eon: default_true(),
            match_key: MatchKey::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file {}: {}", path.display(), e))?;
        config.plex.token = config.plex.token.trim().to_string();
        Ok(config)
    }

    /// Load configuration from an explicit file, or from the default config
    /// file when it exists, then apply environment overrides.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file just means built-in defaults.
    pub fn load(explicit: Option<&Path>, paths: &PathManager) -> anyhow::Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let default_file = paths.config_file();
                if default_file.exists() {
                    Self::load_from_file(&default_file)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Override fields from `PLEX_URL`, `PLEX_TOKEN`, `PLEX_LIBRARY` and
    /// `COLLECTION_NAME`. Values are trimmed; empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = get("PLEX_URL") {
            self.plex.url = url;
        }
        if let Some(token) = get("PLEX_TOKEN") {
            self.plex.token = token;
        }
        if let Some(library) = get("PLEX_LIBRARY") {
            self.plex.library = library;
        }
        if let Some(name) = get("COLLECTION_NAME") {
            self.collection.name = name;
        }
    }

    /// Checks everything that can be checked without touching the network.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plex.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }

        let url = self.plex.url.trim();
        let host = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"));
        match host {
            Some(rest) if !rest.trim_matches('/').is_empty() => {}
            _ => return Err(ConfigError::InvalidUrl(self.plex.url.clone())),
        }

        if self.plex.library.trim().is_empty() {
            return Err(ConfigError::EmptyLibrary);
        }
        if self.collection.name.trim().is_empty() {
            return Err(ConfigError::EmptyCollectionName);
        }

        Ok(())
    }

    /// Server URL without trailing slashes, ready for path joins
    pub fn base_url(&self) -> &str {
        self.plex.url.trim().trim_end_matches('/')
    }

    /// Token rendered for display, keeping only the last four characters
    pub fn masked_token(&self) -> String {
        let chars: Vec<char> = self.plex.token.chars().collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        format!("{}...{}", "*".repeat(10), tail)
    }
}
