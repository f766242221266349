pub mod create;
pub mod guidance;
pub mod investigate;
pub mod search_ui;

use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use media_collection_config::{Config, ConfigError, MatchKey};
use media_collection_models::{LibrarySection, ServerIdentity};
use media_collection_sources::{MediaServer, PlexServer, SourceError};
use std::future::Future;
use tracing::info;

/// Command-line values that take precedence over file and environment settings
#[derive(Debug, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub library: Option<String>,
    pub collection: Option<String>,
    pub match_key: Option<MatchKey>,
    pub official_only: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.plex.url = url.clone();
        }
        if let Some(library) = &self.library {
            config.plex.library = library.clone();
        }
        if let Some(collection) = &self.collection {
            config.collection.name = collection.clone();
        }
        if let Some(match_key) = self.match_key {
            config.collection.match_key = match_key;
        }
        if self.official_only {
            config.collection.include_non_eon = false;
        }
    }
}

/// Validate configuration before anything touches the network.
/// A missing token prints the token instructions.
pub fn validate_config(config: &Config, output: &Output) -> Result<()> {
    match config.validate() {
        Ok(()) => Ok(()),
        Err(ConfigError::MissingToken) => {
            guidance::print_missing_token(output);
            Err(ConfigError::MissingToken.into())
        }
        Err(e) => {
            output.error(e.to_string());
            Err(e.into())
        }
    }
}

/// A connected server with its resolved movie section
pub struct Session<S> {
    pub server: S,
    pub identity: ServerIdentity,
    pub section: LibrarySection,
    pub movie_count: usize,
}

/// Connect to the configured Plex server and verify the token
pub async fn connect_plex(config: &Config) -> Result<(PlexServer, ServerIdentity), SourceError> {
    PlexServer::connect(config.base_url(), &config.plex.token).await
}

/// Connect through `connect`, then resolve the configured library section.
/// When the section is missing, lists the available ones and fails without searching.
pub async fn open_session<S, F, Fut>(config: &Config, output: &Output, connect: F) -> Result<Session<S>>
where
    S: MediaServer,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<(S, ServerIdentity), SourceError>>,
{
    output.println(format!("Connecting to Plex server at {}...", config.base_url()));
    let (server, identity) = match connect().await {
        Ok(connected) => connected,
        Err(e) => {
            output.error(format!("Failed to connect to Plex server: {}", e));
            return Err(e.into());
        }
    };
    info!(source = server.source_name(), server = %identity.friendly_name, "Session opened");
    output.success(format!("Connected to: {}", identity.friendly_name));

    output.println(format!("\nSearching for library: {}...", config.plex.library));
    let section = match server.section(&config.plex.library).await {
        Ok(section) => section,
        Err(SourceError::LibraryNotFound { name, available }) => {
            output.error(format!("Library '{}' not found!", name));
            output.println("\nAvailable libraries:");
            for section in &available {
                output.item(format!("{} (type: {})", section.title, section.type_));
            }
            return Err(eyre!("Library '{}' not found", name));
        }
        Err(e) => return Err(e.into()),
    };

    if !section.is_movie_section() {
        output.warn(format!(
            "Library '{}' is a '{}' library; searches only return movies",
            section.title, section.type_
        ));
    }

    let movie_count = server.movie_count(&section).await?;
    output.success(format!("Found library: {}", section.title));
    output.println(format!("  Total movies in library: {}", movie_count));

    Ok(Session {
        server,
        identity,
        section,
        movie_count,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use media_collection_core::fake::{movie, FakeServer};
    use std::sync::atomic::Ordering;

    pub(crate) fn fake_identity() -> ServerIdentity {
        ServerIdentity {
            friendly_name: "Fake".to_string(),
            machine_identifier: "fake-machine".to_string(),
            version: None,
        }
    }

    pub(crate) fn configured(library: &str) -> Config {
        let mut config = Config::default();
        config.plex.token = "tok".to_string();
        config.plex.library = library.to_string();
        config
    }

    #[tokio::test]
    async fn test_session_resolves_section_case_insensitively() {
        let server = FakeServer::new(vec![movie("1", "Dr. No", 1962), movie("2", "Heat", 1995)]);
        let output = Output::new(true);

        let session = open_session(&configured("movies"), &output, move || async move {
            Ok((server, fake_identity()))
        })
        .await
        .unwrap();

        assert_eq!(session.section.key, "1");
        assert_eq!(session.movie_count, 2);
        assert_eq!(session.server.searches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_library_fails_before_any_search() {
        let mut server = FakeServer::new(vec![movie("1", "Dr. No", 1962)]);
        server.other_sections.push(LibrarySection {
            key: "2".to_string(),
            title: "TV Shows".to_string(),
            type_: "show".to_string(),
        });
        let searches = server.searches.clone();
        let output = Output::new(true);

        let result = open_session(&configured("Films"), &output, move || async move {
            Ok((server, fake_identity()))
        })
        .await;

        let err = result.err().unwrap();
        assert!(err.to_string().contains("Films"));
        assert_eq!(searches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_connect_failure_is_reported() {
        let output = Output::new(true);
        let result = open_session(&configured("Movies"), &output, || async {
            Err::<(FakeServer, ServerIdentity), _>(SourceError::Unauthorized {
                endpoint: "/".to_string(),
            })
        })
        .await;

        let err = result.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = Config::default();
        config.plex.token = "tok".to_string();

        let overrides = Overrides {
            url: Some("http://127.0.0.1:32400".to_string()),
            library: Some("Films".to_string()),
            collection: Some("007".to_string()),
            match_key: Some(MatchKey::Title),
            official_only: true,
        };
        overrides.apply(&mut config);

        assert_eq!(config.plex.url, "http://127.0.0.1:32400");
        assert_eq!(config.plex.library, "Films");
        assert_eq!(config.collection.name, "007");
        assert_eq!(config.collection.match_key, MatchKey::Title);
        assert!(!config.collection.include_non_eon);
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let mut config = Config::default();
        Overrides::default().apply(&mut config);
        assert_eq!(config.plex.library, "Movies");
        assert!(config.collection.include_non_eon);
    }

    #[test]
    fn test_missing_token_fails_validation() {
        let config = Config::default();
        let output = Output::new(true);
        let err = validate_config(&config, &output).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }
}
