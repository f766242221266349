use super::search_ui::SearchUI;
use super::{open_session, validate_config};
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use media_collection_config::Config;
use media_collection_core::{CollectionReconciler, ReconcileReport, ReferenceList, TagStatus, TitleMatcher};
use media_collection_models::ServerIdentity;
use media_collection_sources::{MediaServer, SourceError};
use std::future::Future;

pub async fn run_create<S, F, Fut>(config: &Config, dry_run: bool, output: &Output, connect: F) -> Result<()>
where
    S: MediaServer,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<(S, ServerIdentity), SourceError>>,
{
    tracing::debug!(dry_run, "Create command started");

    output.heading("PLEX JAMES BOND COLLECTION CREATOR");
    validate_config(config, output)?;

    output.println("\nConfiguration:");
    output.println(format!("  Server URL: {}", config.base_url()));
    output.println(format!("  Library: {}", config.plex.library));
    output.println(format!("  Collection: {}", config.collection.name));
    output.println(format!("  Token: {}", config.masked_token()));
    output.println(format!("  Match by: {}", config.collection.match_key));
    if dry_run {
        output.warn("Dry run: no changes will be made");
    }
    output.println("");

    let session = open_session(config, output, connect).await?;
    let references = ReferenceList::for_config(config.collection.include_non_eon);

    output.println("\nSearching for James Bond movies by title...");
    output.println(format!("  Checking {} known Bond movie titles...", references.len()));

    let ui = SearchUI::new(references.len(), output);
    if let Some(first) = references.titles().first() {
        ui.searching(first);
    }
    let outcome = TitleMatcher::new(&session.server, &session.section, config.collection.match_key)
        .run_with(&references, |idx, result| {
            if !result.added.is_empty() {
                ui.println(|| {
                    for movie in &result.added {
                        output.success(format!("  Found: {}", movie));
                    }
                });
            }
            ui.advance();
            if let Some(next) = references.titles().get(idx + 1) {
                ui.searching(next);
            }
        })
        .await?;
    ui.finish();

    output.println("");
    output.heading("SEARCH RESULTS");
    output.success(format!(
        "Found {} Bond movies in your library (one per {})",
        outcome.matches.len(),
        outcome.matches.key()
    ));

    if !outcome.not_found.is_empty() {
        output.println("");
        output.info(format!("{} Bond movies not in your library:", outcome.not_found.len()));
        for title in &outcome.not_found {
            output.item(title);
        }
    }

    if outcome.matches.is_empty() {
        output.println("");
        output.error("No James Bond movies found in your library!");
        return Err(eyre!("No James Bond movies found in library '{}'", session.section.title));
    }

    let collection = config.collection.name.as_str();
    output.println(format!("\nCreating/updating collection: {}...", collection));

    let reconciler = CollectionReconciler::new(&session.server, &session.section, collection).dry_run(dry_run);
    let existing = match reconciler.existing_collection().await {
        Ok(existing) => existing,
        Err(e) => {
            output.error(format!("Failed to create collection: {}", e));
            return Err(e.into());
        }
    };
    if let Some(existing) = &existing {
        output.println(format!("  Collection '{}' already exists", existing.title));
        output.println(format!("  Current items in collection: {}", existing.child_count));
    }

    let report = reconciler
        .tag_all(&outcome.matches, existing, |tagged| match &tagged.status {
            TagStatus::Added => output.success(format!("  Added: {}", tagged.movie.title)),
            TagStatus::AlreadyTagged => {
                output.println(format!("  - Already in collection: {}", tagged.movie.title))
            }
            TagStatus::WouldAdd => output.println(format!("  • Would add: {}", tagged.movie.title)),
            TagStatus::Failed(reason) => {
                output.error(format!("  Failed to add {}: {}", tagged.movie.title, reason))
            }
        })
        .await;

    print_summary(&report, outcome.matches.len(), output);
    output.println("\nYou can now find your collection at:");
    output.println(format!("  {}", collections_web_url(config.base_url(), &session.identity.machine_identifier)));

    Ok(())
}

fn print_summary(report: &ReconcileReport, matched: usize, output: &Output) {
    output.println("");
    if report.dry_run {
        output.success(format!("Dry run for collection '{}' complete", report.collection));
        output.println(format!("  Movies that would be added: {}", report.would_add_count()));
    } else {
        output.success(format!("Collection '{}' created/updated!", report.collection));
        output.println(format!("  Total movies added: {}", report.added_count()));
    }
    output.println(format!("  Already in collection: {}", report.already_tagged_count()));
    output.println(format!("  Total matched movies: {}", matched));

    if report.failed_count() > 0 {
        output.warn(format!("{} movies could not be updated:", report.failed_count()));
        for (movie, reason) in report.failures() {
            output.item(format!("{}: {}", movie, reason));
        }
    }
}

/// Plex Web link to the server's collections view
fn collections_web_url(base_url: &str, machine_identifier: &str) -> String {
    format!(
        "{}/web/index.html#!/server/{}/details?key={}",
        base_url.trim_end_matches('/'),
        machine_identifier,
        urlencoding::encode("/library/collections/")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{configured, fake_identity};
    use media_collection_config::ConfigError;
    use media_collection_core::fake::{movie, FakeServer};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_missing_token_stops_before_connecting() {
        let server = FakeServer::new(vec![movie("1", "Dr. No", 1962)]);
        let requests = server.requests.clone();
        let connected = AtomicBool::new(false);
        let flag = &connected;

        let result = run_create(&Config::default(), false, &Output::new(true), move || async move {
            flag.store(true, Ordering::SeqCst);
            Ok((server, fake_identity()))
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.downcast_ref::<ConfigError>(), Some(&ConfigError::MissingToken));
        assert!(!connected.load(Ordering::SeqCst));
        assert_eq!(requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_library_exits_without_searching() {
        let server = FakeServer::new(vec![movie("1", "Dr. No", 1962)]);
        let searches = server.searches.clone();
        let adds = server.adds.clone();

        let result = run_create(&configured("Films"), false, &Output::new(true), move || async move {
            Ok((server, fake_identity()))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(searches.load(Ordering::SeqCst), 0);
        assert_eq!(adds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_tags_matches() {
        let mut goldfinger = movie("2", "Goldfinger", 1964);
        goldfinger.collections = vec!["James Bond".to_string()];
        let server = FakeServer::new(vec![movie("1", "Dr. No", 1962), goldfinger, movie("3", "Heat", 1995)]);
        let searches = server.searches.clone();
        let adds = server.adds.clone();

        run_create(&configured("Movies"), false, &Output::new(true), move || async move {
            Ok((server, fake_identity()))
        })
        .await
        .unwrap();

        assert_eq!(searches.load(Ordering::SeqCst), 27);
        assert_eq!(adds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_matches_is_an_error() {
        let server = FakeServer::new(vec![movie("1", "Heat", 1995)]);
        let adds = server.adds.clone();

        let result = run_create(&configured("Movies"), false, &Output::new(true), move || async move {
            Ok((server, fake_identity()))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(adds.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_collections_web_url() {
        assert_eq!(
            collections_web_url("https://plex.example.com/", "abc123"),
            "https://plex.example.com/web/index.html#!/server/abc123/details?key=%2Flibrary%2Fcollections%2F"
        );
    }
}
