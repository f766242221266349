use super::search_ui::SearchUI;
use super::{open_session, validate_config};
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use media_collection_config::Config;
use media_collection_core::{default_probes, run_probes, ReferenceList, TitleMatcher};
use media_collection_models::{MovieItem, ServerIdentity};
use media_collection_sources::{MediaServer, SourceError};
use std::future::Future;

/// How many probe hits to list before summarizing the rest
const PROBE_PREVIEW: usize = 5;
const SUMMARY_PREVIEW_CHARS: usize = 100;

pub async fn run_investigate<S, F, Fut>(config: &Config, output: &Output, connect: F) -> Result<()>
where
    S: MediaServer,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<(S, ServerIdentity), SourceError>>,
{
    tracing::debug!("Investigate command started");
    validate_config(config, output)?;

    let session = open_session(config, output, connect).await?;
    let references = ReferenceList::official();

    output.println("");
    output.heading("SEARCHING FOR KNOWN BOND MOVIE TITLES");

    let ui = SearchUI::new(references.len(), output);
    if let Some(first) = references.titles().first() {
        ui.searching(first);
    }
    let outcome = TitleMatcher::new(&session.server, &session.section, config.collection.match_key)
        .run_with(&references, |idx, result| {
            if !result.hits.is_empty() {
                ui.println(|| {
                    output.success(format!("FOUND: {}", result.reference));
                    for movie in &result.hits {
                        output.println(format!("    → {}", movie));
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
    output.heading("SUMMARY");
    output.println(format!("Library size: {} movies", session.movie_count));
    output.println(format!(
        "Found: {} Bond movies ({} unique)",
        outcome.total_hits(),
        outcome.matches.len()
    ));
    output.println(format!("Not found: {} Bond movies", outcome.not_found.len()));

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Reference title").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Library matches").add_attribute(comfy_table::Attribute::Bold),
    ]);
    for result in &outcome.per_title {
        let matches = if result.hits.is_empty() {
            "-".to_string()
        } else {
            result
                .hits
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        table.add_row(vec![Cell::new(&result.reference), Cell::new(matches)]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    output.table(&table);

    if !outcome.not_found.is_empty() {
        output.println("\nMissing from library:");
        for title in &outcome.not_found {
            output.item(title);
        }
    }

    output.println("");
    output.heading("TESTING SEARCH METHODS");
    for probe in run_probes(&session.server, &session.section, &default_probes()).await {
        match probe.result {
            Ok(hits) => {
                output.println(format!("\n{}: Found {} results", probe.query, hits.len()));
                for movie in hits.iter().take(PROBE_PREVIEW) {
                    output.item(movie.to_string());
                }
                if hits.len() > PROBE_PREVIEW {
                    output.println(format!("  ... and {} more", hits.len() - PROBE_PREVIEW));
                }
            }
            Err(e) => output.println(format!("\n{}: ERROR - {}", probe.query, e)),
        }
    }

    output.println("");
    output.heading("CHECKING MOVIE METADATA");
    if let Some(first) = outcome.matches.iter().next() {
        match session.server.metadata(&first.rating_key).await {
            Ok(sample) => print_sample(&sample, output),
            Err(e) if e.is_not_found() => output.warn(format!("{} is no longer in the library", first)),
            Err(e) => return Err(e.into()),
        }
    } else {
        output.info("No matched movies to inspect");
    }

    Ok(())
}

fn print_sample(sample: &MovieItem, output: &Output) {
    output.println(format!("\nSample movie: {}", sample.title));
    output.println(format!(
        "  Year: {}",
        sample.year.map(|y| y.to_string()).unwrap_or_else(|| "N/A".to_string())
    ));
    output.println(format!(
        "  Summary: {}...",
        sample
            .summary
            .as_deref()
            .map(|s| truncate_chars(s, SUMMARY_PREVIEW_CHARS))
            .unwrap_or("N/A")
    ));
    output.println(format!("  Collections: {:?}", sample.collections));
    output.println(format!("  Genres: {:?}", sample.genres));

    if !sample.collections.is_empty() {
        output.println("");
        output.warn("This movie already has collection metadata!");
    }
}

/// First `max` characters of `s`, never splitting a character
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{configured, fake_identity};
    use media_collection_config::ConfigError;
    use media_collection_core::fake::{movie, FakeServer};
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_missing_token_makes_no_requests() {
        let server = FakeServer::new(vec![movie("1", "Dr. No", 1962)]);
        let requests = server.requests.clone();

        let result = run_investigate(&Config::default(), &Output::new(true), move || async move {
            Ok((server, fake_identity()))
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.downcast_ref::<ConfigError>(), Some(&ConfigError::MissingToken));
        assert_eq!(requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_library_exits_without_searching() {
        let server = FakeServer::new(vec![movie("1", "Dr. No", 1962)]);
        let searches = server.searches.clone();

        let result = run_investigate(&configured("Bond Films"), &Output::new(true), move || async move {
            Ok((server, fake_identity()))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(searches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_investigate_runs_titles_then_probes_without_tagging() {
        let server = FakeServer::new(vec![movie("1", "Dr. No", 1962), movie("2", "Skyfall", 2012)]);
        let searches = server.searches.clone();
        let adds = server.adds.clone();

        run_investigate(&configured("Movies"), &Output::new(true), move || async move {
            Ok((server, fake_identity()))
        })
        .await
        .unwrap();

        // 25 reference titles plus 5 exploratory searches
        assert_eq!(searches.load(Ordering::SeqCst), 30);
        assert_eq!(adds.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("Goldfinger", 4), "Gold");
        assert_eq!(truncate_chars("Bond", 100), "Bond");
        assert_eq!(truncate_chars("Señor Bond", 3), "Señ");
        assert_eq!(truncate_chars("", 5), "");
    }
}
