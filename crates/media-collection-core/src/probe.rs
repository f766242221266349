use media_collection_models::{LibrarySection, MovieItem};
use media_collection_sources::{MediaServer, SearchQuery, SourceError};
use tracing::debug;

/// Exploratory searches used to see how the server matches loose Bond queries
pub fn default_probes() -> Vec<SearchQuery> {
    vec![
        SearchQuery::title("James Bond"),
        SearchQuery::title("007"),
        SearchQuery::title("Bond"),
        SearchQuery::text("Bond"),
        SearchQuery::text("007"),
    ]
}

#[derive(Debug)]
pub struct ProbeResult {
    pub query: SearchQuery,
    pub result: Result<Vec<MovieItem>, SourceError>,
}

/// Run each probe in turn. A failing probe is recorded and the rest still run.
pub async fn run_probes<S: MediaServer + ?Sized>(
    server: &S,
    section: &LibrarySection,
    probes: &[SearchQuery],
) -> Vec<ProbeResult> {
    let mut results = Vec::with_capacity(probes.len());
    for query in probes {
        let result = server.search(section, query).await;
        match &result {
            Ok(hits) => debug!(probe = %query, hits = hits.len(), "Probe finished"),
            Err(e) => debug!(probe = %query, error = %e, "Probe failed"),
        }
        results.push(ProbeResult {
            query: query.clone(),
            result,
        });
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{movie, FakeServer};

    #[tokio::test]
    async fn test_probe_failures_do_not_stop_others() {
        let mut server = FakeServer::new(vec![
            movie("1", "Bond Girls Are Forever", 2002),
            movie("2", "Skyfall", 2012),
        ]);
        server.failing_searches.insert("007".to_string());

        let results = run_probes(&server, &server.section, &default_probes()).await;

        assert_eq!(results.len(), 5);
        assert!(results[0].result.as_ref().unwrap().is_empty());
        assert!(results[1].result.is_err());
        // The fake title filter is exact, so a longer title does not match
        assert!(results[2].result.as_ref().unwrap().is_empty());
        assert_eq!(results[3].result.as_ref().unwrap().len(), 1);
        assert!(results[4].result.is_err());
        assert_eq!(results[3].query, SearchQuery::text("Bond"));
    }
}
