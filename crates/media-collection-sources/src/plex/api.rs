use crate::error::SourceError;
use chrono::{DateTime, TimeZone, Utc};
use media_collection_models::{CollectionSummary, LibrarySection, MovieItem, ServerIdentity};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, trace};

const CLIENT_IDENTIFIER: &str = "bondcollect-cli";
const PRODUCT: &str = "bondcollect";

/// Plex library type filter for movies
const MOVIE_TYPE: &str = "1";

pub struct PlexHttpClient {
    client: Client,
}

impl PlexHttpClient {
    pub fn new(token: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-plex-token"),
                    reqwest::header::HeaderValue::from_str(token)?,
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-plex-client-identifier"),
                    reqwest::header::HeaderValue::from_static(CLIENT_IDENTIFIER),
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-plex-product"),
                    reqwest::header::HeaderValue::from_static(PRODUCT),
                );
                headers
            })
            .build()
            .map_err(SourceError::ClientBuild)?;

        Ok(Self { client })
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, SourceError> {
        debug!("Plex {} {} {:?}", method, url, query);
        let response = self
            .client
            .request(method, url)
            .query(query)
            .send()
            .await
            .map_err(|source| SourceError::Request {
                endpoint: url.to_string(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(SourceError::Unauthorized {
                endpoint: url.to_string(),
            }),
            status => Err(SourceError::Status {
                endpoint: url.to_string(),
                status,
            }),
        }
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, SourceError> {
        let response = self.send(Method::GET, url, query).await?;
        let json: Value = response.json().await.map_err(|e| SourceError::Parse {
            endpoint: url.to_string(),
            message: e.to_string(),
        })?;
        trace!("Plex response from {}: {}", url, json);
        Ok(json)
    }

    pub async fn get_identity(&self, server_url: &str) -> Result<ServerIdentity, SourceError> {
        let url = format!("{}/", server_url);
        let json = self.get_json(&url, &[]).await?;
        parse_identity(&json).ok_or_else(|| SourceError::Parse {
            endpoint: url,
            message: "missing machineIdentifier in MediaContainer".to_string(),
        })
    }

    pub async fn get_libraries(&self, server_url: &str) -> Result<Vec<LibrarySection>, SourceError> {
        let url = format!("{}/library/sections", server_url);
        let json = self.get_json(&url, &[]).await?;
        Ok(parse_sections(&json))
    }

    /// Number of movies in a section, without transferring the items
    pub async fn count_movies(&self, server_url: &str, library_key: &str) -> Result<usize, SourceError> {
        let url = format!("{}/library/sections/{}/all", server_url, library_key);
        let json = self
            .get_json(
                &url,
                &[
                    ("type", MOVIE_TYPE),
                    ("X-Plex-Container-Start", "0"),
                    ("X-Plex-Container-Size", "0"),
                ],
            )
            .await?;
        Ok(parse_total_size(&json))
    }

    pub async fn search_title(
        &self,
        server_url: &str,
        library_key: &str,
        title: &str,
    ) -> Result<Vec<MovieItem>, SourceError> {
        let url = format!("{}/library/sections/{}/all", server_url, library_key);
        let json = self
            .get_json(&url, &[("type", MOVIE_TYPE), ("title", title)])
            .await?;
        let movies = parse_movies(&json);
        debug!("Plex search title='{}': {} results", title, movies.len());
        Ok(movies)
    }

    pub async fn search_text(
        &self,
        server_url: &str,
        library_key: &str,
        text: &str,
    ) -> Result<Vec<MovieItem>, SourceError> {
        let url = format!("{}/library/sections/{}/search", server_url, library_key);
        let json = self
            .get_json(&url, &[("type", MOVIE_TYPE), ("query", text)])
            .await?;
        let movies = parse_movies(&json);
        debug!("Plex search query='{}': {} results", text, movies.len());
        Ok(movies)
    }

    pub async fn get_collections(
        &self,
        server_url: &str,
        library_key: &str,
    ) -> Result<Vec<CollectionSummary>, SourceError> {
        let url = format!("{}/library/sections/{}/collections", server_url, library_key);
        let json = self.get_json(&url, &[]).await?;
        Ok(parse_collections(&json))
    }

    pub async fn get_metadata_item(&self, server_url: &str, rating_key: &str) -> Result<MovieItem, SourceError> {
        // Accept both "123" and "/library/metadata/123"
        let id = rating_key.trim_start_matches("/library/metadata/").trim();
        let url = format!("{}/library/metadata/{}", server_url, id);
        let json = match self.get_json(&url, &[]).await {
            Err(SourceError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                return Err(SourceError::ItemNotFound(id.to_string()));
            }
            other => other?,
        };

        parse_movies(&json)
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::ItemNotFound(id.to_string()))
    }

    /// Replace one movie's collection tags with `tags`.
    ///
    /// Plex treats the indexed `collection[i].tag.tag` values as the complete
    /// new list, so `tags` must include every tag the movie should keep.
    pub async fn set_collection_tags(
        &self,
        server_url: &str,
        library_key: &str,
        rating_key: &str,
        tags: &[String],
    ) -> Result<(), SourceError> {
        let url = format!("{}/library/sections/{}/all", server_url, library_key);
        debug!("Plex set collections {:?} on item {}", tags, rating_key);
        let query = collection_edit_query(rating_key, tags);
        let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        self.send(Method::PUT, &url, &pairs).await?;
        Ok(())
    }
}

pub(crate) fn collection_edit_query(rating_key: &str, tags: &[String]) -> Vec<(String, String)> {
    let mut query = vec![
        ("type".to_string(), MOVIE_TYPE.to_string()),
        ("id".to_string(), rating_key.to_string()),
    ];
    for (idx, tag) in tags.iter().enumerate() {
        query.push((format!("collection[{}].tag.tag", idx), tag.clone()));
    }
    query.push(("collection.locked".to_string(), "1".to_string()));
    query
}

fn media_container(json: &Value) -> Option<&Value> {
    json.get("MediaContainer")
}

fn str_field(item: &Value, field: &str) -> Option<String> {
    match item.get(field)? {
        Value::String(s) => Some(s.clone()),
        // ratingKey is occasionally numeric
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn tag_list(item: &Value, field: &str) -> Vec<String> {
    item.get(field)
        .and_then(|v| v.as_array())
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t.get("tag").and_then(|s| s.as_str()))
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_timestamp(timestamp: Option<&Value>) -> Option<DateTime<Utc>> {
    timestamp
        .and_then(|t| t.as_i64())
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
}

pub(crate) fn parse_identity(json: &Value) -> Option<ServerIdentity> {
    let container = media_container(json)?;
    let machine_identifier = str_field(container, "machineIdentifier")?;
    let friendly_name = str_field(container, "friendlyName").unwrap_or_else(|| "Unknown".to_string());
    Some(ServerIdentity {
        friendly_name,
        machine_identifier,
        version: str_field(container, "version"),
    })
}

pub(crate) fn parse_sections(json: &Value) -> Vec<LibrarySection> {
    media_container(json)
        .and_then(|mc| mc.get("Directory"))
        .and_then(|d| d.as_array())
        .map(|dirs| {
            dirs.iter()
                .map(|dir| LibrarySection {
                    key: str_field(dir, "key").unwrap_or_default(),
                    title: str_field(dir, "title").unwrap_or_default(),
                    type_: str_field(dir, "type").unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn parse_movie(item: &Value) -> Option<MovieItem> {
    let rating_key = str_field(item, "ratingKey")?;
    let title = str_field(item, "title")?;

    Some(MovieItem {
        rating_key,
        title,
        year: item.get("year").and_then(|y| y.as_u64()).map(|y| y as u32),
        summary: str_field(item, "summary").filter(|s| !s.is_empty()),
        collections: tag_list(item, "Collection"),
        genres: tag_list(item, "Genre"),
        added_at: parse_timestamp(item.get("addedAt")),
    })
}

pub(crate) fn parse_movies(json: &Value) -> Vec<MovieItem> {
    let Some(items) = media_container(json)
        .and_then(|mc| mc.get("Metadata"))
        .and_then(|m| m.as_array())
    else {
        debug!("Plex: no Metadata array in response");
        return Vec::new();
    };

    let mut movies = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for item in items {
        match parse_movie(item) {
            Some(movie) => movies.push(movie),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!("Plex: skipped {} items without ratingKey or title", skipped);
    }
    movies
}

pub(crate) fn parse_collections(json: &Value) -> Vec<CollectionSummary> {
    media_container(json)
        .and_then(|mc| mc.get("Metadata"))
        .and_then(|m| m.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(CollectionSummary {
                        rating_key: str_field(item, "ratingKey")?,
                        title: str_field(item, "title")?,
                        child_count: item
                            .get("childCount")
                            .and_then(|c| c.as_u64())
                            .map(|c| c as u32)
                            .unwrap_or(0),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `totalSize` when the server reports it (paged requests), otherwise `size`
pub(crate) fn parse_total_size(json: &Value) -> usize {
    let Some(container) = media_container(json) else {
        return 0;
    };
    container
        .get("totalSize")
        .or_else(|| container.get("size"))
        .and_then(|s| s.as_u64())
        .map(|s| s as usize)
        .unwrap_or_else(|| {
            container
                .get("Metadata")
                .and_then(|m| m.as_array())
                .map(|m| m.len())
                .unwrap_or(0)
        })
}
