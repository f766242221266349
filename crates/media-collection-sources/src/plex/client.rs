use crate::error::SourceError;
use crate::plex::api::PlexHttpClient;
use crate::traits::{MediaServer, SearchQuery};
use async_trait::async_trait;
use media_collection_models::{CollectionSummary, LibrarySection, MovieItem, ServerIdentity};
use tracing::{debug, info};

/// A single Plex Media Server reached directly by URL
pub struct PlexServer {
    api: PlexHttpClient,
    server_url: String,
}

impl PlexServer {
    pub fn new(server_url: &str, token: &str) -> Result<Self, SourceError> {
        Ok(Self {
            api: PlexHttpClient::new(token)?,
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the client and verify the token against the server root
    pub async fn connect(server_url: &str, token: &str) -> Result<(Self, ServerIdentity), SourceError> {
        let server = Self::new(server_url, token)?;
        let identity = server.identity().await?;
        info!(
            server = %identity.friendly_name,
            machine_identifier = %identity.machine_identifier,
            "Connected to Plex"
        );
        Ok((server, identity))
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

#[async_trait]
impl MediaServer for PlexServer {
    fn source_name(&self) -> &str {
        "Plex"
    }

    async fn identity(&self) -> Result<ServerIdentity, SourceError> {
        self.api.get_identity(&self.server_url).await
    }

    async fn sections(&self) -> Result<Vec<LibrarySection>, SourceError> {
        let sections = self.api.get_libraries(&self.server_url).await?;
        debug!("Plex: {} library sections", sections.len());
        Ok(sections)
    }

    async fn movie_count(&self, section: &LibrarySection) -> Result<usize, SourceError> {
        self.api.count_movies(&self.server_url, &section.key).await
    }

    async fn search(
        &self,
        section: &LibrarySection,
        query: &SearchQuery,
    ) -> Result<Vec<MovieItem>, SourceError> {
        match query {
            SearchQuery::Title(title) => self.api.search_title(&self.server_url, &section.key, title).await,
            SearchQuery::Text(text) => self.api.search_text(&self.server_url, &section.key, text).await,
        }
    }

    async fn collections(&self, section: &LibrarySection) -> Result<Vec<CollectionSummary>, SourceError> {
        self.api.get_collections(&self.server_url, &section.key).await
    }

    async fn metadata(&self, rating_key: &str) -> Result<MovieItem, SourceError> {
        self.api.get_metadata_item(&self.server_url, rating_key).await
    }

    async fn add_collection(
        &self,
        section: &LibrarySection,
        movie: &MovieItem,
        collection: &str,
    ) -> Result<(), SourceError> {
        let mut tags: Vec<String> = Vec::with_capacity(movie.collections.len() + 1);
        for tag in movie.collections.iter().map(String::as_str).chain([collection]) {
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
        self.api
            .set_collection_tags(&self.server_url, &section.key, &movie.rating_key, &tags)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Accept one request, answer 200 and hand back its request line
    fn capture_one_request() -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut header = String::new();
            while reader.read_line(&mut header).unwrap() > 0 && header != "\r\n" {
                header.clear();
            }
            let mut stream = stream;
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .unwrap();
            tx.send(request_line.trim_end().to_string()).unwrap();
        });
        (url, rx)
    }

    fn movies_section() -> LibrarySection {
        LibrarySection {
            key: "1".to_string(),
            title: "Movies".to_string(),
            type_: "movie".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_collection_resends_existing_tags() {
        let (url, rx) = capture_one_request();
        let server = PlexServer::new(&url, "token").unwrap();
        let movie = MovieItem {
            rating_key: "4417".to_string(),
            title: "Goldfinger".to_string(),
            year: Some(1964),
            summary: None,
            collections: vec!["Sean Connery".to_string(), "007 Box Set".to_string()],
            genres: Vec::new(),
            added_at: None,
        };

        server.add_collection(&movies_section(), &movie, "James Bond").await.unwrap();

        let line = rx.recv().unwrap();
        assert!(line.starts_with("PUT /library/sections/1/all?"), "{}", line);
        assert!(line.contains("id=4417"), "{}", line);
        assert!(line.contains("collection%5B0%5D.tag.tag=Sean+Connery"), "{}", line);
        assert!(line.contains("collection%5B1%5D.tag.tag=007+Box+Set"), "{}", line);
        assert!(line.contains("collection%5B2%5D.tag.tag=James+Bond"), "{}", line);
        assert!(line.contains("collection.locked=1"), "{}", line);
    }

    #[tokio::test]
    async fn test_add_collection_does_not_repeat_a_present_tag() {
        let (url, rx) = capture_one_request();
        let server = PlexServer::new(&url, "token").unwrap();
        let movie = MovieItem {
            rating_key: "12".to_string(),
            title: "Spectre".to_string(),
            year: Some(2015),
            summary: None,
            collections: vec!["James Bond".to_string()],
            genres: Vec::new(),
            added_at: None,
        };

        server.add_collection(&movies_section(), &movie, "James Bond").await.unwrap();

        let line = rx.recv().unwrap();
        assert!(line.contains("collection%5B0%5D.tag.tag=James+Bond"), "{}", line);
        assert!(!line.contains("collection%5B1%5D"), "{}", line);
    }

    #[test]
    fn test_server_url_is_normalized() {
        let server = PlexServer::new("http://plex.lan:32400/", "token").unwrap();
        assert_eq!(server.server_url(), "http://plex.lan:32400");
        assert_eq!(server.source_name(), "Plex");
    }
}
