pub mod error;
pub mod plex;
pub mod traits;

pub use error::SourceError;
pub use plex::{PlexHttpClient, PlexServer};
pub use traits::{MediaServer, SearchQuery};
