pub mod api;
pub mod client;

pub use api::PlexHttpClient;
pub use client::PlexServer;
