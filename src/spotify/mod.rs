//! # Spotify Integration Module
//!
//! The two Web API calls a sync needs, plus the OAuth token flow.
//!
//! ```text
//! Sync Engine
//!      ↓
//! LikedTracksApi (trait)
//!      ↓
//! SpotifyClient (reqwest, JSON, bearer auth)
//!      ↓
//! Spotify Web API
//! ```
//!
//! ## Endpoints
//!
//! - `GET /me/tracks?limit=N` - one page of the user's liked tracks; the
//!   response carries the absolute URL of the next page or `null`
//! - `PUT /me/tracks` - saves up to 50 track ids (`{"ids": [...]}`)
//! - `POST /api/token` - authorization-code and refresh-token exchange
//!   (see [`auth`])
//!
//! Nothing in here retries. A failed page or batch is reported to the caller,
//! which decides whether that is fatal.

pub mod auth;
mod tracks;

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::Config,
    error::{RetrievalError, WriteChunkError},
    types::{LikedPage, TrackId},
};

/// Access to an account's liked-tracks collection.
///
/// Implemented by [`SpotifyClient`] against the real API; tests plug in
/// in-memory fakes.
#[async_trait]
pub trait LikedTracksApi: Send + Sync {
    /// Fetches one page. `next` is the pointer returned by the previous page,
    /// `None` requests the first page with `page_size` items.
    async fn fetch_liked_page(
        &self,
        token: &str,
        next: Option<&str>,
        page_size: usize,
    ) -> Result<LikedPage, RetrievalError>;

    /// Saves up to 50 tracks into the account's liked collection. Saving an
    /// already liked track is a no-op upstream.
    async fn save_liked_batch(&self, token: &str, ids: &[TrackId]) -> Result<(), WriteChunkError>;
}

/// Web API client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
}

impl SpotifyClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(config.api_url.clone())
    }

    pub fn with_base_url(api_url: impl Into<String>) -> Self {
        SpotifyClient {
            http: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}
