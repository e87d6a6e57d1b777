use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Which side of a sync an account plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Account {
    Source,
    Target,
}

impl Account {
    pub fn as_str(&self) -> &'static str {
        match self {
            Account::Source => "source",
            Account::Target => "target",
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque Spotify track identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        TrackId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        TrackId::new(id)
    }
}

/// Complete snapshot of one account's liked tracks, in pagination order.
pub type LikedCollection = Vec<TrackId>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// Raw answer of the token endpoint. `refresh_token` is omitted on most
/// refresh responses.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

/// `GET /me/tracks` response page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTracksResponse {
    pub items: Vec<SavedTrack>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrack {
    pub track: Option<TrackRef>,
}

/// Only the id matters; `null` for tracks that are no longer available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRef {
    pub id: Option<String>,
}

/// `PUT /me/tracks` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveTracksRequest {
    pub ids: Vec<String>,
}

/// One page of liked track ids plus the pointer to the following page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikedPage {
    pub track_ids: Vec<TrackId>,
    pub next: Option<String>,
}

impl From<SavedTracksResponse> for LikedPage {
    fn from(res: SavedTracksResponse) -> Self {
        LikedPage {
            track_ids: res
                .items
                .into_iter()
                .filter_map(|item| item.track.and_then(|t| t.id))
                .map(TrackId::new)
                .collect(),
            next: res.next,
        }
    }
}

/// Result of a single batch write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchWriteOutcome {
    pub index: usize,
    pub written: usize,
}

/// Both collections fetched and diffed, nothing written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub source_count: usize,
    pub target_count: usize,
    pub missing: Vec<TrackId>,
}

/// What a sync reports back. Serializes to
/// `{ message, added, sourceSongs?, targetSongs? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub message: String,
    pub added: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_songs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_songs: Option<usize>,
}

pub const ALREADY_IN_SYNC: &str = "Accounts are already in sync!";

impl SyncSummary {
    pub fn already_in_sync() -> Self {
        SyncSummary {
            message: ALREADY_IN_SYNC.to_string(),
            added: 0,
            source_songs: None,
            target_songs: None,
        }
    }

    pub fn is_in_sync(&self) -> bool {
        self.message == ALREADY_IN_SYNC
    }
}

#[derive(Tabled)]
pub struct SummaryTableRow {
    pub account: String,
    pub songs: String,
}

#[derive(Tabled)]
pub struct StatusTableRow {
    pub account: String,
    pub authenticated: String,
    pub expires: String,
}
