//! Error types for the sync pipeline and its collaborators.
//!
//! Fetch failures ([`RetrievalError`]) and token failures ([`AuthError`]) are
//! fatal and end up wrapped in a [`SyncError`]. A [`WriteChunkError`] only
//! ever costs the batch it belongs to; the writer reports it and moves on.

use reqwest::StatusCode;
use thiserror::Error;

use crate::types::Account;

/// Configuration could not be assembled from the environment.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("cannot load environment file: {0}")]
    EnvFile(String),
}

/// Exchanging an authorization code or refresh token failed.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("token endpoint rejected the request (status {status}): {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("no stored token for the {0} account, run `likesync auth --account {0}` first")]
    NotAuthenticated(Account),

    #[error("authorization was not completed: {0}")]
    Incomplete(String),

    #[error(transparent)]
    Store(#[from] TokenStoreError),
}

/// Reading or writing a persisted token failed.
#[derive(Error, Debug)]
pub enum TokenStoreError {
    #[error("token file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("token file is malformed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A page of the liked-tracks collection could not be retrieved.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("fetching {url} failed with status {status}")]
    Status { url: String, status: StatusCode },

    #[error("fetching {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("page at {url} could not be decoded: {reason}")]
    Decode { url: String, reason: String },

    #[error("page {url} was already fetched, the next pointers loop")]
    RepeatedPage { url: String },
}

impl RetrievalError {
    /// The page URL the failure belongs to.
    pub fn url(&self) -> &str {
        match self {
            RetrievalError::Status { url, .. }
            | RetrievalError::Transport { url, .. }
            | RetrievalError::Decode { url, .. }
            | RetrievalError::RepeatedPage { url } => url,
        }
    }
}

/// A single batch write was refused. Never fatal for a sync.
#[derive(Error, Debug)]
pub enum WriteChunkError {
    #[error("saving {size} tracks failed with status {status}")]
    Status { size: usize, status: StatusCode },

    #[error("saving {size} tracks failed: {source}")]
    Transport {
        size: usize,
        #[source]
        source: reqwest::Error,
    },
}

/// Fatal failure of a whole sync run.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("cannot fetch liked songs of the {account} account: {source}")]
    Retrieval {
        account: Account,
        #[source]
        source: RetrievalError,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),
}
