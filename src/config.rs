//! Configuration management for likesync.
//!
//! All settings are read once at process start into a [`Config`] value that is
//! then passed by reference to whoever needs it. Values come from:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use crate::error::ConfigError;

/// Most items the platform returns per page and accepts per save request.
pub const PLATFORM_ITEM_LIMIT: usize = 50;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_SCOPE: &str = "user-library-read user-library-modify";
pub const DEFAULT_PACING_MS: u64 = 100;

/// Knobs of the sync engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Items requested per liked-tracks page.
    pub page_size: usize,
    /// Track ids per save request.
    pub batch_size: usize,
    /// Wait between two consecutive save requests.
    pub pacing: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            page_size: PLATFORM_ITEM_LIMIT,
            batch_size: PLATFORM_ITEM_LIMIT,
            pacing: Duration::from_millis(DEFAULT_PACING_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    /// Confidential clients authenticate token requests with it; public
    /// clients rely on PKCE alone.
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub server_addr: String,
    pub sync: SyncSettings,
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let client_id =
            get("SPOTIFY_API_AUTH_CLIENT_ID").ok_or(ConfigError::Missing("SPOTIFY_API_AUTH_CLIENT_ID"))?;

        let sync = SyncSettings {
            page_size: parse_item_count("SYNC_PAGE_SIZE", get("SYNC_PAGE_SIZE"))?,
            batch_size: parse_item_count("SYNC_BATCH_SIZE", get("SYNC_BATCH_SIZE"))?,
            pacing: match get("SYNC_PACING_MS") {
                Some(raw) => Duration::from_millis(raw.trim().parse().map_err(
                    |e: std::num::ParseIntError| ConfigError::Invalid {
                        var: "SYNC_PACING_MS",
                        value: raw.clone(),
                        reason: e.to_string(),
                    },
                )?),
                None => Duration::from_millis(DEFAULT_PACING_MS),
            },
        };

        Ok(Config {
            client_id,
            client_secret: get("SPOTIFY_API_AUTH_CLIENT_SECRET"),
            redirect_uri: or_default("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            scope: or_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            auth_url: or_default("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: or_default("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: or_default("SPOTIFY_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            server_addr: or_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            sync,
        })
    }
}

// Page and batch sizes above the platform limit would be rejected upstream.
fn parse_item_count(var: &'static str, raw: Option<String>) -> Result<usize, ConfigError> {
    let Some(raw) = raw else {
        return Ok(PLATFORM_ITEM_LIMIT);
    };

    let invalid = |reason: String| ConfigError::Invalid {
        var,
        value: raw.clone(),
        reason,
    };

    let n: usize = raw.trim().parse().map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?;
    if n == 0 || n > PLATFORM_ITEM_LIMIT {
        return Err(invalid(format!("must be between 1 and {PLATFORM_ITEM_LIMIT}")));
    }
    Ok(n)
}

/// Directory holding the `.env` file and stored tokens.
///
/// - Linux: `~/.local/share/likesync`
/// - macOS: `~/Library/Application Support/likesync`
/// - Windows: `%LOCALAPPDATA%/likesync`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("likesync");
    path
}

/// Loads environment variables from `<data dir>/.env` if the file exists.
///
/// A missing file is not an error since every variable can also come from
/// the process environment. Variables already set are not overridden.
pub async fn load_env() -> Result<(), ConfigError> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(|e| ConfigError::EnvFile(e.to_string()))?;

    let path = dir.join(".env");
    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path)
        .map(|_| ())
        .map_err(|e| ConfigError::EnvFile(format!("{}: {}", path.display(), e)))
}
