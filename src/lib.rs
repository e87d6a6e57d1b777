//! Liked Songs Sync Library
//!
//! This library copies the "liked songs" collection of one Spotify account into
//! another one. It includes modules for the Spotify Web API client, the OAuth
//! token flow, the sync engine itself and the CLI glue around it.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration loaded once from the environment
//! - `error` - Error types for every stage of a sync
//! - `management` - Token storage per account
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `sync` - Fetch, diff and batched write of liked tracks
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use likesync::{config::Config, spotify::SpotifyClient, sync::SyncEngine};
//!
//! #[tokio::main]
//! async fn main() -> likesync::Res<()> {
//!     let config = Config::from_env()?;
//!     let client = SpotifyClient::new(&config);
//!     let engine = SyncEngine::new(&client, config.sync.clone());
//!     let summary = engine.sync("source-token", "target-token").await?;
//!     println!("{}", summary.message);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod sync;
pub mod types;
pub mod utils;

/// Boxed error result used by the CLI glue.
///
/// The sync core returns typed errors from [`error`]; this alias is what the
/// binary funnels them into once they only need to be displayed.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Accepts the same arguments as [`println!`] and writes to stdout.
///
/// # Example
///
/// ```
/// use likesync::{info, types::Account};
///
/// let account = Account::Source;
/// info!("Fetching liked songs of the {} account...", account);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits with status 1.
///
/// Only the binary and the CLI commands use this. Library code returns errors
/// instead of terminating the process.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable problems such as a single batch that could not be
/// written.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
