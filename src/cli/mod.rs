//! # CLI Module
//!
//! User-facing commands of likesync. Each command loads what it needs
//! (configuration, stored tokens), delegates to the sync engine or the
//! Spotify module and reports the outcome on the terminal.
//!
//! - [`auth`] - interactive PKCE login for the source or the target account
//! - [`sync`] - copies missing liked songs from source to target
//! - [`status`] - shows which accounts are authenticated
//!
//! ```bash
//! likesync auth --account source
//! likesync auth --account target
//! likesync sync --dry-run
//! likesync sync
//! ```

mod auth;
mod status;
mod sync;

pub use auth::auth;
pub use status::status;
pub use sync::{ConsoleProgress, access_token, sync};
