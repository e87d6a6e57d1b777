//! # API Module
//!
//! HTTP endpoints of the local server that completes the OAuth login.
//!
//! - [`callback`] - receives the authorization code from Spotify and exchanges
//!   it, together with the PKCE verifier, for a token
//! - [`health`] - reports status and version

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
