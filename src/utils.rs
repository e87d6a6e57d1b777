use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::{config::Config, types::Token};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Authorization URL for the PKCE login, with every parameter encoded.
pub fn build_authorize_url(config: &Config, code_challenge: &str) -> Result<Url, String> {
    Url::parse_with_params(
        &config.auth_url,
        &[
            ("client_id", config.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("code_challenge_method", "S256"),
            ("code_challenge", code_challenge),
            ("scope", config.scope.as_str()),
            ("show_dialog", "true"),
        ],
    )
    .map_err(|e| e.to_string())
}

/// Human readable remaining lifetime of a token at unix time `now`.
pub fn describe_expiry(token: &Token, now: u64) -> String {
    let expires_at = token.obtained_at.saturating_add(token.expires_in);
    if expires_at <= now {
        return "expired (refreshable)".to_string();
    }

    let remaining = expires_at - now;
    if remaining >= 60 {
        format!("in {} min", remaining / 60)
    } else {
        format!("in {} s", remaining)
    }
}
