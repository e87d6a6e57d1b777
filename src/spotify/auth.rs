use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::{Client, RequestBuilder};
use tokio::sync::Mutex;

use crate::{
    config::Config,
    error::AuthError,
    info,
    management::TokenManager,
    server::CallbackServer,
    types::{Account, PkceToken, Token, TokenResponse},
    utils, warning,
};

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs the interactive OAuth 2.0 PKCE login for one account and stores the
/// resulting token.
///
/// 1. Generates a code verifier and its S256 challenge
/// 2. Starts the local callback server
/// 3. Opens the authorization URL in the default browser
/// 4. Waits for the callback to exchange the code
/// 5. Shuts the callback server down again
/// 6. Persists the token under the account's role
///
/// The authorization URL always asks Spotify to show the consent dialog, so
/// the user gets a chance to switch accounts between the source and the
/// target login. Since the server is gone once this returns, logging in the
/// second account from the same process binds a fresh server with its own
/// state.
///
/// # Arguments
///
/// * `config` - Client id, redirect URI, scope and the listen address of the
///   callback server
/// * `account` - Role the resulting token is stored under
///
/// # Errors
///
/// - [`AuthError::Incomplete`] if the callback server cannot be started, the
///   authorization URL is invalid, or no callback arrives within two minutes
/// - [`AuthError::Store`] if the token cannot be written
///
/// # Example
///
/// ```
/// let config = Arc::new(Config::from_env()?);
/// auth(Arc::clone(&config), Account::Source).await?;
/// auth(config, Account::Target).await?;
/// ```
pub async fn auth(config: Arc<Config>, account: Account) -> Result<Token, AuthError> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let auth_url = utils::build_authorize_url(&config, &code_challenge)
        .map_err(|e| AuthError::Incomplete(format!("invalid authorization url: {}", e)))?;

    let shared_state: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(Some(PkceToken {
        code_verifier,
        token: None,
    })));

    let server = CallbackServer::start(Arc::clone(&config), Arc::clone(&shared_state))
        .await
        .map_err(|e| AuthError::Incomplete(format!("cannot start callback server: {}", e)))?;

    info!("Log in with the {} account in your browser.", account);
    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let token = wait_for_token(shared_state, CALLBACK_TIMEOUT).await;
    server.shutdown().await;
    let token = token.ok_or_else(|| AuthError::Incomplete("timed out waiting for the callback".to_string()))?;

    TokenManager::new(account, token.clone()).persist().await?;
    Ok(token)
}

/// Polls the shared state until the callback handler stored a token or the
/// timeout elapses.
pub async fn wait_for_token(
    shared_state: Arc<Mutex<Option<PkceToken>>>,
    max_wait: Duration,
) -> Option<Token> {
    let start = tokio::time::Instant::now();

    while start.elapsed() < max_wait {
        {
            let lock = shared_state.lock().await;
            if let Some(token) = lock.as_ref().and_then(|pkce| pkce.token.as_ref()) {
                return Some(token.clone());
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    None
}

/// Exchanges an authorization code (plus its PKCE verifier) for a token.
///
/// # Arguments
///
/// * `config` - Token endpoint, client id, optional client secret and the
///   redirect URI the code was issued for
/// * `code` - Authorization code from the callback query
/// * `verifier` - PKCE code verifier whose challenge was sent with the
///   authorization request
///
/// # Errors
///
/// Returns [`AuthError::Rejected`] with the endpoint's status and body when
/// the code or verifier is refused, and [`AuthError::Transport`] when the
/// endpoint cannot be reached or answers with something that is not a token.
pub async fn exchange_code(config: &Config, code: &str, verifier: &str) -> Result<Token, AuthError> {
    let request = Client::new().post(&config.token_url).form(&[
        ("grant_type", "authorization_code"),
        ("client_id", config.client_id.as_str()),
        ("code", code),
        ("code_verifier", verifier),
        ("redirect_uri", config.redirect_uri.as_str()),
    ]);

    let res = request_token(config, request).await?;
    let refresh_token = res.refresh_token.clone().unwrap_or_default();
    Ok(into_token(res, refresh_token))
}

/// Mints a new access token from a refresh token.
///
/// Spotify may or may not rotate the refresh token; when the response has
/// none, the one passed in stays valid and is carried over.
pub async fn refresh_access_token(config: &Config, refresh_token: &str) -> Result<Token, AuthError> {
    let request = Client::new().post(&config.token_url).form(&[
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", config.client_id.as_str()),
    ]);

    let res = request_token(config, request).await?;
    let refresh_token = res
        .refresh_token
        .clone()
        .unwrap_or_else(|| refresh_token.to_string());
    Ok(into_token(res, refresh_token))
}

async fn request_token(config: &Config, request: RequestBuilder) -> Result<TokenResponse, AuthError> {
    let request = match &config.client_secret {
        Some(secret) => request.basic_auth(&config.client_id, Some(secret)),
        None => request,
    };

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Rejected { status, body });
    }

    Ok(response.json::<TokenResponse>().await?)
}

fn into_token(res: TokenResponse, refresh_token: String) -> Token {
    Token {
        access_token: res.access_token,
        refresh_token,
        scope: res.scope,
        expires_in: res.expires_in,
        obtained_at: Utc::now().timestamp() as u64,
    }
}
