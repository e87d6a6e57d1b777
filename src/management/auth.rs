use std::path::PathBuf;

use chrono::Utc;

use crate::{
    config::{self, Config},
    error::{AuthError, TokenStoreError},
    spotify,
    types::{Account, Token},
};

/// Seconds before the real expiry at which a token counts as expired.
const EXPIRY_MARGIN_SECS: u64 = 240;

/// Stored token of one account role.
///
/// Each role keeps its own file, `<dir>/{source,target}.json`. By default
/// `<dir>` is the `tokens` directory inside the application data directory.
pub struct TokenManager {
    account: Account,
    token: Token,
    dir: PathBuf,
}

impl TokenManager {
    pub fn new(account: Account, token: Token) -> Self {
        TokenManager {
            account,
            token,
            dir: default_token_dir(),
        }
    }

    /// Keeps the token file in `dir` instead of the data directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Loads the stored token of `account` from the data directory.
    pub async fn load(account: Account) -> Result<Self, AuthError> {
        Self::load_from(default_token_dir(), account).await
    }

    /// Loads the stored token of `account` from `dir`.
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory holding one token file per account role
    /// * `account` - Role whose token to read
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotAuthenticated`] if no token file exists yet, i.e. the
    ///   account never went through `likesync auth`
    /// - [`AuthError::Store`] if the file cannot be read or parsed
    pub async fn load_from(dir: impl Into<PathBuf>, account: Account) -> Result<Self, AuthError> {
        let dir = dir.into();
        let path = token_path(&dir, account);
        let content = match async_fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::NotAuthenticated(account));
            }
            Err(e) => return Err(TokenStoreError::Io(e).into()),
        };
        let token: Token = serde_json::from_str(&content).map_err(TokenStoreError::Serde)?;
        Ok(Self { account, token, dir })
    }

    pub async fn persist(&self) -> Result<(), TokenStoreError> {
        let path = token_path(&self.dir, self.account);
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.token)?;
        async_fs::write(&path, json).await?;
        Ok(())
    }

    /// Returns an access token that is good for at least a few more minutes.
    ///
    /// A token within four minutes of its expiry is refreshed first
    /// and the new token is written back to the token file.
    ///
    /// # Arguments
    ///
    /// * `config` - Supplies the token endpoint and client credentials used
    ///   for the refresh
    ///
    /// # Errors
    ///
    /// A rejected or failed refresh is returned as is. The stale access token
    /// is never handed out in that case, and the stored file stays untouched.
    ///
    /// # Example
    ///
    /// ```
    /// let mut token_mgr = TokenManager::load(Account::Source).await?;
    /// let access_token = token_mgr.get_valid_token(&config).await?;
    /// ```
    pub async fn get_valid_token(&mut self, config: &Config) -> Result<String, AuthError> {
        if self.is_expired() {
            self.token = spotify::auth::refresh_access_token(config, &self.token.refresh_token).await?;
            self.persist().await?;
        }

        Ok(self.token.access_token.clone())
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        is_expired_at(&self.token, now)
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}

fn default_token_dir() -> PathBuf {
    config::data_dir().join("tokens")
}

fn token_path(dir: &std::path::Path, account: Account) -> PathBuf {
    dir.join(format!("{account}.json", account = account.as_str()))
}

/// Whether `token` has to be refreshed at unix time `now`.
pub fn is_expired_at(token: &Token, now: u64) -> bool {
    (now + EXPIRY_MARGIN_SECS) >= token.obtained_at.saturating_add(token.expires_in)
}
