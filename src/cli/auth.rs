use std::sync::Arc;

use crate::{config::Config, error::AuthError, spotify, success, types::Account};

pub async fn auth(config: Arc<Config>, account: Account) -> Result<(), AuthError> {
    spotify::auth::auth(config, account).await?;
    success!("Authentication of the {} account successful!", account);
    Ok(())
}
