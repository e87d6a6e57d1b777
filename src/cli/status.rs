use chrono::Utc;
use tabled::Table;

use crate::{
    error::AuthError,
    management::TokenManager,
    types::{Account, StatusTableRow},
    utils, warning,
};

/// Shows which account roles have a stored token.
pub async fn status() {
    let now = Utc::now().timestamp() as u64;
    let mut rows = Vec::new();

    for account in [Account::Source, Account::Target] {
        let row = match TokenManager::load(account).await {
            Ok(mgr) => StatusTableRow {
                account: account.to_string(),
                authenticated: "yes".to_string(),
                expires: utils::describe_expiry(mgr.current_token(), now),
            },
            Err(AuthError::NotAuthenticated(_)) => StatusTableRow {
                account: account.to_string(),
                authenticated: "no".to_string(),
                expires: "-".to_string(),
            },
            Err(e) => {
                warning!("Cannot read token of the {} account: {}", account, e);
                StatusTableRow {
                    account: account.to_string(),
                    authenticated: "unreadable".to_string(),
                    expires: "-".to_string(),
                }
            }
        };
        rows.push(row);
    }

    println!("{}", Table::new(rows));
}
