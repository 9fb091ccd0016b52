//! Account persistence
//!
//! Backends implement [`AccountStore`]; the server only ever holds an
//! `Arc<dyn AccountStore>`.

mod memory;
mod postgres;

pub use memory::MemoryAccountStore;
pub use postgres::PostgresAccountStore;

use crate::{Account, AccountError, AccountId, NewAccount, Result};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create the schema if it does not exist yet
    async fn init(&self) -> Result<()>;

    /// Drop and recreate the schema
    async fn reset(&self) -> Result<()>;

    /// Persist a new account and return it with its assigned id
    async fn create(&self, account: NewAccount) -> Result<Account>;

    async fn find(&self, id: AccountId) -> Result<Option<Account>>;

    /// Accounts whose name matches exactly
    async fn find_by_name(&self, name: &str) -> Result<Vec<Account>>;

    /// All accounts ordered by id
    async fn all(&self) -> Result<Vec<Account>>;

    /// Replace an account's fields. `None` when the id is unknown.
    async fn update(&self, id: AccountId, account: NewAccount) -> Result<Option<Account>>;

    /// Remove an account, returning whether anything was deleted
    async fn delete(&self, id: AccountId) -> Result<bool>;

    async fn remove_all(&self) -> Result<()>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}

/// Open a store from a connection URI and make sure its schema exists.
///
/// `memory://` selects the in-process store, `postgres://` and
/// `postgresql://` select PostgreSQL.
pub async fn connect(uri: &str) -> Result<Arc<dyn AccountStore>> {
    let store: Arc<dyn AccountStore> = if uri.starts_with("memory://") {
        Arc::new(MemoryAccountStore::new())
    } else if uri.starts_with("postgres://") || uri.starts_with("postgresql://") {
        Arc::new(PostgresAccountStore::new(uri).await?)
    } else {
        return Err(AccountError::Config(format!(
            "unsupported database URI scheme: {}",
            redact(uri)
        )));
    };

    store.init().await?;
    tracing::info!("Account store ready ({})", store.backend());
    Ok(store)
}

/// Strip credentials from a URI before it reaches a log line or error message
pub fn redact(uri: &str) -> String {
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &uri[..scheme_end], &uri[at..])
        }
        _ => uri.to_string(),
    }
}
