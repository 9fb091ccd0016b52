use super::AccountStore;
use crate::{Account, AccountId, NewAccount, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

/// In-process store, used for tests and `memory://` deployments
pub struct MemoryAccountStore {
    accounts: RwLock<BTreeMap<AccountId, Account>>,
    next_id: AtomicI64,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        self.accounts.write().await.clear();
        self.next_id.store(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create(&self, account: NewAccount) -> Result<Account> {
        account.validate()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let account = account.into_account(id, Utc::now().date_naive());
        self.accounts.write().await.insert(id, account.clone());
        Ok(account)
    }

    async fn find(&self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().filter(|a| a.name == name).cloned().collect())
    }

    async fn all(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.read().await.values().cloned().collect())
    }

    async fn update(&self, id: AccountId, account: NewAccount) -> Result<Option<Account>> {
        account.validate()?;
        let mut accounts = self.accounts.write().await;
        Ok(accounts.get_mut(&id).map(|existing| {
            existing.apply(account);
            existing.clone()
        }))
    }

    async fn delete(&self, id: AccountId) -> Result<bool> {
        Ok(self.accounts.write().await.remove(&id).is_some())
    }

    async fn remove_all(&self) -> Result<()> {
        self.accounts.write().await.clear();
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
