use super::{redact, AccountStore};
use crate::{Account, AccountError, AccountId, NewAccount, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id           BIGSERIAL PRIMARY KEY,
    name         VARCHAR(64)  NOT NULL,
    email        VARCHAR(64)  NOT NULL,
    address      VARCHAR(256) NOT NULL,
    phone_number VARCHAR(32),
    date_joined  DATE         NOT NULL
)
"#;

const COLUMNS: &str = "id, name, email, address, phone_number, date_joined";

/// PostgreSQL account store backed by a connection pool
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub async fn new(database_uri: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_uri)
            .await
            .map_err(|e| {
                AccountError::Storage(format!(
                    "Failed to connect to {}: {}",
                    redact(database_uri),
                    e
                ))
            })?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn row_to_account(row: &PgRow) -> Result<Account> {
        Ok(Account {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            address: row.try_get("address")?,
            phone_number: row.try_get("phone_number")?,
            date_joined: row.try_get("date_joined")?,
        })
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn init(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        tracing::warn!("Dropping and recreating the accounts table");
        sqlx::query("DROP TABLE IF EXISTS accounts")
            .execute(&self.pool)
            .await?;
        self.init().await
    }

    async fn create(&self, account: NewAccount) -> Result<Account> {
        account.validate()?;
        let date_joined = account.date_joined.unwrap_or_else(|| Utc::now().date_naive());

        let sql = format!(
            "INSERT INTO accounts (name, email, address, phone_number, date_joined) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&account.name)
            .bind(&account.email)
            .bind(&account.address)
            .bind(&account.phone_number)
            .bind(date_joined)
            .fetch_one(&self.pool)
            .await?;

        let created = Self::row_to_account(&row)?;
        tracing::debug!("Inserted account {}", created.id);
        Ok(created)
    }

    async fn find(&self, id: AccountId) -> Result<Option<Account>> {
        let sql = format!("SELECT {} FROM accounts WHERE id = $1", COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Account>> {
        let sql = format!("SELECT {} FROM accounts WHERE name = $1 ORDER BY id", COLUMNS);
        let rows = sqlx::query(&sql).bind(name).fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_account).collect()
    }

    async fn all(&self) -> Result<Vec<Account>> {
        let sql = format!("SELECT {} FROM accounts ORDER BY id", COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_account).collect()
    }

    async fn update(&self, id: AccountId, account: NewAccount) -> Result<Option<Account>> {
        account.validate()?;

        // COALESCE keeps the stored join date when the payload has none
        let sql = format!(
            "UPDATE accounts SET name = $2, email = $3, address = $4, phone_number = $5, \
             date_joined = COALESCE($6, date_joined) WHERE id = $1 RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(&account.name)
            .bind(&account.email)
            .bind(&account.address)
            .bind(&account.phone_number)
            .bind(account.date_joined)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn delete(&self, id: AccountId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM accounts").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
