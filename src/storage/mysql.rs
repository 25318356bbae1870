use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use tracing::info;

use crate::models::account::Account;
use crate::models::profile::{AppProfile, LinkedProfile};
use crate::models::session::{BlacklistEntry, Session};
use crate::storage::{Result, Storage, StorageError};

use crate::storage::mysql_account::MySqlAccountExt;
use crate::storage::mysql_session::MySqlSessionExt;

/// MySQL storage implementation
pub struct MySqlStorage {
    sqlx_pool: MySqlPool,
}

impl MySqlStorage {
    /// Create new storage from a connection URL
    pub async fn new_with_url(
        url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> Result<Self> {
        let sqlx_pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(connect_timeout_secs))
            .connect(url)
            .await
            .map_err(|e| StorageError::Connection(format!("Failed to connect via sqlx: {}", e)))?;
        Ok(Self { sqlx_pool })
    }

    /// Wrap an existing pool (tests)
    pub fn new_with_pool(sqlx_pool: MySqlPool) -> Self {
        Self { sqlx_pool }
    }

    pub fn get_sqlx_pool(&self) -> &MySqlPool {
        &self.sqlx_pool
    }

    /// Check database connection
    pub async fn check_connection(&self) -> Result<()> {
        let result: Option<String> = sqlx::query_scalar("SELECT 'Connection OK'")
            .fetch_optional(self.get_sqlx_pool())
            .await
            .map_err(|e| StorageError::Database(format!("Failed to execute test query: {}", e)))?;
        if result.unwrap_or_default() != "Connection OK" {
            return Err(StorageError::Database(
                "Database connection check failed".to_string(),
            ));
        }

        Ok(())
    }

    /// Initialize database schema
    pub async fn init_schema(&self) -> Result<()> {
        info!("Initializing database schema...");

        // Create accounts table. Email stays unique even after anonymization,
        // which is why the column is wider than a plain address.
        let create_accounts_table = r"
        CREATE TABLE IF NOT EXISTS accounts (
            id VARCHAR(36) NOT NULL PRIMARY KEY,
            email VARCHAR(512) NOT NULL,
            verified BOOLEAN NOT NULL DEFAULT TRUE,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            subscription_tier VARCHAR(32) NOT NULL DEFAULT 'free',
            created_at BIGINT NOT NULL,
            updated_at BIGINT NOT NULL,
            last_active_at BIGINT NOT NULL,
            UNIQUE INDEX idx_accounts_email (email(191))
        )";

        sqlx::query(create_accounts_table)
            .execute(self.get_sqlx_pool())
            .await
            .map_err(|e| StorageError::Database(format!("Failed to create accounts table: {}", e)))?;

        // Create linked_profiles table
        let create_linked_profiles_table = r"
        CREATE TABLE IF NOT EXISTS linked_profiles (
            id VARCHAR(36) NOT NULL PRIMARY KEY,
            account_id VARCHAR(36) NOT NULL,
            provider_id VARCHAR(191) NOT NULL,
            first_name VARCHAR(255) NOT NULL,
            last_name VARCHAR(255) NOT NULL,
            picture_url TEXT,
            headline TEXT,
            summary TEXT,
            industry VARCHAR(255),
            location VARCHAR(255),
            public_profile_url TEXT,
            synced_at BIGINT NOT NULL,
            UNIQUE INDEX idx_linked_profiles_account (account_id),
            UNIQUE INDEX idx_linked_profiles_provider (provider_id),
            FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
        )";

        sqlx::query(create_linked_profiles_table)
            .execute(self.get_sqlx_pool())
            .await
            .map_err(|e| {
                StorageError::Database(format!("Failed to create linked_profiles table: {}", e))
            })?;

        // Create app_profiles table (interests stored as a JSON string)
        let create_app_profiles_table = r"
        CREATE TABLE IF NOT EXISTS app_profiles (
            id VARCHAR(36) NOT NULL PRIMARY KEY,
            account_id VARCHAR(36) NOT NULL,
            bio TEXT,
            age INT,
            gender VARCHAR(32),
            interests TEXT NOT NULL,
            complete BOOLEAN NOT NULL DEFAULT FALSE,
            visible BOOLEAN NOT NULL DEFAULT FALSE,
            created_at BIGINT NOT NULL,
            updated_at BIGINT NOT NULL,
            UNIQUE INDEX idx_app_profiles_account (account_id),
            FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
        )";

        sqlx::query(create_app_profiles_table)
            .execute(self.get_sqlx_pool())
            .await
            .map_err(|e| {
                StorageError::Database(format!("Failed to create app_profiles table: {}", e))
            })?;

        // Create sessions table. Tokens are not unique: two logins in the
        // same second mint identical claims, and both rows must die on logout.
        let create_sessions_table = r"
        CREATE TABLE IF NOT EXISTS sessions (
            id VARCHAR(36) NOT NULL PRIMARY KEY,
            account_id VARCHAR(36) NOT NULL,
            token VARCHAR(1024) NOT NULL,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            expires_at BIGINT NOT NULL,
            created_at BIGINT NOT NULL,
            INDEX idx_sessions_account (account_id),
            INDEX idx_sessions_token (token(191)),
            FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
        )";

        sqlx::query(create_sessions_table)
            .execute(self.get_sqlx_pool())
            .await
            .map_err(|e| StorageError::Database(format!("Failed to create sessions table: {}", e)))?;

        // Create token_blacklist table
        let create_blacklist_table = r"
        CREATE TABLE IF NOT EXISTS token_blacklist (
            id VARCHAR(36) NOT NULL,
            token VARCHAR(512) NOT NULL PRIMARY KEY,
            expires_at BIGINT NOT NULL,
            created_at BIGINT NOT NULL,
            INDEX idx_blacklist_expires (expires_at)
        )";

        sqlx::query(create_blacklist_table)
            .execute(self.get_sqlx_pool())
            .await
            .map_err(|e| {
                StorageError::Database(format!("Failed to create token_blacklist table: {}", e))
            })?;

        info!("Database schema ready");
        Ok(())
    }
}

/// Convert a BIGINT epoch-seconds column back to a DateTime
pub(super) fn datetime_from_epoch(ts: i64) -> Result<DateTime<Utc>> {
    match Utc.timestamp_opt(ts, 0) {
        chrono::LocalResult::Single(dt) => Ok(dt),
        _ => Err(StorageError::Serialization(format!(
            "Invalid epoch timestamp: {}",
            ts
        ))),
    }
}

#[async_trait]
impl Storage for MySqlStorage {
    async fn health_check(&self) -> Result<()> {
        self.check_connection().await
    }

    /// Create account with both profiles in one transaction
    async fn create_account(
        &self,
        account: &Account,
        linked_profile: &LinkedProfile,
        app_profile: &AppProfile,
    ) -> Result<()> {
        MySqlAccountExt::create_account(self, account, linked_profile, app_profile).await
    }

    /// Get account by ID
    async fn get_account_by_id(&self, id: &str) -> Result<Option<Account>> {
        MySqlAccountExt::get_account_by_id(self, id).await
    }

    /// Get account by email
    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        MySqlAccountExt::get_account_by_email(self, email).await
    }

    /// Update account
    async fn update_account(&self, account: &Account) -> Result<()> {
        MySqlAccountExt::update_account(self, account).await
    }

    /// Get linked professional profile
    async fn get_linked_profile(&self, account_id: &str) -> Result<Option<LinkedProfile>> {
        MySqlAccountExt::get_linked_profile(self, account_id).await
    }

    /// Upsert linked professional profile
    async fn upsert_linked_profile(&self, profile: &LinkedProfile) -> Result<()> {
        MySqlAccountExt::upsert_linked_profile(self, profile).await
    }

    /// Get app profile
    async fn get_app_profile(&self, account_id: &str) -> Result<Option<AppProfile>> {
        MySqlAccountExt::get_app_profile(self, account_id).await
    }

    /// Create session
    async fn create_session(&self, session: &Session) -> Result<()> {
        MySqlSessionExt::create_session(self, session).await
    }

    /// Get session by token
    async fn get_session_by_token(&self, token: &str) -> Result<Option<Session>> {
        MySqlSessionExt::get_session_by_token(self, token).await
    }

    /// Deactivate sessions matching account and token
    async fn deactivate_sessions_by_token(&self, account_id: &str, token: &str) -> Result<u64> {
        MySqlSessionExt::deactivate_sessions_by_token(self, account_id, token).await
    }

    /// Deactivate every session of an account
    async fn deactivate_sessions_for_account(&self, account_id: &str) -> Result<u64> {
        MySqlSessionExt::deactivate_sessions_for_account(self, account_id).await
    }

    /// Blacklist a token
    async fn create_blacklist_entry(&self, entry: &BlacklistEntry) -> Result<()> {
        MySqlSessionExt::create_blacklist_entry(self, entry).await
    }

    /// Get blacklist entry by token
    async fn get_blacklist_entry(&self, token: &str) -> Result<Option<BlacklistEntry>> {
        MySqlSessionExt::get_blacklist_entry(self, token).await
    }

    /// Drop expired blacklist entries
    async fn purge_expired_blacklist(&self, now: DateTime<Utc>) -> Result<u64> {
        MySqlSessionExt::purge_expired_blacklist(self, now).await
    }
}
