pub mod memory;
pub mod mysql;

// MySQL specific modules split by domain
mod mysql_account;
mod mysql_session;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::settings::{Config, StorageBackend};
use crate::error::Result as AppResult;
use crate::models::{Account, AppProfile, BlacklistEntry, LinkedProfile, Session};

use self::memory::MemoryStorage;
use self::mysql::MySqlStorage;

/// Storage Result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Error types for storage operations
#[derive(Debug, Error, Clone)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Connection(_))
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            StorageError::Database(_) => "database",
            StorageError::Connection(_) => "connection",
            StorageError::NotFound(_) => "not_found",
            StorageError::Serialization(_) => "serialization",
            StorageError::Configuration(_) => "config",
        }
    }
}

// Error conversions for better integration
impl From<sqlx::Error> for StorageError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => Self::Database(db_err.to_string()),
            sqlx::Error::Io(io_err) => Self::Connection(io_err.to_string()),
            sqlx::Error::PoolTimedOut => Self::Connection("Connection pool timeout".to_string()),
            sqlx::Error::PoolClosed => Self::Connection("Connection pool closed".to_string()),
            _ => Self::Database(error.to_string()),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Persistence interface for the session authority. Lookups that miss
/// return `Ok(None)`; only I/O failures are errors.
#[async_trait]
pub trait Storage: Sync + Send {
    /// Health check with connection validation
    async fn health_check(&self) -> Result<()>;

    // Account related methods
    /// Create an account together with its linked professional profile and
    /// the empty app-profile placeholder, atomically.
    async fn create_account(
        &self,
        account: &Account,
        linked_profile: &LinkedProfile,
        app_profile: &AppProfile,
    ) -> Result<()>;
    async fn get_account_by_id(&self, id: &str) -> Result<Option<Account>>;
    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>>;
    async fn update_account(&self, account: &Account) -> Result<()>;

    // Profile related methods
    async fn get_linked_profile(&self, account_id: &str) -> Result<Option<LinkedProfile>>;
    /// Update-or-create the professional profile for its account
    async fn upsert_linked_profile(&self, profile: &LinkedProfile) -> Result<()>;
    async fn get_app_profile(&self, account_id: &str) -> Result<Option<AppProfile>>;

    // Session related methods
    async fn create_session(&self, session: &Session) -> Result<()>;
    async fn get_session_by_token(&self, token: &str) -> Result<Option<Session>>;
    /// Deactivate every session row matching this account and token.
    /// Returns the number of sessions touched.
    async fn deactivate_sessions_by_token(&self, account_id: &str, token: &str) -> Result<u64>;
    async fn deactivate_sessions_for_account(&self, account_id: &str) -> Result<u64>;

    // Blacklist related methods
    async fn create_blacklist_entry(&self, entry: &BlacklistEntry) -> Result<()>;
    async fn get_blacklist_entry(&self, token: &str) -> Result<Option<BlacklistEntry>>;
    /// Delete entries whose own expiry has passed. Returns the purge count.
    async fn purge_expired_blacklist(&self, now: DateTime<Utc>) -> Result<u64>;
}

/// Storage factory
pub struct StorageFactory;

impl StorageFactory {
    /// Create MySQL storage and make sure the schema exists
    pub async fn create_mysql_storage(config: &Config) -> AppResult<MySqlStorage> {
        let url = config.database.connection_url();
        info!(
            host = %config.database.host,
            database = %config.database.name,
            "Connecting to MySQL"
        );

        let storage = MySqlStorage::new_with_url(
            &url,
            config.database.max_connections,
            config.database.connect_timeout,
        )
        .await?;
        storage.init_schema().await?;
        storage.check_connection().await?;

        Ok(storage)
    }

    /// Create memory storage for testing and local development
    pub fn create_memory_storage() -> MemoryStorage {
        info!("Creating memory storage");
        MemoryStorage::new()
    }
}

/// Initialize the storage backend selected by config
pub async fn init_storage(config: &Config) -> AppResult<Arc<dyn Storage>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; all data is lost on restart");
            Ok(Arc::new(StorageFactory::create_memory_storage()))
        }
        StorageBackend::Mysql => match StorageFactory::create_mysql_storage(config).await {
            Ok(storage) => {
                info!("MySQL storage initialized");
                Ok(Arc::new(storage))
            }
            Err(e) if config.storage.allow_memory_fallback => {
                warn!("MySQL unavailable ({}), falling back to memory storage", e);
                Ok(Arc::new(StorageFactory::create_memory_storage()))
            }
            Err(e) => {
                error!("Failed to initialize MySQL storage: {}", e);
                Err(e)
            }
        },
    }
}
