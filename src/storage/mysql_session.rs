use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::session::{BlacklistEntry, Session};
use crate::storage::mysql::{datetime_from_epoch, MySqlStorage};
use crate::storage::{Result, StorageError};

/// MySQL session and token-blacklist operations
pub trait MySqlSessionExt {
    /// Create session row
    async fn create_session(&self, session: &Session) -> Result<()>;

    /// Get session by token
    async fn get_session_by_token(&self, token: &str) -> Result<Option<Session>>;

    /// Deactivate sessions matching account and token
    async fn deactivate_sessions_by_token(&self, account_id: &str, token: &str) -> Result<u64>;

    /// Deactivate every session of an account
    async fn deactivate_sessions_for_account(&self, account_id: &str) -> Result<u64>;

    /// Insert blacklist entry
    async fn create_blacklist_entry(&self, entry: &BlacklistEntry) -> Result<()>;

    /// Get blacklist entry by token
    async fn get_blacklist_entry(&self, token: &str) -> Result<Option<BlacklistEntry>>;

    /// Delete expired blacklist entries
    async fn purge_expired_blacklist(&self, now: DateTime<Utc>) -> Result<u64>;
}

type SessionRow = (String, String, String, bool, i64, i64);

fn session_from_row(row: SessionRow) -> Result<Session> {
    let (id, account_id, token, active, expires_at, created_at) = row;
    Ok(Session {
        id,
        account_id,
        token,
        active,
        expires_at: datetime_from_epoch(expires_at)?,
        created_at: datetime_from_epoch(created_at)?,
    })
}

impl MySqlSessionExt for MySqlStorage {
    /// Create session row
    async fn create_session(&self, session: &Session) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO sessions (
                id, account_id, token, active, expires_at, created_at
              ) VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&session.id)
        .bind(&session.account_id)
        .bind(&session.token)
        .bind(session.active)
        .bind(session.expires_at.timestamp())
        .bind(session.created_at.timestamp())
        .execute(self.get_sqlx_pool())
        .await
        .map_err(|e| StorageError::Database(format!("Failed to insert session: {}", e)))?;

        Ok(())
    }

    /// Get session by token, preferring an active row when several match
    async fn get_session_by_token(&self, token: &str) -> Result<Option<Session>> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"SELECT id, account_id, token, active, expires_at, created_at
               FROM sessions
               WHERE token = ?
               ORDER BY active DESC, created_at DESC
               LIMIT 1"#,
        )
        .bind(token)
        .fetch_optional(self.get_sqlx_pool())
        .await
        .map_err(|e| StorageError::Database(format!("Failed to query session: {}", e)))?;

        row.map(session_from_row).transpose()
    }

    /// Deactivate sessions matching account and token
    async fn deactivate_sessions_by_token(&self, account_id: &str, token: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"UPDATE sessions SET active = FALSE
               WHERE account_id = ? AND token = ? AND active = TRUE"#,
        )
        .bind(account_id)
        .bind(token)
        .execute(self.get_sqlx_pool())
        .await
        .map_err(|e| StorageError::Database(format!("Failed to deactivate sessions: {}", e)))?;

        Ok(result.rows_affected())
    }

    /// Deactivate every session of an account
    async fn deactivate_sessions_for_account(&self, account_id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"UPDATE sessions SET active = FALSE
               WHERE account_id = ? AND active = TRUE"#,
        )
        .bind(account_id)
        .execute(self.get_sqlx_pool())
        .await
        .map_err(|e| {
            StorageError::Database(format!("Failed to deactivate account sessions: {}", e))
        })?;

        Ok(result.rows_affected())
    }

    /// Insert blacklist entry. Token is the primary key, so a repeated
    /// revocation refreshes the entry instead of failing.
    async fn create_blacklist_entry(&self, entry: &BlacklistEntry) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO token_blacklist (id, token, expires_at, created_at)
               VALUES (?, ?, ?, ?)
               ON DUPLICATE KEY UPDATE expires_at = VALUES(expires_at)"#,
        )
        .bind(&entry.id)
        .bind(&entry.token)
        .bind(entry.expires_at.timestamp())
        .bind(entry.created_at.timestamp())
        .execute(self.get_sqlx_pool())
        .await
        .map_err(|e| StorageError::Database(format!("Failed to insert blacklist entry: {}", e)))?;

        Ok(())
    }

    /// Get blacklist entry by token
    async fn get_blacklist_entry(&self, token: &str) -> Result<Option<BlacklistEntry>> {
        let row: Option<(String, String, i64, i64)> = sqlx::query_as(
            r#"SELECT id, token, expires_at, created_at
               FROM token_blacklist WHERE token = ?"#,
        )
        .bind(token)
        .fetch_optional(self.get_sqlx_pool())
        .await
        .map_err(|e| StorageError::Database(format!("Failed to query blacklist: {}", e)))?;

        match row {
            Some((id, token, expires_at, created_at)) => Ok(Some(BlacklistEntry {
                id,
                token,
                expires_at: datetime_from_epoch(expires_at)?,
                created_at: datetime_from_epoch(created_at)?,
            })),
            None => Ok(None),
        }
    }

    /// Delete expired blacklist entries
    async fn purge_expired_blacklist(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(r#"DELETE FROM token_blacklist WHERE expires_at <= ?"#)
            .bind(now.timestamp())
            .execute(self.get_sqlx_pool())
            .await
            .map_err(|e| StorageError::Database(format!("Failed to purge blacklist: {}", e)))?;

        let purged = result.rows_affected();
        if purged > 0 {
            debug!("Purged {} expired blacklist entries", purged);
        }
        Ok(purged)
    }
}
