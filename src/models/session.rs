use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-side session row backing an issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// unique ID
    pub id: String,
    /// owning account id
    pub account_id: String,
    /// the issued token value
    pub token: String,
    /// active status (logout and deactivation clear this)
    pub active: bool,
    /// session expiration time
    pub expires_at: DateTime<Utc>,
    /// session creation time
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create an active session for a freshly issued token
    pub fn new(account_id: &str, token: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            account_id: account_id.to_string(),
            token: token.to_string(),
            active: true,
            expires_at,
            created_at: Utc::now(),
        }
    }

    /// Session counts for authentication only while active and unexpired
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at > now
    }
}

/// Revoked token entry. Presence alone means the token is dead, whatever
/// its own signature or expiry say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistEntry {
    /// unique ID
    pub id: String,
    /// the revoked token value
    pub token: String,
    /// when the entry itself can be purged
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl BlacklistEntry {
    pub fn new(token: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            token: token.to_string(),
            expires_at,
            created_at: Utc::now(),
        }
    }

    /// Entry outlived the token it guards and can be swept
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
