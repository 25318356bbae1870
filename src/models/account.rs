use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// unique ID
    pub id: String,
    /// email address (unique; anonymized on deactivation)
    pub email: String,
    /// provider-verified flag
    pub verified: bool,
    /// active status
    pub active: bool,
    /// subscription tier ("free" or "premium")
    pub subscription_tier: String,
    /// account creation time
    pub created_at: DateTime<Utc>,
    /// update time
    pub updated_at: DateTime<Utc>,
    /// last activity time (refreshed on login)
    pub last_active_at: DateTime<Utc>,
}

impl Account {
    /// Create a provider-verified account with a fresh id
    pub fn new(email: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            verified: true,
            active: true,
            subscription_tier: "free".to_string(),
            created_at: now,
            updated_at: now,
            last_active_at: now,
        }
    }

    /// Refresh activity timestamps
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.last_active_at = now;
        self.updated_at = now;
    }

    /// Soft-delete: mark inactive and anonymize the email so the original
    /// address can register again. The UUID component keeps repeated
    /// deletions of the same address from colliding.
    pub fn deactivate(&mut self) {
        let now = Utc::now();
        self.email = format!(
            "deleted_{}_{}_{}",
            now.timestamp(),
            Uuid::new_v4().simple(),
            self.email
        );
        self.active = false;
        self.updated_at = now;
    }
}
