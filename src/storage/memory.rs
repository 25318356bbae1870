use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex as TokioMutex;
use tracing::debug;

use crate::models::account::Account;
use crate::models::profile::{AppProfile, LinkedProfile};
use crate::models::session::{BlacklistEntry, Session};
use crate::storage::{Result, Storage};

// In-memory storage data structure (using Mutex for thread safety)
struct StorageData {
    accounts: HashMap<String, Account>,              // account_id -> account
    linked_profiles: HashMap<String, LinkedProfile>, // account_id -> profile
    app_profiles: HashMap<String, AppProfile>,       // account_id -> profile
    sessions: HashMap<String, Session>,              // session_id -> session
    blacklist: HashMap<String, BlacklistEntry>,      // token -> entry
}

impl StorageData {
    fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            linked_profiles: HashMap::new(),
            app_profiles: HashMap::new(),
            sessions: HashMap::new(),
            blacklist: HashMap::new(),
        }
    }
}

/// In-memory storage implementation (useful for testing)
pub struct MemoryStorage {
    data: TokioMutex<StorageData>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            data: TokioMutex::new(StorageData::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    /// Create account with both profiles in one step
    async fn create_account(
        &self,
        account: &Account,
        linked_profile: &LinkedProfile,
        app_profile: &AppProfile,
    ) -> Result<()> {
        let mut data = self.data.lock().await;
        data.accounts.insert(account.id.clone(), account.clone());
        data.linked_profiles
            .insert(account.id.clone(), linked_profile.clone());
        data.app_profiles
            .insert(account.id.clone(), app_profile.clone());
        debug!("Created account {} in memory", account.id);
        Ok(())
    }

    /// Get account by ID
    async fn get_account_by_id(&self, id: &str) -> Result<Option<Account>> {
        let data = self.data.lock().await;
        Ok(data.accounts.get(id).cloned())
    }

    /// Get account by email (case-insensitive, matching the unique index)
    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let data = self.data.lock().await;

        for account in data.accounts.values() {
            if account.email.eq_ignore_ascii_case(email) {
                return Ok(Some(account.clone()));
            }
        }

        Ok(None)
    }

    /// Update account
    async fn update_account(&self, account: &Account) -> Result<()> {
        let mut data = self.data.lock().await;
        data.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    /// Get linked professional profile
    async fn get_linked_profile(&self, account_id: &str) -> Result<Option<LinkedProfile>> {
        let data = self.data.lock().await;
        Ok(data.linked_profiles.get(account_id).cloned())
    }

    /// Update-or-create linked professional profile
    async fn upsert_linked_profile(&self, profile: &LinkedProfile) -> Result<()> {
        let mut data = self.data.lock().await;
        data.linked_profiles
            .insert(profile.account_id.clone(), profile.clone());
        Ok(())
    }

    /// Get app (dating) profile
    async fn get_app_profile(&self, account_id: &str) -> Result<Option<AppProfile>> {
        let data = self.data.lock().await;
        Ok(data.app_profiles.get(account_id).cloned())
    }

    /// Create session
    async fn create_session(&self, session: &Session) -> Result<()> {
        let mut data = self.data.lock().await;
        data.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    /// Get session by token. Tokens are not unique by construction, so
    /// prefer an active row when several match.
    async fn get_session_by_token(&self, token: &str) -> Result<Option<Session>> {
        let data = self.data.lock().await;

        let mut found: Option<&Session> = None;
        for session in data.sessions.values() {
            if session.token == token {
                if session.active {
                    return Ok(Some(session.clone()));
                }
                found = Some(session);
            }
        }

        Ok(found.cloned())
    }

    /// Deactivate sessions matching account and token
    async fn deactivate_sessions_by_token(&self, account_id: &str, token: &str) -> Result<u64> {
        let mut data = self.data.lock().await;
        let mut count = 0;

        for session in data.sessions.values_mut() {
            if session.account_id == account_id && session.token == token && session.active {
                session.active = false;
                count += 1;
            }
        }

        Ok(count)
    }

    /// Deactivate every session of an account
    async fn deactivate_sessions_for_account(&self, account_id: &str) -> Result<u64> {
        let mut data = self.data.lock().await;
        let mut count = 0;

        for session in data.sessions.values_mut() {
            if session.account_id == account_id && session.active {
                session.active = false;
                count += 1;
            }
        }

        Ok(count)
    }

    /// Blacklist a token. Re-inserting the same token just refreshes the
    /// entry, which keeps concurrent logouts idempotent.
    async fn create_blacklist_entry(&self, entry: &BlacklistEntry) -> Result<()> {
        let mut data = self.data.lock().await;
        data.blacklist.insert(entry.token.clone(), entry.clone());
        Ok(())
    }

    /// Get blacklist entry by token
    async fn get_blacklist_entry(&self, token: &str) -> Result<Option<BlacklistEntry>> {
        let data = self.data.lock().await;
        Ok(data.blacklist.get(token).cloned())
    }

    /// Drop expired blacklist entries
    async fn purge_expired_blacklist(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut data = self.data.lock().await;
        let before = data.blacklist.len();
        data.blacklist.retain(|_, entry| !entry.is_expired_at(now));
        Ok((before - data.blacklist.len()) as u64)
    }
}
