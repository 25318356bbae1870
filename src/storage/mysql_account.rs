use tracing::debug;

use crate::models::account::Account;
use crate::models::profile::{AppProfile, LinkedProfile};
use crate::storage::mysql::{datetime_from_epoch, MySqlStorage};
use crate::storage::{Result, StorageError};

/// MySQL account and profile operations
pub trait MySqlAccountExt {
    /// Create account with both profiles atomically
    async fn create_account(
        &self,
        account: &Account,
        linked_profile: &LinkedProfile,
        app_profile: &AppProfile,
    ) -> Result<()>;

    /// Get account by ID
    async fn get_account_by_id(&self, id: &str) -> Result<Option<Account>>;

    /// Get account by email
    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Update account fields
    async fn update_account(&self, account: &Account) -> Result<()>;

    /// Get linked professional profile by account
    async fn get_linked_profile(&self, account_id: &str) -> Result<Option<LinkedProfile>>;

    /// Update-or-create linked professional profile
    async fn upsert_linked_profile(&self, profile: &LinkedProfile) -> Result<()>;

    /// Get app profile by account
    async fn get_app_profile(&self, account_id: &str) -> Result<Option<AppProfile>>;
}

type AccountRow = (String, String, bool, bool, String, i64, i64, i64);

fn account_from_row(row: AccountRow) -> Result<Account> {
    let (id, email, verified, active, subscription_tier, created_at, updated_at, last_active_at) =
        row;
    Ok(Account {
        id,
        email,
        verified,
        active,
        subscription_tier,
        created_at: datetime_from_epoch(created_at)?,
        updated_at: datetime_from_epoch(updated_at)?,
        last_active_at: datetime_from_epoch(last_active_at)?,
    })
}

impl MySqlAccountExt for MySqlStorage {
    /// Create account with both profiles atomically
    async fn create_account(
        &self,
        account: &Account,
        linked_profile: &LinkedProfile,
        app_profile: &AppProfile,
    ) -> Result<()> {
        let interests = serde_json::to_string(&app_profile.interests)?;

        let mut tx = self
            .get_sqlx_pool()
            .begin()
            .await
            .map_err(|e| StorageError::Database(format!("Failed to start transaction: {}", e)))?;

        sqlx::query(
            r#"INSERT INTO accounts (
                id, email, verified, active, subscription_tier,
                created_at, updated_at, last_active_at
              ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(account.verified)
        .bind(account.active)
        .bind(&account.subscription_tier)
        .bind(account.created_at.timestamp())
        .bind(account.updated_at.timestamp())
        .bind(account.last_active_at.timestamp())
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Database(format!("Failed to insert account: {}", e)))?;

        sqlx::query(
            r#"INSERT INTO linked_profiles (
                id, account_id, provider_id, first_name, last_name, picture_url,
                headline, summary, industry, location, public_profile_url, synced_at
              ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&linked_profile.id)
        .bind(&linked_profile.account_id)
        .bind(&linked_profile.provider_id)
        .bind(&linked_profile.first_name)
        .bind(&linked_profile.last_name)
        .bind(&linked_profile.picture_url)
        .bind(&linked_profile.headline)
        .bind(&linked_profile.summary)
        .bind(&linked_profile.industry)
        .bind(&linked_profile.location)
        .bind(&linked_profile.public_profile_url)
        .bind(linked_profile.synced_at.timestamp())
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Database(format!("Failed to insert linked profile: {}", e)))?;

        sqlx::query(
            r#"INSERT INTO app_profiles (
                id, account_id, bio, age, gender, interests,
                complete, visible, created_at, updated_at
              ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&app_profile.id)
        .bind(&app_profile.account_id)
        .bind(&app_profile.bio)
        .bind(app_profile.age)
        .bind(&app_profile.gender)
        .bind(&interests)
        .bind(app_profile.complete)
        .bind(app_profile.visible)
        .bind(app_profile.created_at.timestamp())
        .bind(app_profile.updated_at.timestamp())
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Database(format!("Failed to insert app profile: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Database(format!("Failed to commit account create: {}", e)))?;

        debug!("Created account {} with profiles", account.id);
        Ok(())
    }

    /// Get account by ID
    async fn get_account_by_id(&self, id: &str) -> Result<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"SELECT id, email, verified, active, subscription_tier,
                      created_at, updated_at, last_active_at
               FROM accounts WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(self.get_sqlx_pool())
        .await
        .map_err(|e| StorageError::Database(format!("Failed to query account: {}", e)))?;

        row.map(account_from_row).transpose()
    }

    /// Get account by email
    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"SELECT id, email, verified, active, subscription_tier,
                      created_at, updated_at, last_active_at
               FROM accounts WHERE email = ?"#,
        )
        .bind(email)
        .fetch_optional(self.get_sqlx_pool())
        .await
        .map_err(|e| StorageError::Database(format!("Failed to query account by email: {}", e)))?;

        row.map(account_from_row).transpose()
    }

    /// Update account fields
    async fn update_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"UPDATE accounts
               SET email = ?, verified = ?, active = ?, subscription_tier = ?,
                   updated_at = ?, last_active_at = ?
               WHERE id = ?"#,
        )
        .bind(&account.email)
        .bind(account.verified)
        .bind(account.active)
        .bind(&account.subscription_tier)
        .bind(account.updated_at.timestamp())
        .bind(account.last_active_at.timestamp())
        .bind(&account.id)
        .execute(self.get_sqlx_pool())
        .await
        .map_err(|e| StorageError::Database(format!("Failed to update account: {}", e)))?;

        Ok(())
    }

    /// Get linked professional profile by account
    async fn get_linked_profile(&self, account_id: &str) -> Result<Option<LinkedProfile>> {
        type Row = (
            String,
            String,
            String,
            String,
            String,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            i64,
        );

        let row: Option<Row> = sqlx::query_as(
            r#"SELECT id, account_id, provider_id, first_name, last_name, picture_url,
                      headline, summary, industry, location, public_profile_url, synced_at
               FROM linked_profiles WHERE account_id = ?"#,
        )
        .bind(account_id)
        .fetch_optional(self.get_sqlx_pool())
        .await
        .map_err(|e| StorageError::Database(format!("Failed to query linked profile: {}", e)))?;

        match row {
            Some((
                id,
                account_id,
                provider_id,
                first_name,
                last_name,
                picture_url,
                headline,
                summary,
                industry,
                location,
                public_profile_url,
                synced_at,
            )) => Ok(Some(LinkedProfile {
                id,
                account_id,
                provider_id,
                first_name,
                last_name,
                picture_url,
                headline,
                summary,
                industry,
                location,
                public_profile_url,
                synced_at: datetime_from_epoch(synced_at)?,
            })),
            None => Ok(None),
        }
    }

    /// Update-or-create linked professional profile
    async fn upsert_linked_profile(&self, profile: &LinkedProfile) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO linked_profiles (
                id, account_id, provider_id, first_name, last_name, picture_url,
                headline, summary, industry, location, public_profile_url, synced_at
              ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
              ON DUPLICATE KEY UPDATE
                provider_id = VALUES(provider_id),
                first_name = VALUES(first_name),
                last_name = VALUES(last_name),
                picture_url = VALUES(picture_url),
                headline = VALUES(headline),
                summary = VALUES(summary),
                industry = VALUES(industry),
                location = VALUES(location),
                public_profile_url = VALUES(public_profile_url),
                synced_at = VALUES(synced_at)"#,
        )
        .bind(&profile.id)
        .bind(&profile.account_id)
        .bind(&profile.provider_id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.picture_url)
        .bind(&profile.headline)
        .bind(&profile.summary)
        .bind(&profile.industry)
        .bind(&profile.location)
        .bind(&profile.public_profile_url)
        .bind(profile.synced_at.timestamp())
        .execute(self.get_sqlx_pool())
        .await
        .map_err(|e| StorageError::Database(format!("Failed to upsert linked profile: {}", e)))?;

        Ok(())
    }

    /// Get app profile by account
    async fn get_app_profile(&self, account_id: &str) -> Result<Option<AppProfile>> {
        type Row = (
            String,
            String,
            Option<String>,
            Option<i32>,
            Option<String>,
            String,
            bool,
            bool,
            i64,
            i64,
        );

        let row: Option<Row> = sqlx::query_as(
            r#"SELECT id, account_id, bio, age, gender, interests,
                      complete, visible, created_at, updated_at
               FROM app_profiles WHERE account_id = ?"#,
        )
        .bind(account_id)
        .fetch_optional(self.get_sqlx_pool())
        .await
        .map_err(|e| StorageError::Database(format!("Failed to query app profile: {}", e)))?;

        match row {
            Some((
                id,
                account_id,
                bio,
                age,
                gender,
                interests,
                complete,
                visible,
                created_at,
                updated_at,
            )) => Ok(Some(AppProfile {
                id,
                account_id,
                bio,
                age,
                gender,
                interests: serde_json::from_str(&interests)?,
                complete,
                visible,
                created_at: datetime_from_epoch(created_at)?,
                updated_at: datetime_from_epoch(updated_at)?,
            })),
            None => Ok(None),
        }
    }
}
