use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::token::TokenSigner;
use crate::auth::{AuthError, Result};
use crate::models::account::Account;
use crate::models::identity::{AuthContext, VerifiedIdentity};
use crate::models::profile::{AppProfile, LinkedProfile};
use crate::models::session::{BlacklistEntry, Session};
use crate::storage::Storage;

/// Extract the token from an `Authorization: Bearer <token>` header value
fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.strip_prefix("Bearer ")?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Everything between "the provider verified this member" and "this request
/// carries a trusted account identity": login completion, token issuance,
/// request authentication, revocation, account deactivation.
#[derive(Clone)]
pub struct SessionAuthority {
    storage: Arc<dyn Storage>,
    signer: TokenSigner,
}

impl SessionAuthority {
    pub fn new(storage: Arc<dyn Storage>, signer: TokenSigner) -> Self {
        Self { storage, signer }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Complete a provider login: upsert the account and its professional
    /// profile, mint a token, open a session. New accounts get an
    /// invisible, incomplete app-profile placeholder; existing accounts
    /// keep theirs untouched.
    pub async fn complete_login(&self, identity: &VerifiedIdentity) -> Result<(Account, String)> {
        let email = identity.normalized_email().ok_or_else(|| {
            AuthError::IdentityIncomplete(format!(
                "provider released no email for member {}",
                identity.provider_id
            ))
        })?;

        let account = match self.storage.get_account_by_email(&email).await? {
            Some(mut account) => {
                debug!(account_id = %account.id, "Known email, refreshing profile");

                match self.storage.get_linked_profile(&account.id).await? {
                    Some(mut profile) => {
                        profile.refresh(identity);
                        self.storage.upsert_linked_profile(&profile).await?;
                    }
                    None => {
                        let profile = LinkedProfile::from_identity(&account.id, identity);
                        self.storage.upsert_linked_profile(&profile).await?;
                    }
                }

                account.touch();
                self.storage.update_account(&account).await?;
                account
            }
            None => {
                let account = Account::new(email);
                let linked = LinkedProfile::from_identity(&account.id, identity);
                let placeholder = AppProfile::placeholder(&account.id);
                self.storage
                    .create_account(&account, &linked, &placeholder)
                    .await?;
                info!(account_id = %account.id, "Registered new account");
                account
            }
        };

        let token = self.signer.mint(&account)?;
        let session = Session::new(&account.id, &token, Utc::now() + self.signer.ttl());
        self.storage.create_session(&session).await?;

        debug!(account_id = %account.id, session_id = %session.id, "Session opened");
        Ok((account, token))
    }

    /// Authenticate a request from its Authorization header. Pure read
    /// path; the check order is fixed so each failure mode stays
    /// distinguishable:
    /// missing header, blacklist, signature/expiry, server-side session.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<AuthContext> {
        let token = bearer_token(header).ok_or(AuthError::MissingToken)?;

        // Revocation wins over everything else, including expiry.
        if self.storage.get_blacklist_entry(token).await?.is_some() {
            debug!("Rejected blacklisted token");
            return Err(AuthError::TokenRevoked);
        }

        let claims = self.signer.verify(token)?;

        match self.storage.get_session_by_token(token).await? {
            Some(session) if session.is_valid_at(Utc::now()) => Ok(AuthContext {
                account_id: claims.sub,
                email: claims.email,
                verified: claims.verified,
                token: token.to_string(),
            }),
            _ => {
                debug!(account_id = %claims.sub, "Token has no live session");
                Err(AuthError::SessionInvalid)
            }
        }
    }

    /// Same checks as `authenticate`, but failures yield no identity
    /// instead of an error.
    pub async fn authenticate_optional(&self, header: Option<&str>) -> Option<AuthContext> {
        match self.authenticate(header).await {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                debug!("Optional authentication yielded none: {}", e);
                None
            }
        }
    }

    /// Revoke the presented token and close its sessions. The blacklist
    /// insert comes first: if session cleanup fails the token is dead
    /// anyway.
    pub async fn logout(&self, ctx: &AuthContext) -> Result<()> {
        let entry = BlacklistEntry::new(&ctx.token, Utc::now() + self.signer.ttl());
        self.storage.create_blacklist_entry(&entry).await?;

        let count = self
            .storage
            .deactivate_sessions_by_token(&ctx.account_id, &ctx.token)
            .await?;

        info!(account_id = %ctx.account_id, sessions = count, "Logged out");
        Ok(())
    }

    /// Soft-delete the account: mark inactive, anonymize the email so it
    /// can register again, close every session. Outstanding tokens are not
    /// blacklisted; they fail afterwards because no live session backs
    /// them.
    pub async fn deactivate_account(&self, ctx: &AuthContext) -> Result<()> {
        let mut account = self
            .storage
            .get_account_by_id(&ctx.account_id)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        account.deactivate();
        self.storage.update_account(&account).await?;

        let count = self
            .storage
            .deactivate_sessions_for_account(&account.id)
            .await?;

        info!(account_id = %account.id, sessions = count, "Account deactivated");
        Ok(())
    }

    /// Gate for routes that need a finished dating profile. Runs after
    /// `authenticate`; an absent or unfinished profile is a 403, distinct
    /// from every authentication failure.
    pub async fn require_completed_profile(&self, ctx: &AuthContext) -> Result<()> {
        match self.storage.get_app_profile(&ctx.account_id).await? {
            Some(profile) if profile.complete => Ok(()),
            _ => Err(AuthError::ProfileIncomplete),
        }
    }
}
