// Integration tests for the session authority over in-memory storage.
// These cover the full login, authenticate, logout and deactivation
// lifecycle without touching MySQL.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};

use linkup_server::auth::AuthError;
use linkup_server::models::{
    Account, AppProfile, AuthContext, BlacklistEntry, LinkedProfile, Session,
};
use linkup_server::server::app_state::AppState;
use linkup_server::storage::memory::MemoryStorage;

use common::{app_state_with_memory, test_config, verified_identity};

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

#[tokio::test]
async fn login_issues_token_that_authenticates() {
    let state = app_state_with_memory();
    let identity = verified_identity("ada@example.com");

    let (account, token) = state.authority.complete_login(&identity).await.unwrap();
    assert_eq!(account.email, "ada@example.com");
    assert!(account.verified);
    assert!(account.active);
    assert_eq!(account.subscription_tier, "free");

    let header = bearer(&token);
    let ctx = state.authority.authenticate(Some(&header)).await.unwrap();
    assert_eq!(ctx.account_id, account.id);
    assert_eq!(ctx.email, account.email);
    assert!(ctx.verified);
    assert_eq!(ctx.token, token);

    let session = state
        .storage
        .get_session_by_token(&token)
        .await
        .unwrap()
        .unwrap();
    assert!(session.active);
    assert_eq!(session.account_id, account.id);
}

#[tokio::test]
async fn second_login_reuses_account_and_refreshes_profile() {
    let state = app_state_with_memory();

    let (first, token_a) = state
        .authority
        .complete_login(&verified_identity("ada@example.com"))
        .await
        .unwrap();

    let mut updated = verified_identity("ada@example.com");
    updated.headline = Some("Countess of Lovelace".to_string());
    let (second, token_b) = state.authority.complete_login(&updated).await.unwrap();

    assert_eq!(first.id, second.id);

    // Both issued tokens are backed by live sessions
    let header_a = bearer(&token_a);
    let header_b = bearer(&token_b);
    assert!(state.authority.authenticate(Some(&header_a)).await.is_ok());
    assert!(state.authority.authenticate(Some(&header_b)).await.is_ok());

    // The professional profile carries the newest provider data
    let linked = state
        .storage
        .get_linked_profile(&first.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(linked.headline.as_deref(), Some("Countess of Lovelace"));

    // The dating-profile placeholder from registration is untouched
    let app_profile = state
        .storage
        .get_app_profile(&first.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!app_profile.complete);
    assert!(!app_profile.visible);
}

#[tokio::test]
async fn login_without_email_is_rejected() {
    let state = app_state_with_memory();

    let mut missing = verified_identity("ada@example.com");
    missing.email = None;
    match state.authority.complete_login(&missing).await {
        Err(AuthError::IdentityIncomplete(_)) => {}
        other => panic!(
            "expected IdentityIncomplete, got {:?}",
            other.map(|(a, _)| a.id)
        ),
    }

    let mut blank = verified_identity("ada@example.com");
    blank.email = Some("   ".to_string());
    match state.authority.complete_login(&blank).await {
        Err(AuthError::IdentityIncomplete(_)) => {}
        other => panic!(
            "expected IdentityIncomplete, got {:?}",
            other.map(|(a, _)| a.id)
        ),
    }

    // Nothing was registered along the way
    assert!(state
        .storage
        .get_account_by_email("ada@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn logout_revokes_token_and_closes_session() {
    let state = app_state_with_memory();
    let (_, token) = state
        .authority
        .complete_login(&verified_identity("ada@example.com"))
        .await
        .unwrap();

    let header = bearer(&token);
    let ctx = state.authority.authenticate(Some(&header)).await.unwrap();
    state.authority.logout(&ctx).await.unwrap();

    match state.authority.authenticate(Some(&header)).await {
        Err(AuthError::TokenRevoked) => {}
        other => panic!("expected TokenRevoked, got {:?}", other.map(|c| c.account_id)),
    }

    let session = state
        .storage
        .get_session_by_token(&token)
        .await
        .unwrap()
        .unwrap();
    assert!(!session.active);

    // Logging out twice with the same token is harmless
    state.authority.logout(&ctx).await.unwrap();
}

#[tokio::test]
async fn revocation_wins_over_expiry() {
    let mut config = test_config();
    config.auth.jwt_expires_in_secs = 0;
    let state = AppState::with_storage(config, Arc::new(MemoryStorage::new()));

    let (account, token) = state
        .authority
        .complete_login(&verified_identity("ada@example.com"))
        .await
        .unwrap();

    // The token is already expired, so build the context by hand and
    // revoke it anyway
    let ctx = AuthContext {
        account_id: account.id.clone(),
        email: account.email.clone(),
        verified: account.verified,
        token: token.clone(),
    };
    state.authority.logout(&ctx).await.unwrap();

    let header = bearer(&token);
    match state.authority.authenticate(Some(&header)).await {
        Err(AuthError::TokenRevoked) => {}
        other => panic!("expected TokenRevoked, got {:?}", other.map(|c| c.account_id)),
    }
}

#[tokio::test]
async fn zero_ttl_login_yields_expired_token() {
    let mut config = test_config();
    config.auth.jwt_expires_in_secs = 0;
    let state = AppState::with_storage(config, Arc::new(MemoryStorage::new()));

    let (_, token) = state
        .authority
        .complete_login(&verified_identity("ada@example.com"))
        .await
        .unwrap();

    let header = bearer(&token);
    match state.authority.authenticate(Some(&header)).await {
        Err(AuthError::TokenExpired) => {}
        other => panic!("expected TokenExpired, got {:?}", other.map(|c| c.account_id)),
    }
}

#[tokio::test]
async fn malformed_credentials_map_to_distinct_errors() {
    let state = app_state_with_memory();

    match state.authority.authenticate(None).await {
        Err(AuthError::MissingToken) => {}
        other => panic!("expected MissingToken, got {:?}", other.map(|c| c.account_id)),
    }

    match state.authority.authenticate(Some("Basic dXNlcjpwdw==")).await {
        Err(AuthError::MissingToken) => {}
        other => panic!("expected MissingToken, got {:?}", other.map(|c| c.account_id)),
    }

    match state.authority.authenticate(Some("Bearer ")).await {
        Err(AuthError::MissingToken) => {}
        other => panic!("expected MissingToken, got {:?}", other.map(|c| c.account_id)),
    }

    match state.authority.authenticate(Some("Bearer not-a-jwt")).await {
        Err(AuthError::InvalidToken) => {}
        other => panic!("expected InvalidToken, got {:?}", other.map(|c| c.account_id)),
    }
}

#[tokio::test]
async fn token_without_session_is_rejected() {
    let state = app_state_with_memory();

    // Properly signed token, but no session row was ever created for it
    let account = Account::new("ada@example.com".to_string());
    let token = state.authority.signer().mint(&account).unwrap();

    let header = bearer(&token);
    match state.authority.authenticate(Some(&header)).await {
        Err(AuthError::SessionInvalid) => {}
        other => panic!(
            "expected SessionInvalid, got {:?}",
            other.map(|c| c.account_id)
        ),
    }
}

#[tokio::test]
async fn deactivation_frees_email_and_kills_sessions() {
    let state = app_state_with_memory();
    let (account, token) = state
        .authority
        .complete_login(&verified_identity("ada@example.com"))
        .await
        .unwrap();

    let header = bearer(&token);
    let ctx = state.authority.authenticate(Some(&header)).await.unwrap();
    state.authority.deactivate_account(&ctx).await.unwrap();

    let stored = state
        .storage
        .get_account_by_id(&account.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.active);
    assert!(stored.email.starts_with("deleted_"));
    assert!(stored.email.ends_with("ada@example.com"));

    // The old token is not blacklisted; it dies with its session
    match state.authority.authenticate(Some(&header)).await {
        Err(AuthError::SessionInvalid) => {}
        other => panic!(
            "expected SessionInvalid, got {:?}",
            other.map(|c| c.account_id)
        ),
    }

    // The original address is free to register again as a new account
    let (fresh, _) = state
        .authority
        .complete_login(&verified_identity("ada@example.com"))
        .await
        .unwrap();
    assert_ne!(fresh.id, account.id);
    assert_eq!(fresh.email, "ada@example.com");

    // Deactivating the fresh account keeps the anonymized emails distinct
    let ctx2 = AuthContext {
        account_id: fresh.id.clone(),
        email: fresh.email.clone(),
        verified: fresh.verified,
        token: String::new(),
    };
    state.authority.deactivate_account(&ctx2).await.unwrap();

    let second = state
        .storage
        .get_account_by_id(&fresh.id)
        .await
        .unwrap()
        .unwrap();
    assert!(second.email.starts_with("deleted_"));
    assert_ne!(second.email, stored.email);
}

#[tokio::test]
async fn profile_gate_requires_finished_profile() {
    let state = app_state_with_memory();
    let (_, token) = state
        .authority
        .complete_login(&verified_identity("ada@example.com"))
        .await
        .unwrap();

    let header = bearer(&token);
    let ctx = state.authority.authenticate(Some(&header)).await.unwrap();

    // Registration leaves the placeholder unfinished
    match state.authority.require_completed_profile(&ctx).await {
        Err(AuthError::ProfileIncomplete) => {}
        other => panic!("expected ProfileIncomplete, got {:?}", other),
    }

    // An account seeded with a finished profile passes the gate
    let finished = Account::new("grace@example.com".to_string());
    let linked = LinkedProfile::from_identity(&finished.id, &verified_identity("grace@example.com"));
    let mut profile = AppProfile::placeholder(&finished.id);
    profile.bio = Some("Compiler pioneer".to_string());
    profile.age = Some(37);
    profile.gender = Some("female".to_string());
    profile.interests = vec!["compilers".to_string(), "mathematics".to_string()];
    profile.complete = true;
    profile.visible = true;
    state
        .storage
        .create_account(&finished, &linked, &profile)
        .await
        .unwrap();

    let token = state.authority.signer().mint(&finished).unwrap();
    let session = Session::new(&finished.id, &token, Utc::now() + Duration::hours(1));
    state.storage.create_session(&session).await.unwrap();

    let header = bearer(&token);
    let ctx = state.authority.authenticate(Some(&header)).await.unwrap();
    state.authority.require_completed_profile(&ctx).await.unwrap();
}

#[tokio::test]
async fn optional_authentication_never_errors() {
    let state = app_state_with_memory();

    assert!(state.authority.authenticate_optional(None).await.is_none());
    assert!(state
        .authority
        .authenticate_optional(Some("Bearer junk"))
        .await
        .is_none());

    let (account, token) = state
        .authority
        .complete_login(&verified_identity("ada@example.com"))
        .await
        .unwrap();

    let header = bearer(&token);
    let ctx = state.authority.authenticate_optional(Some(&header)).await;
    assert_eq!(ctx.map(|c| c.account_id), Some(account.id));
}

#[tokio::test]
async fn purge_drops_only_entries_past_their_expiry() {
    let state = app_state_with_memory();
    let now = Utc::now();

    let stale = BlacklistEntry::new("stale-token", now - Duration::hours(1));
    let live = BlacklistEntry::new("live-token", now + Duration::hours(1));
    state.storage.create_blacklist_entry(&stale).await.unwrap();
    state.storage.create_blacklist_entry(&live).await.unwrap();

    let purged = state.storage.purge_expired_blacklist(now).await.unwrap();
    assert_eq!(purged, 1);

    assert!(state
        .storage
        .get_blacklist_entry("stale-token")
        .await
        .unwrap()
        .is_none());
    assert!(state
        .storage
        .get_blacklist_entry("live-token")
        .await
        .unwrap()
        .is_some());
}
