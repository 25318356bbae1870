// Common test helpers for integration tests

use std::sync::Arc;

use linkup_server::config::settings::{Config, StorageBackend};
use linkup_server::models::VerifiedIdentity;
use linkup_server::server::app_state::AppState;
use linkup_server::storage::memory::MemoryStorage;

/// Config wired for tests: memory storage and a fixed signing secret
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.storage.backend = StorageBackend::Memory;
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.auth.jwt_expires_in_secs = 3600;
    config
}

/// AppState backed by fresh in-memory storage
pub fn app_state_with_memory() -> AppState {
    AppState::with_storage(test_config(), Arc::new(MemoryStorage::new()))
}

/// Identity as the provider hands it back after a successful code exchange
pub fn verified_identity(email: &str) -> VerifiedIdentity {
    VerifiedIdentity {
        provider_id: format!("member-{}", email),
        email: Some(email.to_string()),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        picture_url: Some("https://media.example.com/ada.jpg".to_string()),
        headline: Some("Analytical Engine Programmer".to_string()),
        summary: None,
        industry: Some("Computing".to_string()),
        location: Some("London".to_string()),
        public_profile_url: Some("https://www.linkedin.com/in/ada".to_string()),
    }
}
