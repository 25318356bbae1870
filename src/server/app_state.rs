use std::sync::Arc;

use crate::auth::authority::SessionAuthority;
use crate::auth::linkedin::LinkedInClient;
use crate::auth::token::TokenSigner;
use crate::config::settings::Config;
use crate::error::Result;
use crate::storage::{init_storage, Storage};

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Persistence backend
    pub storage: Arc<dyn Storage>,
    /// Session authority handling login completion, token checks and logout
    pub authority: Arc<SessionAuthority>,
    /// LinkedIn OAuth client
    pub linkedin: Arc<LinkedInClient>,
}

impl AppState {
    /// Initialize state with the storage backend selected by configuration
    pub async fn new(config: Config) -> Result<Self> {
        let storage = init_storage(&config).await?;
        Ok(Self::with_storage(config, storage))
    }

    /// Build state around an existing storage instance
    pub fn with_storage(config: Config, storage: Arc<dyn Storage>) -> Self {
        let signer = TokenSigner::new(&config.auth.jwt_secret, config.auth.jwt_expires_in_secs);
        let authority = Arc::new(SessionAuthority::new(storage.clone(), signer));
        let linkedin = Arc::new(LinkedInClient::new(&config.linkedin));

        Self {
            config: Arc::new(config),
            storage,
            authority,
            linkedin,
        }
    }
}
