use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::auth::{AuthError, Result};
use crate::config::settings::LinkedInConfig;
use crate::models::VerifiedIdentity;

// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Userinfo payload (OpenID Connect). LinkedIn only guarantees `sub`;
/// the richer profile fields show up when the member granted them.
#[derive(Debug, Deserialize)]
struct LinkedInUserInfo {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
    #[serde(default)]
    headline: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    industry: Option<String>,
}

/// LinkedIn OAuth client: authorize URL, code exchange, userinfo fetch
#[derive(Clone)]
pub struct LinkedInClient {
    http: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
    scope: String,
}

impl LinkedInClient {
    /// Create client from config
    pub fn new(config: &LinkedInConfig) -> Self {
        Self {
            http: Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            userinfo_url: config.userinfo_url.clone(),
            scope: config.scope.clone(),
        }
    }

    /// Provider authorize URL carrying a CSRF state token
    pub fn authorize_url(&self, state: &str) -> String {
        // The OIDC scope list is space-delimited; spaces are not valid in
        // a redirect URL.
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
            self.auth_url,
            self.client_id,
            self.redirect_uri,
            self.scope.replace(' ', "%20"),
            state
        )
    }

    /// Exchange an authorization code for a verified identity.
    /// Any provider failure surfaces as `IdentityProvider` and leaves no
    /// local state behind.
    pub async fn exchange_code(&self, code: &str) -> Result<VerifiedIdentity> {
        let access_token = self.fetch_access_token(code).await?;
        let identity = self.fetch_identity(&access_token).await?;

        info!(provider_id = %identity.provider_id, "Provider identity verified");
        Ok(identity)
    }

    /// Exchange the code for an access token
    async fn fetch_access_token(&self, code: &str) -> Result<String> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", &self.redirect_uri),
        ];

        debug!("Exchanging authorization code");

        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::IdentityProvider(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Code exchange rejected: {} - {}", status, error_text);
            return Err(AuthError::IdentityProvider(format!(
                "Code exchange rejected: {}",
                status
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AuthError::IdentityProvider(format!("Failed to parse token response: {}", e))
        })?;

        debug!(expires_in = ?token.expires_in, "Access token obtained");
        Ok(token.access_token)
    }

    /// Fetch userinfo with the access token and map it to an identity
    async fn fetch_identity(&self, access_token: &str) -> Result<VerifiedIdentity> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| AuthError::IdentityProvider(format!("Userinfo request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Userinfo request rejected: {}", status);
            return Err(AuthError::IdentityProvider(format!(
                "Userinfo request rejected: {}",
                status
            )));
        }

        let info: LinkedInUserInfo = response.json().await.map_err(|e| {
            AuthError::IdentityProvider(format!("Failed to parse userinfo: {}", e))
        })?;

        // Names fall back from the structured fields to a split of the
        // display name, since some grants only carry `name`.
        let (first_name, last_name) = match (info.given_name, info.family_name) {
            (Some(first), Some(last)) => (first, last),
            (Some(first), None) => (first, String::new()),
            (None, Some(last)) => (String::new(), last),
            (None, None) => {
                let full = info.name.unwrap_or_default();
                let mut parts = full.splitn(2, ' ');
                (
                    parts.next().unwrap_or_default().to_string(),
                    parts.next().unwrap_or_default().to_string(),
                )
            }
        };

        Ok(VerifiedIdentity {
            provider_id: info.sub,
            email: info.email,
            first_name,
            last_name,
            picture_url: info.picture,
            headline: info.headline,
            summary: info.summary,
            industry: info.industry,
            location: None,
            public_profile_url: None,
        })
    }
}
