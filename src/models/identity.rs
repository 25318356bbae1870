use serde::{Deserialize, Serialize};

/// Profile handed back by the identity provider after a successful
/// code exchange. Only the provider member id is guaranteed; everything
/// else depends on the scopes the member granted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// provider member id
    pub provider_id: String,
    /// email address, if the provider released it
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub picture_url: Option<String>,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub public_profile_url: Option<String>,
}

impl VerifiedIdentity {
    /// Email with surrounding whitespace stripped, `None` when absent or blank
    pub fn normalized_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
    }
}

/// Identity attached to a request after successful token verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// authenticated account id
    pub account_id: String,
    /// email claim carried by the token
    pub email: String,
    /// verified claim carried by the token
    pub verified: bool,
    /// the raw bearer token (logout needs it)
    pub token: String,
}
