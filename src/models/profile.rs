use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::identity::VerifiedIdentity;

/// Professional profile synced from the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedProfile {
    /// unique ID
    pub id: String,
    /// owning account id
    pub account_id: String,
    /// provider member id (unique)
    pub provider_id: String,
    pub first_name: String,
    pub last_name: String,
    pub picture_url: Option<String>,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub public_profile_url: Option<String>,
    /// last time the provider data was pulled
    pub synced_at: DateTime<Utc>,
}

impl LinkedProfile {
    /// Build a profile from a freshly verified identity
    pub fn from_identity(account_id: &str, identity: &VerifiedIdentity) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            account_id: account_id.to_string(),
            provider_id: identity.provider_id.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            picture_url: identity.picture_url.clone(),
            headline: identity.headline.clone(),
            summary: identity.summary.clone(),
            industry: identity.industry.clone(),
            location: identity.location.clone(),
            public_profile_url: identity.public_profile_url.clone(),
            synced_at: Utc::now(),
        }
    }

    /// Overwrite provider fields with the latest identity data
    pub fn refresh(&mut self, identity: &VerifiedIdentity) {
        self.provider_id = identity.provider_id.clone();
        self.first_name = identity.first_name.clone();
        self.last_name = identity.last_name.clone();
        self.picture_url = identity.picture_url.clone();
        self.headline = identity.headline.clone();
        self.summary = identity.summary.clone();
        self.industry = identity.industry.clone();
        self.location = identity.location.clone();
        self.public_profile_url = identity.public_profile_url.clone();
        self.synced_at = Utc::now();
    }
}

/// Dating profile the member fills in after first login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppProfile {
    /// unique ID
    pub id: String,
    /// owning account id
    pub account_id: String,
    pub bio: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub interests: Vec<String>,
    /// member finished the profile wizard
    pub complete: bool,
    /// shown in discovery
    pub visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AppProfile {
    /// Empty placeholder created at registration: incomplete and hidden
    /// until the member finishes it.
    pub fn placeholder(account_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            account_id: account_id.to_string(),
            bio: None,
            age: None,
            gender: None,
            interests: Vec::new(),
            complete: false,
            visible: false,
            created_at: now,
            updated_at: now,
        }
    }
}
