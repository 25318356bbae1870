use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, Result};
use crate::models::Account;

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// account id
    pub sub: String,
    /// email at mint time
    pub email: String,
    /// provider-verified flag
    pub verified: bool,
    /// issued at (epoch seconds)
    pub iat: i64,
    /// expiry (epoch seconds)
    pub exp: i64,
}

/// Signs and verifies HS256 session tokens
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Token and session lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a signed token for the account
    pub fn mint(&self, account: &Account) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: account.id.clone(),
            email: account.email.clone(),
            verified: account.verified,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Verify signature and expiry, returning the claims.
    ///
    /// Expiry is checked here with `exp <= now`: the library's own check
    /// treats `exp == now` as still valid, which would let a zero-TTL token
    /// pass within its issuing second.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        if data.claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(data.claims)
    }
}

/// generate state token (CSRF prevention)
pub fn generate_state_token() -> String {
    let mut buffer = [0u8; 16];
    OsRng.fill_bytes(&mut buffer);

    hex::encode(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new("ada@example.com".to_string())
    }

    #[test]
    fn mint_then_verify_returns_claims() {
        let signer = TokenSigner::new("test-secret", 3600);
        let account = account();

        let token = signer.mint(&account).unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.email, "ada@example.com");
        assert!(claims.verified);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn zero_ttl_token_is_expired_immediately() {
        let signer = TokenSigner::new("test-secret", 0);
        let token = signer.mint(&account()).unwrap();

        match signer.verify(&token) {
            Err(AuthError::TokenExpired) => {}
            other => panic!("expected TokenExpired, got {:?}", other.map(|c| c.sub)),
        }
    }

    #[test]
    fn garbage_token_is_invalid_not_expired() {
        let signer = TokenSigner::new("test-secret", 3600);

        match signer.verify("not-a-jwt") {
            Err(AuthError::InvalidToken) => {}
            other => panic!("expected InvalidToken, got {:?}", other.map(|c| c.sub)),
        }
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let signer = TokenSigner::new("test-secret", 3600);
        let forger = TokenSigner::new("other-secret", 3600);
        let token = forger.mint(&account()).unwrap();

        match signer.verify(&token) {
            Err(AuthError::InvalidToken) => {}
            other => panic!("expected InvalidToken, got {:?}", other.map(|c| c.sub)),
        }
    }

    #[test]
    fn state_tokens_are_unique() {
        assert_ne!(generate_state_token(), generate_state_token());
        assert_eq!(generate_state_token().len(), 32);
    }
}
