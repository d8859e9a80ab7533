//! JWT service for session-token generation and validation.
//!
//! Tokens are HS256-signed, short-lived, and carried in an HTTP-only cookie.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::Role;

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_minutes: i64,
}

/// Claims on the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID).
    pub sub: Uuid,
    /// Account role, checked by route guards.
    pub role: Role,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry_minutes: config.expiry_minutes,
        }
    }

    pub fn issue(&self, account_id: Uuid, role: Role) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: account_id,
            role,
            exp: (now + Duration::minutes(self.expiry_minutes)).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }

    pub fn expiry_minutes(&self) -> i64 {
        self.expiry_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn service() -> JwtService {
        JwtService::new(&JwtConfig {
            secret: Secret::new("test-signing-secret".to_string()),
            expiry_minutes: 60,
        })
    }

    #[test]
    fn issued_token_round_trips() {
        let jwt = service();
        let id = Uuid::new_v4();
        let token = jwt.issue(id, Role::Customer).expect("Failed to issue token");

        let claims = jwt.validate(&token).expect("Failed to validate token");
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Role::Customer);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let jwt = service();
        let other = JwtService::new(&JwtConfig {
            secret: Secret::new("a-different-secret".to_string()),
            expiry_minutes: 60,
        });

        let token = other
            .issue(Uuid::new_v4(), Role::Admin)
            .expect("Failed to issue token");
        assert!(jwt.validate(&token).is_err());
    }
}
