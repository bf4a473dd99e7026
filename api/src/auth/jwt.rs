//! Bearer access tokens.
//!
//! Tokens are HS256 JWTs signed with the configured secret. The claims carry
//! the user's id, email and role so that requests can be authorized without
//! a storage round trip.

use allerta_common::caller::{Identity, Role};
use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use super::error::AuthError;

/// Claims for access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Id of the user the token was issued to
    pub id: String,
    pub email: String,
    pub role: Role,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiry timestamp
    pub exp: i64,
}

impl From<AccessTokenClaims> for Identity {
    fn from(claims: AccessTokenClaims) -> Self {
        Identity {
            id: claims.id,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Signs and verifies access tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a token for `identity`, valid for the configured lifetime.
    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = AccessTokenClaims {
            id: identity.id.clone(),
            email: identity.email.clone(),
            role: identity.role,
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<AccessTokenClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidCredentials,
            })
    }
}
