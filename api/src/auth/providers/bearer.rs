//! Bearer token authentication provider.
//!
//! Reads `Authorization: Bearer <jwt>`, verifies the token with the shared
//! secret and turns its claims into an authenticated [`Caller`].

use async_trait::async_trait;
use axum::http::{header, request::Parts};
use allerta_common::caller::Caller;
use tracing::{debug, instrument};

use crate::auth::{error::AuthError, jwt::TokenKeys, provider::AuthProvider};

pub struct BearerTokenProvider {
    keys: TokenKeys,
}

impl BearerTokenProvider {
    pub fn new(keys: TokenKeys) -> Self {
        Self { keys }
    }

    /// Extract the token from the Authorization header.
    ///
    /// A missing header is `MissingCredentials`; a header in any other scheme
    /// or with non-ASCII bytes is `InvalidCredentials`.
    fn extract_token(parts: &Parts) -> Result<&str, AuthError> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingCredentials)?
            .to_str()
            .map_err(|_| AuthError::InvalidCredentials)?;

        value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::InvalidCredentials)
    }
}

#[async_trait]
impl AuthProvider for BearerTokenProvider {
    #[instrument(skip_all)]
    async fn authenticate(&self, parts: &Parts) -> Result<Caller, AuthError> {
        let token = Self::extract_token(parts)?;
        let claims = self.keys.verify(token)?;

        debug!(user_id = %claims.id, role = %claims.role, "Bearer token verified");

        Ok(Caller::Authenticated(claims.into()))
    }

    fn scheme(&self) -> &'static str {
        "bearer"
    }
}

#[cfg(test)]
mod tests {
    use allerta_common::caller::{Identity, Role};
    use axum::http::Request;

    use super::*;

    fn parts_with(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder();
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn valid_token_authenticates() {
        let keys = TokenKeys::from_secret(b"secret", 60);
        let token = keys
            .issue(&Identity {
                id: "abc".into(),
                email: "a@example.com".into(),
                role: Role::User,
            })
            .unwrap();
        let provider = BearerTokenProvider::new(keys);

        let caller = provider
            .authenticate(&parts_with(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();

        assert_eq!(caller.identity().unwrap().id, "abc");
    }

    #[tokio::test]
    async fn missing_header_is_missing_credentials() {
        let provider = BearerTokenProvider::new(TokenKeys::from_secret(b"secret", 60));
        let result = provider.authenticate(&parts_with(None)).await;
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[tokio::test]
    async fn other_schemes_are_invalid() {
        let provider = BearerTokenProvider::new(TokenKeys::from_secret(b"secret", 60));
        let result = provider
            .authenticate(&parts_with(Some("Basic dXNlcjpwYXNz")))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }
}
