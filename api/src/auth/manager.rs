use axum::http::request::Parts;
use allerta_common::caller::Caller;
use tracing::{debug, instrument, trace};

use super::{error::AuthError, provider::AuthProvider};

/// Coordinates authentication providers in priority order.
///
/// Each provider is asked in registration order. `MissingCredentials` moves
/// on to the next one; success or any other error ends the search.
///
/// # Examples
///
/// ```rust,ignore
/// let auth_manager = AuthManager::new()
///     .with_provider(BearerTokenProvider::new(keys));
///
/// // In extractor:
/// let caller = auth_manager.authenticate(&request_parts).await?;
/// ```
pub struct AuthManager {
    providers: Vec<Box<dyn AuthProvider>>,
}

impl AuthManager {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    pub fn with_provider<P: AuthProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Try each provider in order until one succeeds
    #[instrument(skip_all)]
    pub async fn authenticate(&self, parts: &Parts) -> Result<Caller, AuthError> {
        for provider in &self.providers {
            trace!(scheme = provider.scheme(), "Trying auth provider");

            match provider.authenticate(parts).await {
                Ok(caller) => {
                    debug!(scheme = provider.scheme(), "Auth succeeded");
                    return Ok(caller);
                }
                Err(AuthError::MissingCredentials) => {
                    trace!(scheme = provider.scheme(), "No credentials for this scheme");
                    continue;
                }
                Err(e) => {
                    debug!(scheme = provider.scheme(), error = %e, "Auth failed");
                    return Err(e);
                }
            }
        }

        Err(AuthError::MissingCredentials)
    }
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}
