use std::sync::Arc;

use allerta_db::storage::Storage;

use crate::{
    auth::{AuthManager, BearerTokenProvider, TokenKeys},
    config::AllertaApiConfig,
};

/// Shared state handed to every handler. Cloning is cheap.
#[derive(Clone)]
pub struct ApiContext {
    pub config: AllertaApiConfig,
    pub db: Arc<dyn Storage>,
    pub auth_manager: Arc<AuthManager>,
    pub tokens: TokenKeys,
}

impl ApiContext {
    pub fn new(config: AllertaApiConfig, db: Arc<dyn Storage>) -> anyhow::Result<Self> {
        let secret = config.get_token_secret()?;
        let tokens = TokenKeys::from_secret(secret.as_bytes(), config.token_ttl_secs);

        let auth_manager =
            AuthManager::new().with_provider(BearerTokenProvider::new(tokens.clone()));

        Ok(Self {
            config,
            db,
            auth_manager: Arc::new(auth_manager),
            tokens,
        })
    }
}
