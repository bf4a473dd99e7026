use std::fmt::Debug;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DbEmergency, DbUlid, DbUser, ValidationError};

pub mod memory;
pub mod mongodb;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Query Error: {0}")]
    MongoDB(#[from] ::mongodb::error::Error),

    #[error("Duplicate key: {0}")]
    Conflict(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

#[async_trait]
pub trait Storage: UserStore + EmergencyStore + Debug + Send + Sync + 'static {
    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct UserFilter {
    pub id: Option<Vec<DbUlid>>,
    pub email: Option<Vec<String>>,
}

/// Users are written whole: `update` replaces the stored document and every
/// write is validated first. Emails are unique across the collection.
#[async_trait]
pub trait UserStore {
    async fn get(&self, id: DbUlid) -> Result<Option<DbUser>, StoreError>;
    async fn get_by_email(&self, email: &str) -> Result<Option<DbUser>, StoreError>;
    async fn list(&self, filter: UserFilter) -> Result<Vec<DbUser>, StoreError>;
    async fn create(&self, user: DbUser) -> Result<DbUser, StoreError>;
    /// Returns `None` when no user with that id exists.
    async fn update(&self, user: DbUser) -> Result<Option<DbUser>, StoreError>;
    /// Returns whether a user was deleted.
    async fn delete(&self, id: DbUlid) -> Result<bool, StoreError>;
}

#[derive(Debug, Default)]
pub struct EmergencyFilter {
    /// Exact match on the stored state, e.g. "In corso".
    pub state: Option<String>,
}

#[async_trait]
pub trait EmergencyStore {
    async fn get(&self, id: DbUlid) -> Result<Option<DbEmergency>, StoreError>;
    async fn list(&self, filter: EmergencyFilter) -> Result<Vec<DbEmergency>, StoreError>;
    async fn create(&self, emergency: DbEmergency) -> Result<DbEmergency, StoreError>;
    /// Returns `None` when no emergency with that id exists.
    async fn update(&self, emergency: DbEmergency) -> Result<Option<DbEmergency>, StoreError>;
    /// Returns whether an emergency was deleted.
    async fn delete(&self, id: DbUlid) -> Result<bool, StoreError>;
}
