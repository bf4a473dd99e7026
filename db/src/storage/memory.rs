use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    models::{DbEmergency, DbUlid, DbUser},
    storage::{EmergencyFilter, EmergencyStore, Storage, StoreError, UserFilter, UserStore},
};

/// In-process storage with the same validation and uniqueness rules as
/// [`super::mongodb::MongoDBStorage`]. Documents are kept in id order, which
/// follows creation time at millisecond resolution.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    users: RwLock<BTreeMap<DbUlid, DbUser>>,
    emergencies: RwLock<BTreeMap<DbUlid, DbEmergency>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &BTreeMap<DbUlid, DbUser>, user: &DbUser) -> bool {
    users
        .values()
        .any(|u| u.id != user.id && u.email == user.email)
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn get(&self, id: DbUlid) -> Result<Option<DbUser>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<DbUser>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self, filter: UserFilter) -> Result<Vec<DbUser>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| filter.id.as_ref().is_none_or(|ids| ids.contains(&u.id)))
            .filter(|u| {
                filter
                    .email
                    .as_ref()
                    .is_none_or(|emails| emails.contains(&u.email))
            })
            .cloned()
            .collect())
    }

    async fn create(&self, user: DbUser) -> Result<DbUser, StoreError> {
        user.validate()?;
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) || email_taken(&users, &user) {
            return Err(StoreError::Conflict(format!("email {}", user.email)));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: DbUser) -> Result<Option<DbUser>, StoreError> {
        user.validate()?;
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Ok(None);
        }
        if email_taken(&users, &user) {
            return Err(StoreError::Conflict(format!("email {}", user.email)));
        }
        users.insert(user.id, user.clone());
        Ok(Some(user))
    }

    async fn delete(&self, id: DbUlid) -> Result<bool, StoreError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl EmergencyStore for MemoryStorage {
    async fn get(&self, id: DbUlid) -> Result<Option<DbEmergency>, StoreError> {
        Ok(self.emergencies.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: EmergencyFilter) -> Result<Vec<DbEmergency>, StoreError> {
        let emergencies = self.emergencies.read().await;
        Ok(emergencies
            .values()
            .filter(|e| filter.state.as_ref().is_none_or(|state| &e.state == state))
            .cloned()
            .collect())
    }

    async fn create(&self, emergency: DbEmergency) -> Result<DbEmergency, StoreError> {
        emergency.validate()?;
        let mut emergencies = self.emergencies.write().await;
        if emergencies.contains_key(&emergency.id) {
            return Err(StoreError::Conflict(format!("_id {}", emergency.id)));
        }
        emergencies.insert(emergency.id, emergency.clone());
        Ok(emergency)
    }

    async fn update(&self, emergency: DbEmergency) -> Result<Option<DbEmergency>, StoreError> {
        emergency.validate()?;
        let mut emergencies = self.emergencies.write().await;
        match emergencies.get_mut(&emergency.id) {
            Some(stored) => {
                *stored = emergency.clone();
                Ok(Some(emergency))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: DbUlid) -> Result<bool, StoreError> {
        Ok(self.emergencies.write().await.remove(&id).is_some())
    }
}
