use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{Document, doc},
    error::{ErrorKind, WriteFailure},
    options::{FindOptions, IndexOptions},
};
use tracing::{debug, instrument};

use crate::{
    models::{DbEmergency, DbUlid, DbUser},
    storage::{EmergencyFilter, EmergencyStore, Storage, StoreError, UserFilter, UserStore},
};

pub const MONGODB_COLLECTION_USERS: &str = "users";
pub const MONGODB_COLLECTION_EMERGENCIES: &str = "emergencies";

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug)]
pub struct MongoDBStorage(Client);

impl MongoDBStorage {
    pub async fn new(uri: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self(client))
    }

    fn get_db(&self) -> Database {
        self.0
            .default_database()
            .unwrap_or_else(|| self.0.database("allerta"))
    }

    fn users(&self) -> Collection<DbUser> {
        self.get_db().collection::<DbUser>(MONGODB_COLLECTION_USERS)
    }

    fn emergencies(&self) -> Collection<DbEmergency> {
        self.get_db()
            .collection::<DbEmergency>(MONGODB_COLLECTION_EMERGENCIES)
    }

    /// Creates the unique index on user emails. Safe to call on every start.
    #[instrument(skip(self))]
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.users().create_index(email_index).await?;
        debug!("User email index ensured");
        Ok(())
    }
}

fn sorted_by_id() -> FindOptions {
    FindOptions::builder().sort(doc! { "_id": 1 }).build()
}

fn map_write_error(err: mongodb::error::Error) -> StoreError {
    if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = err.kind.as_ref() {
        if write_error.code == DUPLICATE_KEY_CODE {
            return StoreError::Conflict(write_error.message.clone());
        }
    }
    StoreError::MongoDB(err)
}

#[async_trait]
impl Storage for MongoDBStorage {
    async fn ping(&self) -> Result<(), StoreError> {
        self.get_db().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoDBStorage {
    async fn get(&self, id: DbUlid) -> Result<Option<DbUser>, StoreError> {
        Ok(self.users().find_one(doc! { "_id": id }).await?)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<DbUser>, StoreError> {
        let users = UserStore::list(
            self,
            UserFilter {
                id: None,
                email: Some(vec![email.to_string()]),
            },
        )
        .await?;

        Ok(users.into_iter().next())
    }

    async fn list(&self, filter: UserFilter) -> Result<Vec<DbUser>, StoreError> {
        let mut filter_doc = Document::new();
        if let Some(ids) = filter.id {
            filter_doc.insert("_id", doc! { "$in": ids });
        }
        if let Some(emails) = filter.email {
            filter_doc.insert("email", doc! { "$in": emails });
        }

        self.users()
            .find(filter_doc)
            .with_options(sorted_by_id())
            .await?
            .try_collect()
            .await
            .map_err(StoreError::MongoDB)
    }

    async fn create(&self, user: DbUser) -> Result<DbUser, StoreError> {
        user.validate()?;
        self.users()
            .insert_one(&user)
            .await
            .map_err(map_write_error)?;
        Ok(user)
    }

    async fn update(&self, user: DbUser) -> Result<Option<DbUser>, StoreError> {
        user.validate()?;
        let result = self
            .users()
            .replace_one(doc! { "_id": user.id }, &user)
            .await
            .map_err(map_write_error)?;

        Ok((result.matched_count > 0).then_some(user))
    }

    async fn delete(&self, id: DbUlid) -> Result<bool, StoreError> {
        let result = self.users().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

#[async_trait]
impl EmergencyStore for MongoDBStorage {
    async fn get(&self, id: DbUlid) -> Result<Option<DbEmergency>, StoreError> {
        Ok(self.emergencies().find_one(doc! { "_id": id }).await?)
    }

    async fn list(&self, filter: EmergencyFilter) -> Result<Vec<DbEmergency>, StoreError> {
        let mut filter_doc = Document::new();
        if let Some(state) = filter.state {
            filter_doc.insert("state", state);
        }

        self.emergencies()
            .find(filter_doc)
            .with_options(sorted_by_id())
            .await?
            .try_collect()
            .await
            .map_err(StoreError::MongoDB)
    }

    async fn create(&self, emergency: DbEmergency) -> Result<DbEmergency, StoreError> {
        emergency.validate()?;
        self.emergencies()
            .insert_one(&emergency)
            .await
            .map_err(map_write_error)?;
        Ok(emergency)
    }

    async fn update(&self, emergency: DbEmergency) -> Result<Option<DbEmergency>, StoreError> {
        emergency.validate()?;
        let result = self
            .emergencies()
            .replace_one(doc! { "_id": emergency.id }, &emergency)
            .await?;

        Ok((result.matched_count > 0).then_some(emergency))
    }

    async fn delete(&self, id: DbUlid) -> Result<bool, StoreError> {
        let result = self.emergencies().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
