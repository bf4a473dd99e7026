use std::fmt::Display;

use allerta_common::{caller::Role, links, validation::is_valid_email, views::User};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{DbUlid, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbUser {
    #[serde(rename = "_id")]
    pub id: DbUlid,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Display for DbUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DbUser {{ id: {}, email: {}, role: {} }}",
            self.id, self.email, self.role
        )
    }
}

impl DbUser {
    pub fn new(email: String, password_hash: String, role: Role) -> Self {
        Self {
            id: DbUlid::new(),
            email,
            password_hash,
            role,
            updated_at: Utc::now(),
        }
    }

    /// Get the creation time of this user based on the ULID's timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.is_empty() {
            return Err(ValidationError::Required("email"));
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        if self.password_hash.is_empty() {
            return Err(ValidationError::Required("password"));
        }
        Ok(())
    }
}

impl From<DbUser> for User {
    fn from(value: DbUser) -> Self {
        Self {
            self_link: links::user_self(&value.id.to_string()),
            created_at: value.created_at(),
            email: value.email,
            role: value.role,
            updated_at: value.updated_at,
        }
    }
}
