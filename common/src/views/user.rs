use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::caller::Role;

/// Public projection of a user. The password never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Path of this user, e.g. `/api/users/01J8...`.
    #[serde(rename = "self")]
    pub self_link: String,

    /// The user's email address.
    pub email: String,

    pub role: Role,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a password change.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PasswordUpdateResponse {
    pub success: bool,
    pub message: String,
}
