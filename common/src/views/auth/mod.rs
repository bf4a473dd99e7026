use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::caller::Role;

/// Response for the login endpoint.
///
/// The access token must be sent back in the `Authorization` header as
/// `Bearer <token>` on every request that requires authentication.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthLoginResponse {
    /// Always `Bearer`.
    pub token_type: String,

    /// The access token for the authenticated user.
    pub access_token: String,

    /// How long the token is valid for, in seconds.
    pub expires_in: i64,

    /// Path of the authenticated user.
    #[serde(rename = "self")]
    pub self_link: String,

    pub id: String,
    pub email: String,
    pub role: Role,
}
