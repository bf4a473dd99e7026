use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AuthLoginParams {
    /// The email of the user to authenticate as.
    pub email: String,

    /// The password of the user to authenticate as.
    pub password: String,
}
