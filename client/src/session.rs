use allerta_common::{
    caller::Role,
    params::AuthLoginParams,
    views::AuthLoginResponse,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ApiClient, ApiClientError};

/// The user currently signed in to the frontend. Mutating calls take one of
/// these explicitly and send its token as a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedUser {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub token: String,
}

impl LoggedUser {
    pub fn is_operator(&self) -> bool {
        self.role == Role::Operator
    }
}

impl From<AuthLoginResponse> for LoggedUser {
    fn from(res: AuthLoginResponse) -> Self {
        Self {
            id: res.id,
            email: res.email,
            role: res.role,
            token: res.access_token,
        }
    }
}

impl ApiClient {
    pub async fn login(&self, email: &str, password: &str) -> Result<LoggedUser, ApiClientError> {
        let params = AuthLoginParams {
            email: email.to_string(),
            password: password.to_string(),
        };
        let res: AuthLoginResponse = self.post("/api/auth/login", &params, None).await?;

        info!(user_id = %res.id, "Logged in");
        Ok(res.into())
    }
}
