//! Input parameters for the various functions within Allerta.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::caller::Role;

mod auth;
pub use auth::*;

/// Body of `POST /api/users`.
///
/// Every field is optional on the wire so that a missing email is reported
/// as a validation failure rather than a malformed body.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateUserParams {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Body of `PUT /api/users/{id}/password`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordParams {
    #[serde(default)]
    pub old_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

/// Body of `POST /api/emergencies` and `PUT /api/emergencies/{id}`.
///
/// On creation the absent required fields fail schema validation; on update
/// only the fields present are applied. Unknown fields are ignored, so a
/// client may send back a record it previously received.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// RFC 3339 timestamp or `YYYY-MM-DD` date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Query string of `GET /api/emergencies`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EmergencyListParams {
    /// Restrict the list to one lifecycle state: `in_corso` or `terminato`.
    /// Any other value is matched against the stored state as written.
    pub state: Option<String>,
}
