use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// State of an emergency that has been reported and not yet closed.
pub const STATE_IN_PROGRESS: &str = "In corso";

/// State of an emergency that has been closed.
pub const STATE_TERMINATED: &str = "Terminato";

/// Maps the `state` query value used by list filters to the stored state.
pub fn state_from_query(value: &str) -> Option<&'static str> {
    match value {
        "in_corso" => Some(STATE_IN_PROGRESS),
        "terminato" => Some(STATE_TERMINATED),
        _ => None,
    }
}

/// An emergency as returned by the API. Unlike [`crate::views::User`] this
/// is the full stored record, identifier and timestamps included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Emergency {
    #[serde(rename = "_id")]
    pub id: String,

    /// Path of this emergency, e.g. `/api/emergencies/01J8...`.
    #[serde(rename = "self")]
    pub self_link: String,

    pub title: String,
    pub category: String,
    pub description: String,
    pub location: String,

    pub start_date: DateTime<Utc>,

    /// Only present once the emergency has been terminated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,

    pub state: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Emergency {
    pub fn is_in_progress(&self) -> bool {
        self.state == STATE_IN_PROGRESS
    }
}
