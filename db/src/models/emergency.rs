use allerta_common::{
    links,
    params::EmergencyParams,
    validation::parse_timestamp,
    views::{Emergency, STATE_IN_PROGRESS, STATE_TERMINATED},
};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{DbUlid, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbEmergency {
    #[serde(rename = "_id")]
    pub id: DbUlid,

    /// Short headline of the incident
    pub title: String,

    /// Free-form category, e.g. "Incendio"
    pub category: String,

    pub description: String,

    /// Where the incident is happening
    pub location: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub start_date: DateTime<Utc>,

    /// Set when the emergency is terminated
    #[serde(default, with = "optional_datetime", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,

    /// Lifecycle state, "In corso" until terminated
    pub state: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl DbEmergency {
    /// Builds a new document from a creation request. Missing required
    /// fields fail validation and nothing is built.
    pub fn create(params: EmergencyParams, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let start_date = match params.start_date {
            Some(value) => parse_date("startDate", &value)?,
            None => return Err(ValidationError::Required("startDate")),
        };
        let end_date = params
            .end_date
            .map(|value| parse_date("endDate", &value))
            .transpose()?;

        let mut emergency = Self {
            id: DbUlid::new(),
            title: params.title.unwrap_or_default(),
            category: params.category.unwrap_or_default(),
            description: params.description.unwrap_or_default(),
            location: params.location.unwrap_or_default(),
            start_date,
            end_date,
            state: params
                .state
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| STATE_IN_PROGRESS.to_string()),
            updated_at: now,
        };
        if emergency.state == STATE_TERMINATED && emergency.end_date.is_none() {
            emergency.end_date = Some(now);
        }

        emergency.validate()?;
        Ok(emergency)
    }

    /// Merges a partial update into this document and validates the result.
    ///
    /// Setting the state to "Terminato" stamps `end_date` with `now` unless
    /// the patch carries its own end date or one is already recorded. Any
    /// other state clears `end_date` unless the patch sets one. On error
    /// `self` may be partially updated and must be discarded.
    pub fn apply(&mut self, params: EmergencyParams, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if let Some(title) = params.title {
            self.title = title;
        }
        if let Some(category) = params.category {
            self.category = category;
        }
        if let Some(description) = params.description {
            self.description = description;
        }
        if let Some(location) = params.location {
            self.location = location;
        }
        if let Some(start_date) = params.start_date {
            self.start_date = parse_date("startDate", &start_date)?;
        }
        let explicit_end_date = params.end_date.is_some();
        if let Some(end_date) = params.end_date {
            self.end_date = Some(parse_date("endDate", &end_date)?);
        }
        if let Some(state) = params.state {
            if !explicit_end_date {
                self.end_date = match state == STATE_TERMINATED {
                    true => self.end_date.or(Some(now)),
                    false => None,
                };
            }
            self.state = state;
        }

        self.updated_at = now;
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("title", &self.title),
            ("category", &self.category),
            ("description", &self.description),
            ("location", &self.location),
            ("state", &self.state),
        ];

        for (field, value) in required {
            if value.is_empty() {
                return Err(ValidationError::Required(field));
            }
        }
        Ok(())
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<DateTime<Utc>, ValidationError> {
    parse_timestamp(value).ok_or_else(|| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

impl From<DbEmergency> for Emergency {
    fn from(value: DbEmergency) -> Self {
        let id = value.id.to_string();
        Self {
            self_link: links::emergency_self(&id),
            id,
            created_at: value.created_at(),
            title: value.title,
            category: value.category,
            description: value.description,
            location: value.location,
            start_date: value.start_date,
            end_date: value.end_date,
            state: value.state,
            updated_at: value.updated_at,
        }
    }
}

mod optional_datetime {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => bson::DateTime::from_chrono(*dt).serialize(s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<bson::DateTime>::deserialize(d).map(|dt| dt.map(|dt| dt.to_chrono()))
    }
}
