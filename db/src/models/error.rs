use thiserror::Error;

/// A document failed schema validation and was not written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Path `{0}` is required")]
    Required(&'static str),

    #[error("Cast to date failed for value \"{value}\" at path `{field}`")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid email: {0}")]
    InvalidEmail(String),
}
