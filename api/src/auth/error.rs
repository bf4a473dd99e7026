use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Credentials expired")]
    Expired,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}
