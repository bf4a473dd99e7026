use allerta_common::{caller::CallerError, views::ApiErrorResponse};
use allerta_db::storage::StoreError;
use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    CallerError(#[from] CallerError),

    #[error(transparent)]
    InternalAnyhow(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::CallerError(CallerError::unauthorized(Some(reason.into())))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(se) => match se {
                StoreError::Conflict(_) | StoreError::Validation(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::CallerError(ce) => match ce {
                CallerError::Forbidden { .. } => StatusCode::FORBIDDEN,
                CallerError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            },
            Self::InternalAnyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ApiError> for ApiErrorResponse {
    fn from(err: ApiError) -> Self {
        ApiErrorResponse {
            code: Some(
                match &err {
                    ApiError::BadRequest(_) => "BadRequest",
                    ApiError::NotFound(_) => "NotFound",
                    ApiError::Storage(se) => match se {
                        StoreError::Conflict(_) | StoreError::Validation(_) => "BadRequest",
                        _ => "InternalError",
                    },
                    ApiError::CallerError(ce) => match ce {
                        CallerError::Forbidden { .. } => "Forbidden",
                        CallerError::Unauthorized { .. } => "Unauthorized",
                    },
                    ApiError::Internal(_) | ApiError::InternalAnyhow(_) => "InternalError",
                }
                .into(),
            ),

            message: match &err {
                ApiError::BadRequest(message)
                | ApiError::NotFound(message)
                | ApiError::Internal(message) => message.clone(),
                ApiError::Storage(se) => match se {
                    StoreError::Conflict(_) | StoreError::Validation(_) => {
                        "The request could not be saved.".into()
                    }
                    _ => "Something went wrong on our end. Please try again later.".into(),
                },
                ApiError::CallerError(ce) => match ce {
                    CallerError::Forbidden { reason } | CallerError::Unauthorized { reason } => {
                        reason.clone()
                    }
                },
                ApiError::InternalAnyhow(_) => {
                    "Something went wrong on our end. Please try again later.".into()
                }
            },

            #[cfg(debug_assertions)]
            details: Some(err.to_string()),

            #[cfg(not(debug_assertions))]
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!("Error returned by handler: {self}");
        } else {
            tracing::debug!(status = %status_code, "Request rejected: {self}");
        }

        (status_code, Json(Into::<ApiErrorResponse>::into(self))).into_response()
    }
}
