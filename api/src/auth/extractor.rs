use std::future::Future;
use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use allerta_common::caller::{Caller, CallerError};

use crate::{context::ApiContext, error::ApiError};

/// Extractor that REQUIRES authentication.
///
/// Returns 401 Unauthorized if authentication fails.
///
/// # Examples
///
/// ```rust,ignore
/// pub async fn delete_emergency(
///     Auth(caller): Auth,  // ← extracts authenticated caller
///     Path(id): Path<String>,
/// ) -> Result<StatusCode, ApiError> {
///     policy::ensure_can_manage_emergencies(&caller)?;
///     // ... delete emergency
///     Ok(StatusCode::NO_CONTENT)
/// }
/// ```
#[derive(Debug)]
pub struct Auth(pub Caller);

impl FromRequestParts<ApiContext> for Auth {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &ApiContext,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let auth_manager = Arc::clone(&state.auth_manager);
        async move {
            let caller = auth_manager.authenticate(parts).await.map_err(|e| {
                ApiError::CallerError(CallerError::unauthorized(Some(e.to_string())))
            })?;
            Ok(Auth(caller))
        }
    }
}
