use allerta_common::{
    caller::Identity,
    links,
    params::AuthLoginParams,
    views::{AuthLoginResponse, User},
};
use allerta_db::storage::UserStore;
use axum::{Json, extract::State};
use tracing::{info, instrument, warn};

use crate::{
    auth::Auth,
    context::ApiContext,
    error::ApiError,
    extract::ApiJson,
    handlers::{parse_id, verify_password},
};


const INVALID_LOGIN: &str = "Invalid email or password";

/// POST /api/auth/login
///
/// Exchanges an email and password for a bearer access token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tags = ["auth"],
    request_body(content = AuthLoginParams, content_type = "application/json"),
    responses(
        (status = 200, description = "Successful login", body = AuthLoginResponse),
        (status = 401, description = "Unknown email or wrong password"),
    )
)]
#[instrument(skip(ctx, body))]
pub async fn auth_login(
    State(ctx): State<ApiContext>,
    ApiJson(body): ApiJson<AuthLoginParams>,
) -> Result<Json<AuthLoginResponse>, ApiError> {
    let user = ctx
        .db
        .get_by_email(&body.email)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to look up user for login");
            ApiError::internal("Error in authentication")
        })?
        .ok_or_else(|| ApiError::unauthorized(INVALID_LOGIN))?;

    if !verify_password(body.password, user.password_hash.clone()).await? {
        return Err(ApiError::unauthorized(INVALID_LOGIN));
    }

    let identity = Identity {
        id: user.id.to_string(),
        email: user.email.clone(),
        role: user.role,
    };
    let access_token = ctx.tokens.issue(&identity).map_err(|e| {
        warn!(error = %e, "Failed to issue access token");
        ApiError::internal("Error in authentication")
    })?;

    info!(user_id = %identity.id, "User logged in");

    Ok(Json(AuthLoginResponse {
        token_type: "Bearer".into(),
        access_token,
        expires_in: ctx.tokens.ttl_secs(),
        self_link: links::user_self(&identity.id),
        id: identity.id,
        email: identity.email,
        role: identity.role,
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tags = ["auth"],
    responses(
        (status = 200, description = "User information", body = User),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "The token's user no longer exists"),
    ),
    security(("bearer" = []))
)]
#[instrument(skip(ctx))]
pub async fn auth_whoami(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
) -> Result<Json<User>, ApiError> {
    let identity = caller.identity()?;
    let not_found = || ApiError::not_found("User not found");

    let id = parse_id(&identity.id).ok_or_else(not_found)?;
    let user = UserStore::get(&*ctx.db, id)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch current user");
            ApiError::internal("Error in user recovery")
        })?
        .ok_or_else(not_found)?;

    Ok(Json(user.into()))
}
