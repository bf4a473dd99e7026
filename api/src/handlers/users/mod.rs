use allerta_common::{
    links,
    params::{CreateUserParams, UpdatePasswordParams},
    policy,
    validation::is_valid_email,
    views::{PasswordUpdateResponse, User},
};
use allerta_db::{
    models::DbUser,
    storage::{StoreError, UserFilter, UserStore},
};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::{
    auth::Auth,
    context::ApiContext,
    error::ApiError,
    extract::ApiJson,
    handlers::{hash_password, parse_id, verify_password},
};

#[cfg(test)]
mod tests;

const USER_NOT_FOUND: &str = "User not found";

#[utoipa::path(
    get,
    path = "/api/users",
    tags = ["users"],
    responses(
        (status = 200, description = "All users, without passwords", body = Vec<User>),
        (status = 500, description = "Storage failure"),
    )
)]
#[instrument(skip(ctx))]
pub async fn list_users(State(ctx): State<ApiContext>) -> Result<Json<Vec<User>>, ApiError> {
    let users = UserStore::list(&*ctx.db, UserFilter::default())
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list users");
            ApiError::internal("Error in user recovery")
        })?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tags = ["users"],
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "The user, without password", body = User),
        (status = 404, description = "No such user"),
        (status = 500, description = "Storage failure"),
    )
)]
#[instrument(skip(ctx))]
pub async fn get_user(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    let user = UserStore::get(&*ctx.db, id)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user");
            ApiError::internal("Error in user recovery")
        })?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    Ok(Json(user.into()))
}

/// POST /api/users
///
/// Registers a user. The response carries no body, only the `Location` of
/// the new resource.
#[utoipa::path(
    post,
    path = "/api/users",
    tags = ["users"],
    request_body = CreateUserParams,
    responses(
        (status = 201, description = "User created; see the Location header"),
        (status = 400, description = "Invalid email, missing password or duplicate user"),
    )
)]
#[instrument(skip(ctx, body))]
pub async fn create_user(
    State(ctx): State<ApiContext>,
    ApiJson(body): ApiJson<CreateUserParams>,
) -> Result<impl IntoResponse, ApiError> {
    let email = match body.email {
        Some(email) if is_valid_email(&email) => email,
        _ => return Err(ApiError::bad_request("Invalid email")),
    };

    let password = body
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Error in user creation"))?;

    let password_hash = hash_password(&ctx, password).await?;
    let user = DbUser::new(email, password_hash, body.role.unwrap_or_default());

    let user = UserStore::create(&*ctx.db, user).await.map_err(|e| {
        debug!(error = %e, "User rejected by storage");
        ApiError::bad_request("Error in user creation")
    })?;

    info!(user_id = %user.id, role = %user.role, "User created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, links::user_self(&user.id.to_string()))],
    ))
}

/// PUT /api/users/{id}/password
///
/// Changes the caller's own password after checking the current one.
#[utoipa::path(
    put,
    path = "/api/users/{id}/password",
    tags = ["users"],
    params(("id" = String, Path, description = "User id; must be the caller's own")),
    request_body = UpdatePasswordParams,
    responses(
        (status = 200, description = "Password updated", body = PasswordUpdateResponse),
        (status = 400, description = "Incorrect old password or empty new password"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Target is not the caller"),
        (status = 404, description = "No such user"),
    ),
    security(("bearer" = []))
)]
#[instrument(skip(ctx, body))]
pub async fn update_password(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdatePasswordParams>,
) -> Result<Json<PasswordUpdateResponse>, ApiError> {
    policy::ensure_can_change_password(&caller, &id)?;

    let user_id = parse_id(&id).ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    let mut user = UserStore::get(&*ctx.db, user_id)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user");
            ApiError::internal("Server error")
        })?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    let old_password = body.old_password.unwrap_or_default();
    if !verify_password(old_password, user.password_hash.clone()).await? {
        return Err(ApiError::bad_request("Incorrect old password"));
    }

    let new_password = body
        .new_password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("New password must not be empty"))?;

    user.password_hash = hash_password(&ctx, new_password).await?;
    user.updated_at = Utc::now();

    UserStore::update(&*ctx.db, user)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to store new password");
            ApiError::internal("Server error")
        })?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    info!(user_id = %user_id, "Password updated");

    Ok(Json(PasswordUpdateResponse {
        success: true,
        message: "Password updated successfully".into(),
    }))
}

/// PUT /api/users/{id}
///
/// Same operation as [`update_password`], kept at the resource path.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tags = ["users"],
    params(("id" = String, Path, description = "User id; must be the caller's own")),
    request_body = UpdatePasswordParams,
    responses(
        (status = 200, description = "Password updated", body = PasswordUpdateResponse),
        (status = 400, description = "Incorrect old password or empty new password"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Target is not the caller"),
        (status = 404, description = "No such user"),
    ),
    security(("bearer" = []))
)]
pub async fn update_user(
    state: State<ApiContext>,
    auth: Auth,
    path: Path<String>,
    body: ApiJson<UpdatePasswordParams>,
) -> Result<Json<PasswordUpdateResponse>, ApiError> {
    update_password(state, auth, path, body).await
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tags = ["users"],
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Operators cannot be deleted"),
        (status = 404, description = "No such user"),
        (status = 500, description = "Storage failure"),
    )
)]
#[instrument(skip(ctx))]
pub async fn delete_user(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    let storage_failure = |e: StoreError| {
        warn!(error = %e, "Failed to delete user");
        ApiError::internal("Error in user deletion")
    };

    let user = UserStore::get(&*ctx.db, id)
        .await
        .map_err(storage_failure)?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    policy::ensure_can_delete_user(user.role)?;

    if !UserStore::delete(&*ctx.db, id).await.map_err(storage_failure)? {
        return Err(ApiError::not_found(USER_NOT_FOUND));
    }

    info!(user_id = %id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
