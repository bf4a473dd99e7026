use allerta_common::{
    params::{EmergencyListParams, EmergencyParams},
    policy,
    views::{Emergency, state_from_query},
};
use allerta_db::{
    models::DbEmergency,
    storage::{EmergencyFilter, EmergencyStore},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::{
    auth::Auth, context::ApiContext, error::ApiError, extract::ApiJson, handlers::parse_id,
};


const EMERGENCY_NOT_FOUND: &str = "Emergency not found";

#[utoipa::path(
    get,
    path = "/api/emergencies",
    tags = ["emergencies"],
    params(EmergencyListParams),
    responses(
        (status = 200, description = "Emergencies, oldest first", body = Vec<Emergency>),
        (status = 500, description = "Storage failure"),
    )
)]
#[instrument(skip(ctx))]
pub async fn list_emergencies(
    State(ctx): State<ApiContext>,
    Query(query): Query<EmergencyListParams>,
) -> Result<Json<Vec<Emergency>>, ApiError> {
    // Unrecognised values match stored states verbatim.
    let state = query
        .state
        .map(|value| state_from_query(&value).map_or(value, str::to_string));

    let emergencies = EmergencyStore::list(&*ctx.db, EmergencyFilter { state })
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list emergencies");
            ApiError::internal("Error in emergencies recovery")
        })?;

    Ok(Json(emergencies.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/emergencies/{id}",
    tags = ["emergencies"],
    params(("id" = String, Path, description = "Emergency id")),
    responses(
        (status = 200, description = "The emergency", body = Emergency),
        (status = 404, description = "No such emergency"),
        (status = 500, description = "Storage failure"),
    )
)]
#[instrument(skip(ctx))]
pub async fn get_emergency(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Emergency>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(EMERGENCY_NOT_FOUND))?;

    let emergency = EmergencyStore::get(&*ctx.db, id)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch emergency");
            ApiError::internal("Error in emergency recovery")
        })?
        .ok_or_else(|| ApiError::not_found(EMERGENCY_NOT_FOUND))?;

    Ok(Json(emergency.into()))
}

/// POST /api/emergencies
///
/// Reports a new emergency. It starts "In corso" unless the body says
/// otherwise.
#[utoipa::path(
    post,
    path = "/api/emergencies",
    tags = ["emergencies"],
    request_body = EmergencyParams,
    responses(
        (status = 201, description = "Emergency created; see the Location header", body = Emergency),
        (status = 400, description = "Missing required field or invalid date"),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    security(("bearer" = []))
)]
#[instrument(skip(ctx, body))]
pub async fn create_emergency(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    ApiJson(body): ApiJson<EmergencyParams>,
) -> Result<impl IntoResponse, ApiError> {
    policy::ensure_can_manage_emergencies(&caller)?;

    let rejected = |reason: String| {
        debug!(%reason, "Emergency rejected");
        ApiError::bad_request("Error in emergency creation")
    };

    let emergency = DbEmergency::create(body, Utc::now()).map_err(|e| rejected(e.to_string()))?;
    let emergency = EmergencyStore::create(&*ctx.db, emergency)
        .await
        .map_err(|e| rejected(e.to_string()))?;

    info!(emergency_id = %emergency.id, "Emergency created");

    let view: Emergency = emergency.into();
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, view.self_link.clone())],
        Json(view),
    ))
}

/// PUT /api/emergencies/{id}
///
/// Applies the fields present in the body and validates the merged record.
#[utoipa::path(
    put,
    path = "/api/emergencies/{id}",
    tags = ["emergencies"],
    params(("id" = String, Path, description = "Emergency id")),
    request_body = EmergencyParams,
    responses(
        (status = 200, description = "The updated emergency", body = Emergency),
        (status = 400, description = "The merged record is invalid"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "No such emergency"),
    ),
    security(("bearer" = []))
)]
#[instrument(skip(ctx, body))]
pub async fn update_emergency(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<EmergencyParams>,
) -> Result<Json<Emergency>, ApiError> {
    policy::ensure_can_manage_emergencies(&caller)?;

    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(EMERGENCY_NOT_FOUND))?;

    let rejected = |reason: String| {
        debug!(%reason, "Emergency update rejected");
        ApiError::bad_request("Error in emergency update")
    };

    let mut emergency = EmergencyStore::get(&*ctx.db, id)
        .await
        .map_err(|e| rejected(e.to_string()))?
        .ok_or_else(|| ApiError::not_found(EMERGENCY_NOT_FOUND))?;

    emergency
        .apply(body, Utc::now())
        .map_err(|e| rejected(e.to_string()))?;

    let emergency = EmergencyStore::update(&*ctx.db, emergency)
        .await
        .map_err(|e| rejected(e.to_string()))?
        .ok_or_else(|| ApiError::not_found(EMERGENCY_NOT_FOUND))?;

    info!(emergency_id = %emergency.id, state = %emergency.state, "Emergency updated");

    Ok(Json(emergency.into()))
}

#[utoipa::path(
    delete,
    path = "/api/emergencies/{id}",
    tags = ["emergencies"],
    params(("id" = String, Path, description = "Emergency id")),
    responses(
        (status = 204, description = "Emergency deleted"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "No such emergency"),
        (status = 500, description = "Storage failure"),
    ),
    security(("bearer" = []))
)]
#[instrument(skip(ctx))]
pub async fn delete_emergency(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    policy::ensure_can_manage_emergencies(&caller)?;

    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(EMERGENCY_NOT_FOUND))?;

    let deleted = EmergencyStore::delete(&*ctx.db, id).await.map_err(|e| {
        warn!(error = %e, "Failed to delete emergency");
        ApiError::internal("Error in emergency deletion")
    })?;

    if !deleted {
        return Err(ApiError::not_found(EMERGENCY_NOT_FOUND));
    }

    info!(emergency_id = %id, "Emergency deleted");

    Ok(StatusCode::NO_CONTENT)
}
