// src/handlers/settings.rs

use axum::{extract::State, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{error::AppError, extract::AppJson},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminOnly, RequireRole},
    },
    models::checkin::{CapacitySnapshot, UpdateCapacityPayload},
};

// GET /api/settings/capacity
#[utoipa::path(
    get,
    path = "/api/settings/capacity",
    tag = "Settings",
    responses(
        (status = 200, description = "Current occupancy and limit", body = CapacitySnapshot),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_capacity_settings(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = app_state.checkin_service.current_snapshot().await?;
    Ok(Json(snapshot))
}

// PUT /api/settings/capacity
#[utoipa::path(
    put,
    path = "/api/settings/capacity",
    tag = "Settings",
    request_body = UpdateCapacityPayload,
    responses(
        (status = 200, description = "Limit updated", body = CapacitySnapshot),
        (status = 401, description = "Missing or invalid token"),
        (status = 400, description = "Negative limit"),
        (status = 403, description = "Requires ADMIN")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_capacity_settings(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    AppJson(payload): AppJson<UpdateCapacityPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let snapshot = app_state
        .checkin_service
        .update_max_capacity(payload.max_capacity)
        .await?;

    tracing::info!("Capacidade máxima alterada para {}", snapshot.max);

    Ok(Json(snapshot))
}
