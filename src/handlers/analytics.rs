// src/handlers/analytics.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AdminOnly, RequireRole},
    models::analytics::AnalyticsSummary,
};

#[utoipa::path(
    get,
    path = "/api/analytics/summary",
    tag = "Analytics",
    responses(
        (status = 200, description = "Member totals, visits today and tier breakdown", body = AnalyticsSummary),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Requires ADMIN")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.analytics_service.get_summary().await?;
    Ok(Json(summary))
}
