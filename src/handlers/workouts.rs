// src/handlers/workouts.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppQuery},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, StaffOnly},
    },
    models::workout::{
        CreateWorkoutPlanPayload, WorkoutPlanListQuery, WorkoutPlanListResponse, WorkoutPlanResponse,
    },
};

// POST /api/workout-plans
#[utoipa::path(
    post,
    path = "/api/workout-plans",
    tag = "Workout Plans",
    request_body = CreateWorkoutPlanPayload,
    responses(
        (status = 201, description = "Plan stored", body = WorkoutPlanResponse),
        (status = 400, description = "Invalid payload or plan structure"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Requires ADMIN or TRAINER"),
        (status = 404, description = "Member or trainer profile not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_workout_plan(
    State(app_state): State<AppState>,
    _guard: RequireRole<StaffOnly>,
    AuthenticatedUser(author): AuthenticatedUser,
    AppJson(payload): AppJson<CreateWorkoutPlanPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let workout_plan = app_state.workout_service.create_plan(&author, payload).await?;

    Ok((StatusCode::CREATED, Json(WorkoutPlanResponse { success: true, workout_plan })))
}

// GET /api/workout-plans?memberId=
#[utoipa::path(
    get,
    path = "/api/workout-plans",
    tag = "Workout Plans",
    params(WorkoutPlanListQuery),
    responses(
        (status = 200, description = "Plans, newest first", body = WorkoutPlanListResponse),
        (status = 400, description = "memberId missing or malformed"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Members can only read their own plans"),
        (status = 404, description = "Member not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_workout_plans(
    State(app_state): State<AppState>,
    AuthenticatedUser(viewer): AuthenticatedUser,
    AppQuery(query): AppQuery<WorkoutPlanListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let plans = app_state.workout_service.list_plans(&viewer, query.member_id).await?;
    Ok(Json(WorkoutPlanListResponse { plans }))
}
