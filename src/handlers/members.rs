// src/handlers/members.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppPath, AppQuery},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminOnly, RequireRole, StaffOnly},
    },
    models::{
        checkin::AttendanceRecord,
        member::{
            CreateMemberPayload, DeleteMemberResponse, MemberDetail, MemberFilter, MemberListQuery,
            MemberListResponse, MemberResponse, UpdateMemberPayload,
        },
        workout::MyMemberResponse,
    },
};

// GET /api/members
#[utoipa::path(
    get,
    path = "/api/members",
    tag = "Members",
    params(MemberListQuery),
    responses(
        (status = 200, description = "Members, newest first", body = MemberListResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 400, description = "Unknown tier or status"),
        (status = 403, description = "Requires ADMIN or TRAINER")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    _guard: RequireRole<StaffOnly>,
    AppQuery(query): AppQuery<MemberListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = MemberFilter::try_from(query)?;
    let members = app_state.member_service.list_members(&filter).await?;

    Ok(Json(MemberListResponse { members }))
}

// POST /api/members
#[utoipa::path(
    post,
    path = "/api/members",
    tag = "Members",
    request_body = CreateMemberPayload,
    responses(
        (status = 201, description = "Member created", body = MemberResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Requires ADMIN"),
        (status = 409, description = "Email already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_member(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    AppJson(payload): AppJson<CreateMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let member = app_state.member_service.create_member(payload).await?;

    Ok((StatusCode::CREATED, Json(MemberResponse { success: true, member })))
}

// GET /api/members/me (painel do aluno)
#[utoipa::path(
    get,
    path = "/api/members/me",
    tag = "Members",
    responses(
        (status = 200, description = "Own member profile and latest workout plan", body = MyMemberResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "The caller has no member profile")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_member(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let member = app_state.member_service.get_member_for_user(user.id).await?;
    let latest_plan = app_state.workout_service.latest_plan(member.id).await?;

    Ok(Json(MyMemberResponse { member, latest_plan }))
}

// GET /api/members/{id}
#[utoipa::path(
    get,
    path = "/api/members/{id}",
    tag = "Members",
    params(("id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member", body = MemberDetail),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Member not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_member(
    State(app_state): State<AppState>,
    _guard: RequireRole<StaffOnly>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let member = app_state.member_service.get_member(id).await?;
    Ok(Json(member))
}

// PUT /api/members/{id}
#[utoipa::path(
    put,
    path = "/api/members/{id}",
    tag = "Members",
    params(("id" = Uuid, Path, description = "Member ID")),
    request_body = UpdateMemberPayload,
    responses(
        (status = 200, description = "Member updated", body = MemberResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Member not found"),
        (status = 409, description = "Email already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_member(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let member = app_state.member_service.update_member(id, payload).await?;

    Ok(Json(MemberResponse { success: true, member }))
}

// DELETE /api/members/{id}
#[utoipa::path(
    delete,
    path = "/api/members/{id}",
    tag = "Members",
    params(("id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member deleted", body = DeleteMemberResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Member not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_member(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.member_service.delete_member(id).await?;

    Ok(Json(DeleteMemberResponse {
        success: true,
        message: "Member deleted successfully".to_string(),
    }))
}

// GET /api/members/{id}/attendance
#[utoipa::path(
    get,
    path = "/api/members/{id}/attendance",
    tag = "Members",
    params(("id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Visits, most recent first", body = Vec<AttendanceRecord>),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Member not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_member_attendance(
    State(app_state): State<AppState>,
    _guard: RequireRole<StaffOnly>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let visits = app_state.checkin_service.attendance_history(id).await?;
    Ok(Json(visits))
}
