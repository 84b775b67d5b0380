// src/handlers/checkin.rs

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::{
    common::{error::AppError, extract::AppJson},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, StaffOnly},
    },
    models::checkin::{CapacityOverview, CapacitySnapshot, CheckInPayload, CheckInResponse},
};

// Nome do evento SSE
const CAPACITY_EVENT: &str = "capacity";

// POST /api/checkin
#[utoipa::path(
    post,
    path = "/api/checkin",
    tag = "Check-in",
    request_body = CheckInPayload,
    responses(
        (status = 200, description = "Transition applied", body = CheckInResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 400, description = "Invalid body"),
        (status = 403, description = "Requires ADMIN or TRAINER"),
        (status = 404, description = "Member not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_checkin(
    State(app_state): State<AppState>,
    _guard: RequireRole<StaffOnly>,
    AuthenticatedUser(staff): AuthenticatedUser,
    AppJson(payload): AppJson<CheckInPayload>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!("{} requested {:?} for member {}", staff.email, payload.action, payload.member_id);

    let response = app_state
        .checkin_service
        .record_transition(payload.member_id, payload.action)
        .await?;

    Ok(Json(response))
}

// GET /api/checkin (o cliente faz polling a cada 5s)
#[utoipa::path(
    get,
    path = "/api/checkin",
    tag = "Check-in",
    responses(
        (status = 200, description = "Current occupancy and who is inside", body = CapacityOverview),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_capacity(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let overview = app_state.checkin_service.read_capacity().await?;
    Ok(Json(overview))
}

// GET /api/checkin/stream
#[utoipa::path(
    get,
    path = "/api/checkin/stream",
    tag = "Check-in",
    responses(
        (status = 200, description = "Server-sent events named `capacity`, one per committed change", content_type = "text/event-stream", body = CapacitySnapshot),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("api_jwt" = []))
)]
pub async fn stream_capacity(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    // Assina antes de ler o estado atual para não perder nada no meio
    let receiver = app_state.checkin_service.feed().subscribe();
    let initial = app_state.checkin_service.current_snapshot().await?;

    // Descarta o que já estava commitado quando o estado inicial foi lido
    let updates = BroadcastStream::new(receiver)
        .filter_map(|message| message.ok())
        .filter(move |snapshot| snapshot.version > initial.version);
    let stream = tokio_stream::once(initial)
        .chain(updates)
        .map(|snapshot| Event::default().event(CAPACITY_EVENT).json_data(snapshot));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
