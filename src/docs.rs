// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,

        // --- Users ---
        handlers::auth::get_me,

        // --- Members ---
        handlers::members::list_members,
        handlers::members::create_member,
        handlers::members::get_my_member,
        handlers::members::get_member,
        handlers::members::update_member,
        handlers::members::delete_member,
        handlers::members::get_member_attendance,

        // --- Check-in ---
        handlers::checkin::record_checkin,
        handlers::checkin::get_capacity,
        handlers::checkin::stream_capacity,

        // --- Settings ---
        handlers::settings::get_capacity_settings,
        handlers::settings::update_capacity_settings,

        // --- Analytics ---
        handlers::analytics::get_summary,

        // --- Workout Plans ---
        handlers::workouts::create_workout_plan,
        handlers::workouts::list_workout_plans,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Members ---
            models::member::MembershipTier,
            models::member::Gender,
            models::member::MemberDetail,
            models::member::CreateMemberPayload,
            models::member::UpdateMemberPayload,
            models::member::MemberListResponse,
            models::member::MemberResponse,
            models::member::DeleteMemberResponse,

            // --- Check-in ---
            models::checkin::CheckInAction,
            models::checkin::CheckInPayload,
            models::checkin::AttendanceRecord,
            models::checkin::CapacitySnapshot,
            models::checkin::CheckInMemberSummary,
            models::checkin::CheckInResponse,
            models::checkin::CheckedInMember,
            models::checkin::CapacityOverview,
            models::checkin::UpdateCapacityPayload,

            // --- Analytics ---
            models::analytics::MemberCounts,
            models::analytics::TierCount,
            models::analytics::AnalyticsSummary,

            // --- Workout Plans ---
            models::workout::FitnessLevel,
            models::workout::WorkoutPlanDetail,
            models::workout::CreateWorkoutPlanPayload,
            models::workout::WorkoutPlanResponse,
            models::workout::WorkoutPlanListResponse,
            models::workout::MyMemberResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário"),
        (name = "Members", description = "Cadastro de Alunos"),
        (name = "Check-in", description = "Entrada, saída e lotação em tempo real"),
        (name = "Settings", description = "Capacidade máxima da academia"),
        (name = "Analytics", description = "Indicadores gerenciais"),
        (name = "Workout Plans", description = "Planos de treino dos alunos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
