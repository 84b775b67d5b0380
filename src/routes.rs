// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout));

    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me));

    let member_routes = Router::new()
        .route("/"
               ,get(handlers::members::list_members)
               .post(handlers::members::create_member)
        )
        .route("/me", get(handlers::members::get_my_member))
        .route("/{id}"
               ,get(handlers::members::get_member)
               .put(handlers::members::update_member)
               .delete(handlers::members::delete_member)
        )
        .route("/{id}/attendance", get(handlers::members::get_member_attendance));

    let checkin_routes = Router::new()
        .route("/"
               ,get(handlers::checkin::get_capacity)
               .post(handlers::checkin::record_checkin)
        )
        .route("/stream", get(handlers::checkin::stream_capacity));

    let settings_routes = Router::new()
        .route("/capacity"
               ,get(handlers::settings::get_capacity_settings)
               .put(handlers::settings::update_capacity_settings)
        );

    let analytics_routes = Router::new()
        .route("/summary", get(handlers::analytics::get_summary));

    let workout_routes = Router::new()
        .route("/"
               ,get(handlers::workouts::list_workout_plans)
               .post(handlers::workouts::create_workout_plan)
        );

    // Tudo que exige token passa pelo auth_guard
    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/members", member_routes)
        .nest("/checkin", checkin_routes)
        .nest("/settings", settings_routes)
        .nest("/analytics", analytics_routes)
        .nest("/workout-plans", workout_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
