//! HTTP handlers module
//!
//! Thin axum handlers over the service layer; all access control lives in
//! the services, the routes only shape requests and responses.

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod registrations;
pub mod users;

pub use error::{ApiError, ErrorResponse};

use axum::{
    extract::State,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::settings::Settings;
use crate::database::{health_check, DatabasePool};
use crate::services::ServiceFactory;

/// Shared state handed to every handler
pub struct AppState {
    pub services: ServiceFactory,
    pub settings: Settings,
    pub pool: DatabasePool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
}

/// Liveness probe
///
/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = health_check(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
    })
}

/// Build the full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/signup", post(auth::signup))
        .route("/events", get(events::list_events))
        .route("/events/:id", get(events::get_event))
        .route("/categories", get(categories::list_active));

    let user_routes = Router::new()
        .route("/events/:id/register", post(registrations::register))
        .route("/registrations", get(registrations::list_own))
        .route("/profile", get(users::get_profile))
        .route("/profile", put(users::update_profile))
        .route("/dashboard", get(dashboard::user_dashboard));

    let admin_routes = Router::new()
        .route("/events", get(events::list_all_events))
        .route("/events", post(events::create_event))
        .route("/events/:id", put(events::update_event))
        .route("/events/:id", delete(events::delete_event))
        .route("/events/:id/image", post(events::upload_featured_image))
        .route("/events/:id/registrations", get(registrations::list_for_event))
        .route("/registrations/:id/status", patch(registrations::update_status))
        .route("/registrations/:id/attendance", patch(registrations::update_attendance))
        .route("/categories", get(categories::list_all))
        .route("/categories", post(categories::create_category))
        .route("/categories/:id", put(categories::update_category))
        .route("/categories/:id", delete(categories::delete_category))
        .route("/dashboard", get(dashboard::admin_dashboard))
        .route("/reports", get(dashboard::system_report))
        .route("/users", get(users::list_users))
        .route("/users", post(users::create_user))
        .route("/users/export", get(users::export_csv))
        .route("/users/bulk", post(users::bulk_action))
        .route("/users/:id", get(users::get_user))
        .route("/users/:id", put(users::update_user))
        .route("/users/:id", delete(users::delete_user))
        .route("/users/:id/toggle-status", post(users::toggle_status))
        .route("/users/:id/reset-password", post(users::reset_password));

    Router::new()
        .route("/health", get(health))
        .nest("/api", public_routes.merge(user_routes))
        .nest("/api/admin", admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
