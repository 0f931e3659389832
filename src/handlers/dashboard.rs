//! Dashboard and report endpoints

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::handlers::error::ApiError;
use crate::handlers::AppState;
use crate::services::policy::Actor;
use crate::services::stats::{AdminDashboard, SystemReport, UserDashboard};

/// The acting user's dashboard
///
/// GET /api/dashboard
pub async fn user_dashboard(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<Json<UserDashboard>, ApiError> {
    let dashboard = state.services.stats_service.user_dashboard(&actor).await?;
    Ok(Json(dashboard))
}

/// The admin dashboard
///
/// GET /api/admin/dashboard
pub async fn admin_dashboard(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<Json<AdminDashboard>, ApiError> {
    let dashboard = state.services.stats_service.admin_dashboard(&actor).await?;
    Ok(Json(dashboard))
}

/// The cross-entity system report
///
/// GET /api/admin/reports
pub async fn system_report(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<Json<SystemReport>, ApiError> {
    let report = state.services.stats_service.system_report(&actor).await?;
    Ok(Json(report))
}
