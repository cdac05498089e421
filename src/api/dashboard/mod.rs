use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use log::debug;

use crate::{
    dashboard::{DashboardVariant, aggregate},
    error::AppError,
    middleware::AuthenticatedUser,
    schema::DashboardParams,
    state::AppState,
};

/// Loads a fresh snapshot and aggregates it. The admin variant needs the
/// admin role.
pub async fn get_dashboard(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let variant = params
        .variant
        .as_deref()
        .unwrap_or_default()
        .parse::<DashboardVariant>()
        .map_err(AppError::bad_request)?;
    if variant == DashboardVariant::Admin {
        user.require_admin()?;
    }

    let snapshot = state.storage.snapshot()?;
    let now = state.now();
    debug!(
        "Aggregating {:?} dashboard over {} tasks and {} clients",
        variant,
        snapshot.tasks.len(),
        snapshot.clients.len()
    );
    Ok(Json(aggregate(&snapshot, now, variant)))
}
