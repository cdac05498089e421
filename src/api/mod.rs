use std::sync::Arc;

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::state::AppState;

pub mod auth;
pub mod catalog;
pub mod clients;
pub mod dashboard;
pub mod tasks;
pub mod tutors;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "counts": state.storage.counts(),
        "cachedUsers": state.storage.users.cached_count(),
        "timestamp": chrono::Utc::now()
    }))
}
