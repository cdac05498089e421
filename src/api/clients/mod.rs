use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use log::info;

use crate::{
    error::AppError,
    middleware::AuthenticatedUser,
    models::Client,
    query::ClientQuery,
    schema::{ClientInput, ClientListParams},
    state::AppState,
    utils::{required_text, time_sortable_uid},
};

fn client_name(input: &ClientInput) -> Result<String, AppError> {
    required_text(&input.name).ok_or_else(|| AppError::validation("client name is required"))
}

pub async fn list_clients(
    _user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClientListParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = ClientQuery::try_from(params)?;
    let clients = state
        .storage
        .clients
        .find(state.storage.fetch_limit, |c| query.matches(c))?;
    Ok(Json(clients))
}

pub async fn get_client(
    _user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.storage.clients.require(&id)?))
}

pub async fn create_client(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Json(input): Json<ClientInput>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let client = Client {
        id: time_sortable_uid(),
        name: client_name(&input)?,
        email: input.email.as_deref().and_then(required_text),
        progress: input.progress,
        created_at: Utc::now(),
        updated_at: None,
    };
    state.storage.clients.insert(&client)?;
    info!("Created client {}", client.id);
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update_client(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<ClientInput>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let existing = state.storage.clients.require(&id)?;
    let client = Client {
        name: client_name(&input)?,
        email: input.email.as_deref().and_then(required_text),
        progress: input.progress,
        updated_at: Some(Utc::now()),
        ..existing
    };
    state.storage.clients.update(&client)?;
    Ok(Json(client))
}

pub async fn delete_client(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let removed = state.storage.delete_client(&id)?;
    info!("Deleted client {}", removed.id);
    Ok(StatusCode::NO_CONTENT)
}
