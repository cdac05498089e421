use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use log::info;

use crate::{
    error::AppError,
    middleware::AuthenticatedUser,
    models::Tutor,
    schema::TutorInput,
    state::AppState,
    utils::{required_text, time_sortable_uid},
};

fn tutor_from_input(id: String, input: TutorInput) -> Result<Tutor, AppError> {
    let mut subjects = input.subjects;
    subjects.sort();
    subjects.dedup();
    Ok(Tutor {
        id,
        full_name: required_text(&input.full_name)
            .ok_or_else(|| AppError::validation("tutor name is required"))?,
        email: input.email.as_deref().and_then(required_text),
        subjects,
    })
}

pub async fn list_tutors(
    _user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.storage.tutors.list(state.storage.fetch_limit)?))
}

pub async fn get_tutor(
    _user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.storage.tutors.require(&id)?))
}

pub async fn create_tutor(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Json(input): Json<TutorInput>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let tutor = tutor_from_input(time_sortable_uid(), input)?;
    state.storage.check_tutor(&tutor)?;
    state.storage.tutors.insert(&tutor)?;
    info!("Created tutor {}", tutor.id);
    Ok((StatusCode::CREATED, Json(tutor)))
}

pub async fn update_tutor(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<TutorInput>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let tutor = tutor_from_input(id, input)?;
    state.storage.check_tutor(&tutor)?;
    state.storage.tutors.update(&tutor)?;
    Ok(Json(tutor))
}

pub async fn delete_tutor(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let removed = state.storage.delete_tutor(&id)?;
    info!("Deleted tutor {}", removed.id);
    Ok(StatusCode::NO_CONTENT)
}
