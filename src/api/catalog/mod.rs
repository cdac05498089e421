//! Subjects, topics, the topic tree and the topic selector.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use log::info;

use crate::{
    error::AppError,
    hierarchy::{TopicSelector, build_topic_hierarchy, subject_tree},
    middleware::AuthenticatedUser,
    models::{Subject, Topic},
    schema::{SelectionRequest, SelectionResponse, SubjectInput, TopicInput, TopicListParams},
    state::AppState,
    utils::{required_text, time_sortable_uid},
};

fn subject_name(input: &SubjectInput) -> Result<String, AppError> {
    required_text(&input.name).ok_or_else(|| AppError::validation("subject name is required"))
}

fn topic_from_input(id: String, input: TopicInput) -> Result<Topic, AppError> {
    Ok(Topic {
        id,
        name: required_text(&input.name)
            .ok_or_else(|| AppError::validation("topic name is required"))?,
        subject_id: input.subject_id,
        parent_id: input.parent_id.as_deref().and_then(required_text),
    })
}

//=============================================================================
//  Subjects
//=============================================================================

pub async fn list_subjects(
    _user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let mut subjects = state.storage.subjects.list(state.storage.fetch_limit)?;
    subjects.sort_by_key(|s| s.name.to_lowercase());
    Ok(Json(subjects))
}

pub async fn get_subject(
    _user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.storage.subjects.require(&id)?))
}

pub async fn create_subject(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Json(input): Json<SubjectInput>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let subject = Subject {
        id: time_sortable_uid(),
        name: subject_name(&input)?,
    };
    state.storage.subjects.insert(&subject)?;
    info!("Created subject {} ({})", subject.name, subject.id);
    Ok((StatusCode::CREATED, Json(subject)))
}

pub async fn update_subject(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<SubjectInput>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let subject = Subject {
        id,
        name: subject_name(&input)?,
    };
    state.storage.subjects.update(&subject)?;
    Ok(Json(subject))
}

pub async fn delete_subject(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let removed = state.storage.delete_subject(&id)?;
    info!("Deleted subject {}", removed.id);
    Ok(StatusCode::NO_CONTENT)
}

//=============================================================================
//  Topics
//=============================================================================

pub async fn list_topics(
    _user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<TopicListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = state.storage.fetch_limit;
    let topics = match params.subject_id.as_deref().and_then(required_text) {
        Some(subject_id) => state
            .storage
            .topics
            .find(limit, |t| t.subject_id == subject_id)?,
        None => state.storage.topics.list(limit)?,
    };
    Ok(Json(topics))
}

pub async fn get_topic(
    _user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.storage.topics.require(&id)?))
}

pub async fn create_topic(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Json(input): Json<TopicInput>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let topic = topic_from_input(time_sortable_uid(), input)?;
    state.storage.check_topic(&topic)?;
    state.storage.topics.insert(&topic)?;
    info!("Created topic {} ({})", topic.name, topic.id);
    Ok((StatusCode::CREATED, Json(topic)))
}

pub async fn update_topic(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<TopicInput>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let existing = state.storage.topics.require(&id)?;
    let topic = topic_from_input(id, input)?;
    if topic.subject_id != existing.subject_id
        && state
            .storage
            .topics
            .any(|t| t.parent_id.as_deref() == Some(topic.id.as_str()))?
    {
        return Err(AppError::conflict(format!(
            "topic {} has subtopics and cannot change subject",
            topic.id
        )));
    }
    state.storage.check_topic(&topic)?;
    state.storage.topics.update(&topic)?;
    Ok(Json(topic))
}

pub async fn delete_topic(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let removed = state.storage.delete_topic(&id)?;
    info!("Deleted topic {}", removed.id);
    Ok(StatusCode::NO_CONTENT)
}

//=============================================================================
//  Tree and selection
//=============================================================================

pub async fn topic_tree(
    _user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<TopicListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = state.storage.fetch_limit;
    let subjects = state.storage.subjects.list(limit)?;
    let topics = state.storage.topics.list(limit)?;

    match params.subject_id.as_deref().and_then(required_text) {
        Some(subject_id) => {
            let tree = subject_tree(&subjects, &topics, &subject_id)
                .ok_or_else(|| AppError::not_found(format!("subject {subject_id}")))?;
            Ok(Json(vec![tree]))
        }
        None => Ok(Json(build_topic_hierarchy(&subjects, &topics))),
    }
}

/// Applies one selection event against the current hierarchy. The server
/// keeps no selection state; the client sends what it holds.
pub async fn apply_selection(
    _user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let limit = state.storage.fetch_limit;
    let subjects = state.storage.subjects.list(limit)?;
    let topics = state.storage.topics.list(limit)?;
    let selector = TopicSelector::from_hierarchy(&build_topic_hierarchy(&subjects, &topics));

    let selected = selector.apply(&request.selected, &request.event);
    let parents = selector.parent_states(&selected);
    Ok(Json(SelectionResponse { selected, parents }))
}
