use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use log::{debug, info};

use crate::{
    error::AppError,
    middleware::AuthenticatedUser,
    models::{Role, Task},
    query::TaskQuery,
    schema::{TaskInput, TaskListParams, TaskStatusUpdate},
    state::AppState,
    utils::{required_text, time_sortable_uid},
};

fn task_from_input(id: String, input: TaskInput, created_at: chrono::DateTime<Utc>) -> Result<Task, AppError> {
    Ok(Task {
        id,
        title: required_text(&input.title)
            .ok_or_else(|| AppError::validation("task title is required"))?,
        status: input.status,
        due_date: input.due_date,
        created_at,
        updated_at: None,
        client_id: input.client_id,
        worker_id: input.worker_id.as_deref().and_then(required_text),
        topic_id: input.topic_id.as_deref().and_then(required_text),
        score: input.score,
    })
}

pub async fn list_tasks(
    _user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<TaskListParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = TaskQuery::try_from(params)?;
    debug!("Listing tasks with {:?}", query.predicates());
    let tasks = state
        .storage
        .tasks
        .find(state.storage.fetch_limit, |t| query.matches(t))?;
    Ok(Json(tasks))
}

pub async fn get_task(
    _user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.storage.tasks.require(&id)?))
}

pub async fn create_task(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Json(input): Json<TaskInput>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let task = task_from_input(time_sortable_uid(), input, Utc::now())?;
    state.storage.check_task(&task)?;
    state.storage.tasks.insert(&task)?;
    info!("Created task {} for client {}", task.id, task.client_id);
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<TaskInput>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let existing = state.storage.tasks.require(&id)?;
    let mut task = task_from_input(id, input, existing.created_at)?;
    task.updated_at = Some(Utc::now());
    state.storage.check_task(&task)?;
    state.storage.tasks.update(&task)?;
    Ok(Json(task))
}

/// Admins may move any task; tutors only the tasks assigned to their profile.
pub async fn update_task_status(
    AuthenticatedUser(user): AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<TaskStatusUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let mut task = state.storage.tasks.require(&id)?;

    let allowed = match user.role {
        Role::Admin => true,
        Role::Tutor => user.profile_id.is_some() && task.worker_id == user.profile_id,
        Role::Client => false,
    };
    if !allowed {
        return Err(AppError::authorization(format!(
            "user {} may not change task {}",
            user.id, task.id
        )));
    }

    if task.status != update.status {
        info!(
            "Task {} status {} -> {} by {}",
            task.id, task.status, update.status, user.id
        );
        task.status = update.status;
        task.updated_at = Some(Utc::now());
        state.storage.tasks.update(&task)?;
    }
    Ok(Json(task))
}

pub async fn delete_task(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let removed = state.storage.tasks.delete(&id)?;
    info!("Deleted task {}", removed.id);
    Ok(StatusCode::NO_CONTENT)
}
