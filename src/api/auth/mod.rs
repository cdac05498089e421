use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use log::info;

use crate::{
    error::AppError,
    middleware::AuthenticatedUser,
    models::{PublicUser, Role},
    schema::{CreateUserRequest, LoginRequest, LoginResponse},
    state::AppState,
};

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .storage
        .users
        .verify_credentials(&request.email, &request.password)?;
    let token = state.auth.create_token(&user)?;
    info!("User {} logged in", user.id);
    Ok(Json(LoginResponse {
        token,
        expires_in: state.auth.ttl_secs(),
        user: PublicUser::from(&user),
    }))
}

pub async fn me(AuthenticatedUser(user): AuthenticatedUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}

/// Admin-only: creates a login account, linking tutor and client accounts to
/// an existing profile record.
pub async fn create_user(
    current: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require_admin()?;

    let profile_id = match (request.role, request.profile_id) {
        (Role::Admin, _) => None,
        (Role::Tutor, Some(id)) => {
            state.storage.tutors.require(&id)?;
            Some(id)
        }
        (Role::Client, Some(id)) => {
            state.storage.clients.require(&id)?;
            Some(id)
        }
        (role, None) => {
            return Err(AppError::validation(format!(
                "{role:?} accounts need a profileId"
            )));
        }
    };

    let user = state
        .storage
        .users
        .create_user(&request.email, &request.password, request.role, profile_id)?;
    Ok((StatusCode::CREATED, Json(PublicUser::from(&user))))
}
