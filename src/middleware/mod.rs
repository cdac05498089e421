use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

pub mod auth;

use crate::{error::AppError, models::User, state::AppState};

/// The account behind the bearer token, inserted by `jwt_auth_middleware`.
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    /// Fails with `Authorization` unless the user is an admin.
    pub fn require_admin(&self) -> Result<&User, AppError> {
        if self.0.is_admin() {
            Ok(&self.0)
        } else {
            Err(AppError::authorization("Admin role required"))
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<User>()
            .cloned()
            .ok_or(AppError::authentication("user"))?;
        Ok(AuthenticatedUser(user))
    }
}

pub async fn jwt_auth_middleware(
    State(app_state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_header = parts
        .headers
        .get("Authorization")
        .and_then(|header| header.to_str().ok());

    let token = auth_header
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AppError::authentication("Missing bearer token"))?;

    match app_state.auth.decode_token(token) {
        Ok(claims) => {
            let user = app_state
                .storage
                .users
                .get_user(&claims.sub)?
                .ok_or(AppError::authentication("User not found"))?;
            if user.role != claims.role {
                return Err(AppError::authentication("Token role is stale"));
            }
            parts.extensions.insert(user);

            let req = Request::from_parts(parts, body);
            Ok(next.run(req).await)
        }
        Err(e) => {
            log::warn!("JWT validation failed: {}", e);
            Err(AppError::authentication("JWT token invalid"))
        }
    }
}
