use std::sync::Arc;

use axum::{Router, middleware::from_fn_with_state, routing::*};
use tower_http::trace::TraceLayer;

use crate::{
    api::{self, auth, catalog, clients, dashboard, tasks, tutors},
    middleware::jwt_auth_middleware,
    state::AppState,
};

/// Builds the HTTP router. Everything under `/api` requires a bearer token.
pub fn build_router(shared_state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/me", get(auth::me))
        .route("/users", post(auth::create_user))
        // Catalog
        .route(
            "/subjects",
            get(catalog::list_subjects).post(catalog::create_subject),
        )
        .route(
            "/subjects/{id}",
            get(catalog::get_subject)
                .put(catalog::update_subject)
                .delete(catalog::delete_subject),
        )
        .route("/topics", get(catalog::list_topics).post(catalog::create_topic))
        .route("/topics/tree", get(catalog::topic_tree))
        .route("/topics/selection", post(catalog::apply_selection))
        .route(
            "/topics/{id}",
            get(catalog::get_topic)
                .put(catalog::update_topic)
                .delete(catalog::delete_topic),
        )
        // Clients
        .route(
            "/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            "/clients/{id}",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        // Tasks
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/tasks/{id}/status", patch(tasks::update_task_status))
        // Tutors
        .route("/tutors", get(tutors::list_tutors).post(tutors::create_tutor))
        .route(
            "/tutors/{id}",
            get(tutors::get_tutor)
                .put(tutors::update_tutor)
                .delete(tutors::delete_tutor),
        )
        .route("/dashboard", get(dashboard::get_dashboard))
        .layer(from_fn_with_state(shared_state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/health", get(api::health_check))
        .route("/auth/login", post(auth::login))
        .nest("/api", protected)
        .with_state(shared_state)
        .layer(TraceLayer::new_for_http())
}
