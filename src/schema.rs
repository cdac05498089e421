//! src/schema.rs
//!
//! Contains all public-facing API data structures.
//! These structs define the JSON contracts for requests and responses
//! between the dashboard frontend and the hub server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    hierarchy::{ParentSelection, SelectionEvent, TopicSelection},
    models::{ClientProgress, PublicUser, RecordId, Role, TaskStatus},
};

//=============================================================================
//  Authentication
//=============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    pub user: PublicUser,
}

/// Body of an admin request creating a login account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub profile_id: Option<RecordId>,
}

//=============================================================================
//  Catalog
//=============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectInput {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicInput {
    pub name: String,
    pub subject_id: RecordId,
    /// Set to make the topic a subtopic of a top-level topic.
    #[serde(default)]
    pub parent_id: Option<RecordId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicListParams {
    pub subject_id: Option<RecordId>,
}

/// Body of a selection transition. `selected` is the state the client holds
/// before `event` is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    #[serde(default)]
    pub selected: TopicSelection,
    pub event: SelectionEvent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub selected: TopicSelection,
    pub parents: Vec<ParentSelection>,
}

//=============================================================================
//  Clients, tasks and tutors
//=============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub progress: Option<ClientProgress>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientListParams {
    pub progress: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,
    pub client_id: RecordId,
    #[serde(default)]
    pub worker_id: Option<RecordId>,
    #[serde(default)]
    pub topic_id: Option<RecordId>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdate {
    pub status: TaskStatus,
}

/// Query string of `GET /api/tasks`. Every field is optional and the
/// present ones are combined with AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListParams {
    pub status: Option<String>,
    pub client_id: Option<RecordId>,
    pub worker_id: Option<RecordId>,
    pub topic_id: Option<RecordId>,
    pub due_before: Option<DateTime<Utc>>,
    pub due_after: Option<DateTime<Utc>>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorInput {
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subjects: Vec<RecordId>,
}

//=============================================================================
//  Dashboard
//=============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardParams {
    pub variant: Option<String>,
}
