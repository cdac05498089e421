use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::collection::Record;

/// Identifier of any stored record. Generated as a ULID string.
pub type RecordId = String;

/// Progress of a client through the engagement pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ClientProgress {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Overdue")]
    Overdue,
}

impl ClientProgress {
    pub fn label(&self) -> &'static str {
        match self {
            ClientProgress::NotStarted => "Not Started",
            ClientProgress::InProgress => "In Progress",
            ClientProgress::Completed => "Completed",
            ClientProgress::Overdue => "Overdue",
        }
    }
}

impl fmt::Display for ClientProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ClientProgress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "notstarted" => Ok(ClientProgress::NotStarted),
            "inprogress" => Ok(ClientProgress::InProgress),
            "completed" => Ok(ClientProgress::Completed),
            "overdue" => Ok(ClientProgress::Overdue),
            _ => Err(format!("unknown client progress `{s}`")),
        }
    }
}

impl TryFrom<String> for ClientProgress {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Canonical task status.
///
/// Input is accepted in any case and with spaces, dashes or underscores
/// (`"pending"`, `"in_progress"`, `"In Progress"`); output is always the
/// title-case form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "inprogress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(format!("unknown task status `{s}`")),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn normalize_token(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: RecordId,
    pub name: String,
}

/// A topic belongs to one subject. A topic with a `parent_id` is a subtopic
/// of exactly one top-level topic of the same subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: RecordId,
    pub name: String,
    pub subject_id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<RecordId>,
}

impl Topic {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: RecordId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub progress: Option<ClientProgress>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub client_id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Task {
    /// Timestamp of the latest known change.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

/// A tutor (worker) who can be assigned tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tutor {
    pub id: RecordId,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub subjects: Vec<RecordId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Tutor,
    Client,
}

/// A login account. `profile_id` links tutor and client accounts to their
/// `Tutor` or `Client` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    #[serde(default)]
    pub profile_id: Option<RecordId>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// User as exposed over the API, without the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: RecordId,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<RecordId>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        PublicUser {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            profile_id: user.profile_id.clone(),
            created_at: user.created_at,
        }
    }
}

impl Record for Subject {
    const COLLECTION: &'static str = "subjects";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Topic {
    const COLLECTION: &'static str = "topics";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Client {
    const COLLECTION: &'static str = "clients";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Task {
    const COLLECTION: &'static str = "tasks";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Tutor {
    const COLLECTION: &'static str = "tutors";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }
}
