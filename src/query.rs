//! Typed list filters.
//!
//! Query strings are parsed once into a list of predicates; a record is kept
//! when every predicate matches.

use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::{Client, ClientProgress, RecordId, Task, TaskStatus},
    schema::{ClientListParams, TaskListParams},
    utils::required_text,
};

#[derive(Debug, Clone, PartialEq)]
pub enum TaskPredicate {
    Status(TaskStatus),
    Client(RecordId),
    Worker(RecordId),
    Topic(RecordId),
    /// Due strictly before the instant.
    DueBefore(DateTime<Utc>),
    /// Due at or after the instant.
    DueAfter(DateTime<Utc>),
    /// Case-insensitive substring of the title; stored lowercased.
    TitleContains(String),
}

impl TaskPredicate {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskPredicate::Status(status) => task.status == *status,
            TaskPredicate::Client(id) => task.client_id == *id,
            TaskPredicate::Worker(id) => task.worker_id.as_ref() == Some(id),
            TaskPredicate::Topic(id) => task.topic_id.as_ref() == Some(id),
            TaskPredicate::DueBefore(at) => task.due_date < *at,
            TaskPredicate::DueAfter(at) => task.due_date >= *at,
            TaskPredicate::TitleContains(needle) => task.title.to_lowercase().contains(needle),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQuery {
    predicates: Vec<TaskPredicate>,
}

impl TaskQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, predicate: TaskPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[TaskPredicate] {
        &self.predicates
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.predicates.iter().all(|p| p.matches(task))
    }
}

impl TryFrom<TaskListParams> for TaskQuery {
    type Error = AppError;

    fn try_from(params: TaskListParams) -> Result<Self, Self::Error> {
        let mut query = TaskQuery::new();
        if let Some(raw) = params.status.as_deref().and_then(required_text) {
            let status = raw.parse::<TaskStatus>().map_err(AppError::bad_request)?;
            query = query.and(TaskPredicate::Status(status));
        }
        if let Some(id) = params.client_id.as_deref().and_then(required_text) {
            query = query.and(TaskPredicate::Client(id));
        }
        if let Some(id) = params.worker_id.as_deref().and_then(required_text) {
            query = query.and(TaskPredicate::Worker(id));
        }
        if let Some(id) = params.topic_id.as_deref().and_then(required_text) {
            query = query.and(TaskPredicate::Topic(id));
        }
        if let Some(at) = params.due_before {
            query = query.and(TaskPredicate::DueBefore(at));
        }
        if let Some(at) = params.due_after {
            query = query.and(TaskPredicate::DueAfter(at));
        }
        if let Some(needle) = params.search.as_deref().and_then(required_text) {
            query = query.and(TaskPredicate::TitleContains(needle.to_lowercase()));
        }
        Ok(query)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientPredicate {
    /// `None` selects clients without a progress value.
    Progress(Option<ClientProgress>),
    NameContains(String),
}

impl ClientPredicate {
    pub fn matches(&self, client: &Client) -> bool {
        match self {
            ClientPredicate::Progress(progress) => client.progress == *progress,
            ClientPredicate::NameContains(needle) => client.name.to_lowercase().contains(needle),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientQuery {
    predicates: Vec<ClientPredicate>,
}

impl ClientQuery {
    pub fn and(mut self, predicate: ClientPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn matches(&self, client: &Client) -> bool {
        self.predicates.iter().all(|p| p.matches(client))
    }
}

impl TryFrom<ClientListParams> for ClientQuery {
    type Error = AppError;

    fn try_from(params: ClientListParams) -> Result<Self, Self::Error> {
        let mut query = ClientQuery::default();
        if let Some(raw) = params.progress.as_deref().and_then(required_text) {
            let progress = if raw.eq_ignore_ascii_case("unknown") {
                None
            } else {
                Some(raw.parse::<ClientProgress>().map_err(AppError::bad_request)?)
            };
            query = query.and(ClientPredicate::Progress(progress));
        }
        if let Some(needle) = params.search.as_deref().and_then(required_text) {
            query = query.and(ClientPredicate::NameContains(needle.to_lowercase()));
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(id: &str, status: TaskStatus, day: u32) -> Task {
        let due = Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap();
        Task {
            id: id.into(),
            title: format!("Essay {id}"),
            status,
            due_date: due,
            created_at: due,
            updated_at: None,
            client_id: "c1".into(),
            worker_id: Some("w1".into()),
            topic_id: None,
            score: None,
        }
    }

    #[test]
    fn empty_query_matches_everything() {
        let query = TaskQuery::try_from(TaskListParams::default()).unwrap();
        assert!(query.predicates().is_empty());
        assert!(query.matches(&task("a", TaskStatus::Pending, 1)));
    }

    #[test]
    fn predicates_are_combined_with_and() {
        let params = TaskListParams {
            status: Some("in_progress".into()),
            worker_id: Some("w1".into()),
            due_before: Some(Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap()),
            search: Some("ESSAY".into()),
            ..Default::default()
        };
        let query = TaskQuery::try_from(params).unwrap();
        assert_eq!(query.predicates().len(), 4);

        assert!(query.matches(&task("a", TaskStatus::InProgress, 5)));
        assert!(!query.matches(&task("b", TaskStatus::Pending, 5)));
        assert!(!query.matches(&task("c", TaskStatus::InProgress, 12)));
    }

    #[test]
    fn unknown_status_is_a_bad_request() {
        let params = TaskListParams {
            status: Some("archived".into()),
            ..Default::default()
        };
        assert!(matches!(TaskQuery::try_from(params), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn client_progress_filter_handles_unknown() {
        let client = |progress| Client {
            id: "c".into(),
            name: "Jane Doe".into(),
            email: None,
            progress,
            created_at: Utc::now(),
            updated_at: None,
        };
        let unknown = ClientQuery::try_from(ClientListParams {
            progress: Some("Unknown".into()),
            search: Some("jane".into()),
        })
        .unwrap();
        assert!(unknown.matches(&client(None)));
        assert!(!unknown.matches(&client(Some(ClientProgress::Completed))));

        let started = ClientQuery::try_from(ClientListParams {
            progress: Some("not started".into()),
            search: None,
        })
        .unwrap();
        assert!(started.matches(&client(Some(ClientProgress::NotStarted))));
    }
}
