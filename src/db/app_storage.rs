use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use log::info;
use serde::Serialize;

use crate::{
    dashboard::DashboardSnapshot,
    db::{collection::Collection, users::UserStorage},
    error::{AppError, AppResult},
    models::{Client, Subject, Task, Topic, Tutor},
};

/// Composite storage for every collection of the hub.
#[derive(Clone)]
pub struct AppStorage {
    pub subjects: Collection<Subject>,
    pub topics: Collection<Topic>,
    pub clients: Collection<Client>,
    pub tasks: Collection<Task>,
    pub tutors: Collection<Tutor>,
    pub users: Arc<UserStorage>,
    /// Upper bound on records read from one collection per request.
    pub fetch_limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionCounts {
    pub subjects: usize,
    pub topics: usize,
    pub clients: usize,
    pub tasks: usize,
    pub tutors: usize,
    pub users: usize,
}

impl AppStorage {
    /// Open the hub database under `base_path/hub` with a 120 second user
    /// cache TTL.
    pub fn new(base_path: &str, fetch_limit: usize) -> anyhow::Result<Self> {
        Self::with_ttl(base_path, fetch_limit, Duration::from_secs(120))
    }

    pub fn with_ttl(base_path: &str, fetch_limit: usize, cache_ttl: Duration) -> anyhow::Result<Self> {
        let mut db_path = PathBuf::from(base_path);
        db_path.push("hub");

        std::fs::create_dir_all(&db_path)
            .with_context(|| format!("Failed to create database directory {}", db_path.display()))?;

        let db = sled::open(&db_path)?;
        info!("Opened hub database at {}", db_path.display());

        Ok(Self {
            subjects: Collection::open(&db)?,
            topics: Collection::open(&db)?,
            clients: Collection::open(&db)?,
            tasks: Collection::open(&db)?,
            tutors: Collection::open(&db)?,
            users: Arc::new(UserStorage::open(&db, cache_ttl)?),
            fetch_limit: fetch_limit.max(1),
        })
    }

    pub fn counts(&self) -> CollectionCounts {
        CollectionCounts {
            subjects: self.subjects.count(),
            topics: self.topics.count(),
            clients: self.clients.count(),
            tasks: self.tasks.count(),
            tutors: self.tutors.count(),
            users: self.users.count(),
        }
    }

    /// Loads every collection the dashboard works on. Past `fetch_limit`
    /// the newest records are kept, so recent activity stays visible.
    pub fn snapshot(&self) -> anyhow::Result<DashboardSnapshot> {
        Ok(DashboardSnapshot {
            subjects: self.subjects.latest(self.fetch_limit)?,
            topics: self.topics.latest(self.fetch_limit)?,
            clients: self.clients.latest(self.fetch_limit)?,
            tasks: self.tasks.latest(self.fetch_limit)?,
            tutors: self.tutors.latest(self.fetch_limit)?,
        })
    }
}

// Relational checks applied before writes
impl AppStorage {
    /// Subject must exist; a parent must exist, be top-level and belong to
    /// the same subject.
    pub fn check_topic(&self, topic: &Topic) -> AppResult<()> {
        if !self.subjects.contains(&topic.subject_id)? {
            return Err(AppError::Validation(format!(
                "subject {} does not exist",
                topic.subject_id
            )));
        }
        let Some(parent_id) = topic.parent_id.as_deref() else {
            return Ok(());
        };
        if parent_id == topic.id {
            return Err(AppError::Validation("topic cannot be its own parent".to_string()));
        }
        let parent = self
            .topics
            .get(parent_id)?
            .ok_or_else(|| AppError::Validation(format!("parent topic {parent_id} does not exist")))?;
        if !parent.is_top_level() {
            return Err(AppError::Validation(format!(
                "parent topic {parent_id} is itself a subtopic"
            )));
        }
        if parent.subject_id != topic.subject_id {
            return Err(AppError::Validation(format!(
                "parent topic {parent_id} belongs to another subject"
            )));
        }
        if self.topics.any(|t| t.parent_id.as_deref() == Some(topic.id.as_str()))? {
            return Err(AppError::Validation(format!(
                "topic {} has subtopics and cannot become a subtopic",
                topic.id
            )));
        }
        Ok(())
    }

    pub fn check_task(&self, task: &Task) -> AppResult<()> {
        if !self.clients.contains(&task.client_id)? {
            return Err(AppError::Validation(format!(
                "client {} does not exist",
                task.client_id
            )));
        }
        if let Some(worker_id) = task.worker_id.as_deref() {
            if !self.tutors.contains(worker_id)? {
                return Err(AppError::Validation(format!("tutor {worker_id} does not exist")));
            }
        }
        if let Some(topic_id) = task.topic_id.as_deref() {
            if !self.topics.contains(topic_id)? {
                return Err(AppError::Validation(format!("topic {topic_id} does not exist")));
            }
        }
        if let Some(score) = task.score {
            if !score.is_finite() || score < 0.0 {
                return Err(AppError::Validation(format!("invalid score {score}")));
            }
        }
        Ok(())
    }

    pub fn check_tutor(&self, tutor: &Tutor) -> AppResult<()> {
        for subject_id in &tutor.subjects {
            if !self.subjects.contains(subject_id)? {
                return Err(AppError::Validation(format!("subject {subject_id} does not exist")));
            }
        }
        Ok(())
    }

    pub fn delete_subject(&self, id: &str) -> AppResult<Subject> {
        if self.topics.any(|t| t.subject_id == id)? {
            return Err(AppError::Conflict(format!("subject {id} still has topics")));
        }
        if self.tutors.any(|t| t.subjects.iter().any(|s| s == id))? {
            return Err(AppError::Conflict(format!("subject {id} is assigned to tutors")));
        }
        self.subjects.delete(id)
    }

    pub fn delete_topic(&self, id: &str) -> AppResult<Topic> {
        if self.topics.any(|t| t.parent_id.as_deref() == Some(id))? {
            return Err(AppError::Conflict(format!("topic {id} still has subtopics")));
        }
        if self.tasks.any(|t| t.topic_id.as_deref() == Some(id))? {
            return Err(AppError::Conflict(format!("topic {id} is referenced by tasks")));
        }
        self.topics.delete(id)
    }

    pub fn delete_client(&self, id: &str) -> AppResult<Client> {
        if self.tasks.any(|t| t.client_id == id)? {
            return Err(AppError::Conflict(format!("client {id} still has tasks")));
        }
        self.clients.delete(id)
    }

    pub fn delete_tutor(&self, id: &str) -> AppResult<Tutor> {
        if self.tasks.any(|t| t.worker_id.as_deref() == Some(id))? {
            return Err(AppError::Conflict(format!("tutor {id} still has assigned tasks")));
        }
        self.tutors.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn open() -> (tempfile::TempDir, AppStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = AppStorage::new(dir.path().to_str().unwrap(), 1000).unwrap();
        (dir, storage)
    }

    fn topic(id: &str, subject_id: &str, parent_id: Option<&str>) -> Topic {
        Topic {
            id: id.into(),
            name: id.into(),
            subject_id: subject_id.into(),
            parent_id: parent_id.map(Into::into),
        }
    }

    fn seed_subjects(storage: &AppStorage) {
        for id in ["s1", "s2"] {
            storage
                .subjects
                .insert(&Subject {
                    id: id.into(),
                    name: id.into(),
                })
                .unwrap();
        }
    }

    #[test]
    fn topic_parent_rules() {
        let (_dir, storage) = open();
        seed_subjects(&storage);
        storage.topics.insert(&topic("t1", "s1", None)).unwrap();
        storage.topics.insert(&topic("t2", "s1", Some("t1"))).unwrap();

        assert!(storage.check_topic(&topic("t3", "s1", Some("t1"))).is_ok());
        assert!(matches!(
            storage.check_topic(&topic("t3", "s2", Some("t1"))),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            storage.check_topic(&topic("t3", "s1", Some("t2"))),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            storage.check_topic(&topic("t3", "s9", None)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            storage.check_topic(&topic("t1", "s1", Some("t1"))),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn delete_guards_keep_references_intact() {
        let (_dir, storage) = open();
        seed_subjects(&storage);
        storage.topics.insert(&topic("t1", "s1", None)).unwrap();
        storage.topics.insert(&topic("t2", "s1", Some("t1"))).unwrap();
        let now = Utc::now();
        storage
            .clients
            .insert(&Client {
                id: "c1".into(),
                name: "Jane".into(),
                email: None,
                progress: None,
                created_at: now,
                updated_at: None,
            })
            .unwrap();
        storage
            .tasks
            .insert(&Task {
                id: "k1".into(),
                title: "Essay".into(),
                status: Default::default(),
                due_date: now,
                created_at: now,
                updated_at: None,
                client_id: "c1".into(),
                worker_id: None,
                topic_id: Some("t2".into()),
                score: None,
            })
            .unwrap();

        assert!(matches!(storage.delete_subject("s1"), Err(AppError::Conflict(_))));
        assert!(matches!(storage.delete_topic("t1"), Err(AppError::Conflict(_))));
        assert!(matches!(storage.delete_topic("t2"), Err(AppError::Conflict(_))));
        assert!(matches!(storage.delete_client("c1"), Err(AppError::Conflict(_))));

        storage.tasks.delete("k1").unwrap();
        storage.delete_topic("t2").unwrap();
        storage.delete_topic("t1").unwrap();
        storage.delete_subject("s1").unwrap();
        storage.delete_client("c1").unwrap();
        assert_eq!(storage.counts().subjects, 1);
    }

    #[test]
    fn snapshot_keeps_newest_records_past_fetch_limit() {
        let dir = tempfile::tempdir().unwrap();
        let storage = AppStorage::new(dir.path().to_str().unwrap(), 1).unwrap();
        seed_subjects(&storage);
        let now = Utc::now();
        storage
            .clients
            .insert(&Client {
                id: "c1".into(),
                name: "Jane".into(),
                email: None,
                progress: None,
                created_at: now,
                updated_at: None,
            })
            .unwrap();
        for (id, title) in [("01AAAAAAAAAAAAAAAAAAAAAAAA", "Old"), ("01ZZZZZZZZZZZZZZZZZZZZZZZZ", "New")] {
            storage
                .tasks
                .insert(&Task {
                    id: id.into(),
                    title: title.into(),
                    status: Default::default(),
                    due_date: now,
                    created_at: now,
                    updated_at: None,
                    client_id: "c1".into(),
                    worker_id: None,
                    topic_id: None,
                    score: None,
                })
                .unwrap();
        }

        let snapshot = storage.snapshot().unwrap();
        assert_eq!(snapshot.subjects.len(), 1);
        assert_eq!(snapshot.subjects[0].id, "s2");
        assert_eq!(storage.counts().subjects, 2);

        let view = crate::dashboard::aggregate(
            &snapshot,
            now.fixed_offset(),
            crate::dashboard::DashboardVariant::Overview,
        );
        let feed: Vec<&str> = view.recent_activity.iter().map(|a| a.task_id.as_str()).collect();
        assert_eq!(feed, vec!["01ZZZZZZZZZZZZZZZZZZZZZZZZ"]);
    }
}
