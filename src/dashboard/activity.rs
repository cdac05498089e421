use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use super::{DashboardSnapshot, DashboardVariant, calendar};
use crate::{
    models::{RecordId, TaskStatus},
    utils::short_id,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub task_id: RecordId,
    pub status: TaskStatus,
    pub message: String,
    pub time: String,
    pub timestamp: DateTime<Utc>,
}

/// Most recently touched tasks, newest first, as one-line messages.
pub fn recent_activity(
    snapshot: &DashboardSnapshot,
    now: DateTime<FixedOffset>,
    variant: DashboardVariant,
) -> Vec<ActivityItem> {
    let clients: HashMap<&str, &str> = snapshot
        .clients
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();
    let tutors: HashMap<&str, &str> = snapshot
        .tutors
        .iter()
        .map(|t| (t.id.as_str(), t.full_name.as_str()))
        .collect();

    let mut tasks: Vec<_> = snapshot.tasks.iter().collect();
    tasks.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));

    tasks
        .into_iter()
        .take(variant.recent_activity_limit())
        .map(|task| {
            let client = clients
                .get(task.client_id.as_str())
                .copied()
                .unwrap_or("unknown client");
            let message = match variant {
                DashboardVariant::Overview => format!(
                    "Task #{} for {} is {}",
                    short_id(&task.id),
                    client,
                    task.status
                ),
                DashboardVariant::Admin => {
                    let tutor = task
                        .worker_id
                        .as_deref()
                        .and_then(|id| tutors.get(id))
                        .copied()
                        .unwrap_or("Unassigned");
                    format!(
                        "{} · Task #{} for {} is {}",
                        tutor,
                        short_id(&task.id),
                        client,
                        task.status
                    )
                }
            };
            let timestamp = task.last_activity();
            ActivityItem {
                task_id: task.id.clone(),
                status: task.status,
                message,
                time: calendar::time_of_day(timestamp, now),
                timestamp,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, Task, Tutor};
    use chrono::TimeDelta;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-05-15T15:07:00+00:00").unwrap()
    }

    fn task(id: &str, minutes_ago: i64, updated: bool, worker: Option<&str>) -> Task {
        let at = now().with_timezone(&Utc) - TimeDelta::minutes(minutes_ago);
        Task {
            id: id.into(),
            title: "Essay".into(),
            status: TaskStatus::InProgress,
            due_date: at,
            created_at: if updated { at - TimeDelta::days(3) } else { at },
            updated_at: updated.then_some(at),
            client_id: "c1".into(),
            worker_id: worker.map(Into::into),
            topic_id: None,
            score: None,
        }
    }

    fn snapshot(tasks: Vec<Task>) -> DashboardSnapshot {
        DashboardSnapshot {
            clients: vec![Client {
                id: "c1".into(),
                name: "Jane Doe".into(),
                email: None,
                progress: None,
                created_at: now().with_timezone(&Utc),
                updated_at: None,
            }],
            tutors: vec![Tutor {
                id: "w1".into(),
                full_name: "Sam Lee".into(),
                email: None,
                subjects: vec![],
            }],
            tasks,
            ..DashboardSnapshot::default()
        }
    }

    #[test]
    fn sorts_by_update_then_creation_and_caps() {
        let tasks: Vec<Task> = (0..7)
            .map(|i| task(&format!("task-{i}"), i * 10, i % 2 == 0, None))
            .collect();
        let items = recent_activity(&snapshot(tasks), now(), DashboardVariant::Overview);

        assert_eq!(items.len(), 5);
        let ids: Vec<&str> = items.iter().map(|i| i.task_id.as_str()).collect();
        assert_eq!(ids, vec!["task-0", "task-1", "task-2", "task-3", "task-4"]);
        assert_eq!(items[0].time, "3:07 PM");
    }

    #[test]
    fn overview_message_names_client_and_status() {
        let items = recent_activity(
            &snapshot(vec![task("01ABCDEFGHJKMNPQRS", 0, true, None)]),
            now(),
            DashboardVariant::Overview,
        );
        assert_eq!(items[0].message, "Task #JKMNPQRS for Jane Doe is In Progress");
    }

    #[test]
    fn admin_message_names_tutor_or_unassigned() {
        let items = recent_activity(
            &snapshot(vec![
                task("t-assigned", 0, true, Some("w1")),
                task("t-free", 5, true, None),
            ]),
            now(),
            DashboardVariant::Admin,
        );
        assert!(items[0].message.starts_with("Sam Lee · "));
        assert!(items[1].message.starts_with("Unassigned · "));
    }
}
