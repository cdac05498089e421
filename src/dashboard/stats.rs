use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use super::{DashboardSnapshot, DashboardVariant, calendar};
use crate::models::{ClientProgress, Task, TaskStatus};

/// Fixed-shape summary numbers. The `Option` fields are only filled by the
/// admin variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_tasks: usize,
    pub pending_tasks: usize,
    pub in_progress_tasks: usize,
    pub completed_tasks: usize,
    pub total_clients: usize,
    pub not_started_clients: usize,
    pub due_this_week: usize,
    pub due_today: usize,
    pub overdue_tasks: usize,
    pub completion_rate: u32,
    pub average_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tutors: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_subjects: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_clients_this_month: Option<usize>,
}

pub fn compute_stats(
    snapshot: &DashboardSnapshot,
    now: DateTime<FixedOffset>,
    variant: DashboardVariant,
) -> DashboardStats {
    let tasks = &snapshot.tasks;
    let count_status = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();

    let completed_tasks = count_status(TaskStatus::Completed);
    let total_tasks = tasks.len();
    let due_this_week = tasks
        .iter()
        .filter(|t| calendar::is_in_week_of(t.due_date, now))
        .count();
    let due_today = tasks
        .iter()
        .filter(|t| calendar::is_same_day(t.due_date, now))
        .count();
    let overdue_tasks = tasks.iter().filter(|t| is_overdue(t, now)).count();
    let not_started_clients = snapshot
        .clients
        .iter()
        .filter(|c| c.progress == Some(ClientProgress::NotStarted))
        .count();

    let admin = variant == DashboardVariant::Admin;
    let new_clients_this_month = admin.then(|| {
        snapshot
            .clients
            .iter()
            .filter(|c| calendar::is_same_month(c.created_at, now))
            .count()
    });

    DashboardStats {
        total_tasks,
        pending_tasks: count_status(TaskStatus::Pending),
        in_progress_tasks: count_status(TaskStatus::InProgress),
        completed_tasks,
        total_clients: snapshot.clients.len(),
        not_started_clients,
        due_this_week,
        due_today,
        overdue_tasks,
        completion_rate: completion_rate(completed_tasks, total_tasks),
        average_score: average_score(tasks),
        total_tutors: admin.then_some(snapshot.tutors.len()),
        total_subjects: admin.then_some(snapshot.subjects.len()),
        new_clients_this_month,
    }
}

/// Past due and not completed.
pub fn is_overdue(task: &Task, now: DateTime<FixedOffset>) -> bool {
    task.due_date < now.with_timezone(&Utc) && !task.status.is_completed()
}

/// `round(part / total × 100)`, or 0 for an empty total.
pub fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

pub fn completion_rate(completed: usize, total: usize) -> u32 {
    percentage(completed, total)
}

/// Mean score of completed tasks that carry one; 0 when there are none.
pub fn average_score(tasks: &[Task]) -> f64 {
    let scores: Vec<f64> = tasks
        .iter()
        .filter(|t| t.status.is_completed())
        .filter_map(|t| t.score)
        .filter(|score| score.is_finite())
        .collect();
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn task(status: TaskStatus, score: Option<f64>) -> Task {
        let now = Utc::now();
        Task {
            id: "t".into(),
            title: "Essay".into(),
            status,
            due_date: now,
            created_at: now,
            updated_at: None,
            client_id: "c".into(),
            worker_id: None,
            topic_id: None,
            score,
        }
    }

    #[test]
    fn completion_rate_handles_empty_and_rounds() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(3, 4), 75);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
    }

    #[test]
    fn average_score_ignores_unscored_and_unfinished_tasks() {
        let tasks = vec![
            task(TaskStatus::Completed, Some(80.0)),
            task(TaskStatus::Completed, Some(90.0)),
            task(TaskStatus::Completed, None),
            task(TaskStatus::Pending, Some(10.0)),
        ];
        assert_eq!(average_score(&tasks), 85.0);
        assert_eq!(average_score(&[task(TaskStatus::Pending, Some(50.0))]), 0.0);
        assert_eq!(average_score(&[]), 0.0);
    }

    #[test]
    fn overdue_excludes_completed_tasks() {
        let now = Utc::now().fixed_offset();
        let mut late = task(TaskStatus::InProgress, None);
        late.due_date = Utc::now() - TimeDelta::days(1);
        assert!(is_overdue(&late, now));
        late.status = TaskStatus::Completed;
        assert!(!is_overdue(&late, now));
    }
}
