//! Dashboard aggregation.
//!
//! # Responsibility
//! - Turn one collection snapshot into the dashboard view model: summary
//!   numbers, the seven-day chart, a categorical distribution, the recent
//!   activity feed and the notification list.
//!
//! # Invariants
//! - Pure and total: no I/O, no errors. Missing optional fields count as
//!   `0` or `"Unknown"`.
//! - Calendar boundaries (day, week, month) use the offset of `now`.
//! - Notifications are recomputed on every call; nothing is remembered.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::models::{Client, Subject, Task, Topic, Tutor};

pub mod activity;
pub mod calendar;
pub mod charts;
pub mod notifications;
pub mod stats;

pub use activity::ActivityItem;
pub use charts::{DayBucket, DistributionSlice};
pub use notifications::{Notification, NotificationKind, Severity};
pub use stats::DashboardStats;

/// Which dashboard is being built.
///
/// `Overview` groups clients by progress and lists 5 recent items.
/// `Admin` adds tutor/subject totals and new-client tracking, groups tasks
/// by subject (top 6) and lists 8 recent items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardVariant {
    #[default]
    Overview,
    Admin,
}

impl DashboardVariant {
    pub fn recent_activity_limit(&self) -> usize {
        match self {
            DashboardVariant::Overview => 5,
            DashboardVariant::Admin => 8,
        }
    }
}

impl FromStr for DashboardVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" | "" => Ok(DashboardVariant::Overview),
            "admin" => Ok(DashboardVariant::Admin),
            other => Err(format!("unknown dashboard variant `{other}`")),
        }
    }
}

/// Collections loaded for one request.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub subjects: Vec<Subject>,
    pub topics: Vec<Topic>,
    pub clients: Vec<Client>,
    pub tasks: Vec<Task>,
    pub tutors: Vec<Tutor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub variant: DashboardVariant,
    pub generated_at: DateTime<FixedOffset>,
    pub stats: DashboardStats,
    pub weekly_chart: Vec<DayBucket>,
    pub distribution: Vec<DistributionSlice>,
    pub recent_activity: Vec<ActivityItem>,
    pub notifications: Vec<Notification>,
}

/// Builds the dashboard for `snapshot` as seen at `now`.
pub fn aggregate(
    snapshot: &DashboardSnapshot,
    now: DateTime<FixedOffset>,
    variant: DashboardVariant,
) -> DashboardView {
    let stats = stats::compute_stats(snapshot, now, variant);
    let distribution = match variant {
        DashboardVariant::Overview => charts::client_progress_distribution(&snapshot.clients),
        DashboardVariant::Admin => charts::subject_distribution(
            &snapshot.tasks,
            &snapshot.topics,
            &snapshot.subjects,
            charts::TOP_SUBJECTS,
        ),
    };
    let notifications = notifications::notifications(&stats, variant);

    DashboardView {
        variant,
        generated_at: now,
        weekly_chart: charts::weekly_chart(&snapshot.tasks, now),
        distribution,
        recent_activity: activity::recent_activity(snapshot, now, variant),
        notifications,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClientProgress, TaskStatus};
    use chrono::{TimeDelta, Utc};

    fn now() -> DateTime<FixedOffset> {
        // Monday, so +2 days stays inside the current week
        DateTime::parse_from_rfc3339("2024-05-13T10:00:00+00:00").unwrap()
    }

    fn task(id: &str, status: TaskStatus, due_in_days: i64) -> Task {
        let base = now().with_timezone(&Utc);
        Task {
            id: id.into(),
            title: "Essay".into(),
            status,
            due_date: base + TimeDelta::days(due_in_days),
            created_at: base - TimeDelta::days(3),
            updated_at: Some(base - TimeDelta::hours(1)),
            client_id: "c1".into(),
            worker_id: None,
            topic_id: None,
            score: None,
        }
    }

    #[test]
    fn pending_and_completed_example() {
        let snapshot = DashboardSnapshot {
            tasks: vec![
                task("t1", TaskStatus::Pending, 2),
                task("t2", TaskStatus::Completed, -1),
            ],
            clients: vec![Client {
                id: "c1".into(),
                name: "Jane".into(),
                email: None,
                progress: Some(ClientProgress::NotStarted),
                created_at: now().with_timezone(&Utc),
                updated_at: None,
            }],
            ..DashboardSnapshot::default()
        };

        let view = aggregate(&snapshot, now(), DashboardVariant::Overview);

        assert_eq!(view.stats.pending_tasks, 1);
        assert_eq!(view.stats.completed_tasks, 1);
        assert_eq!(view.stats.overdue_tasks, 0);
        assert_eq!(view.stats.completion_rate, 50);
        let unstarted: Vec<String> = view
            .notifications
            .iter()
            .filter(|n| n.kind == NotificationKind::UnstartedClients)
            .map(ToString::to_string)
            .collect();
        assert_eq!(unstarted, vec!["Unstarted Clients: 1"]);
        assert_eq!(view.weekly_chart.len(), 7);
        assert_eq!(view.distribution[0].name, "Not Started");
        assert_eq!(view.stats.total_tutors, None);
    }

    #[test]
    fn admin_variant_fills_extra_stats() {
        let snapshot = DashboardSnapshot {
            subjects: vec![Subject {
                id: "s1".into(),
                name: "Maths".into(),
            }],
            tutors: vec![Tutor {
                id: "w1".into(),
                full_name: "Sam".into(),
                email: None,
                subjects: vec!["s1".into()],
            }],
            ..DashboardSnapshot::default()
        };

        let view = aggregate(&snapshot, now(), DashboardVariant::Admin);

        assert_eq!(view.stats.total_tutors, Some(1));
        assert_eq!(view.stats.total_subjects, Some(1));
        assert_eq!(view.stats.new_clients_this_month, Some(0));
        assert!(view.notifications.is_empty());
        assert!(view.distribution.is_empty());
    }

    #[test]
    fn empty_snapshot_is_all_zero() {
        let view = aggregate(&DashboardSnapshot::default(), now(), DashboardVariant::Overview);
        assert_eq!(view.stats.total_tasks, 0);
        assert_eq!(view.stats.completion_rate, 0);
        assert_eq!(view.stats.average_score, 0.0);
        assert!(view.recent_activity.is_empty());
        assert!(view.notifications.is_empty());
    }

    #[test]
    fn variant_parsing() {
        assert_eq!("ADMIN".parse::<DashboardVariant>().unwrap(), DashboardVariant::Admin);
        assert_eq!("".parse::<DashboardVariant>().unwrap(), DashboardVariant::Overview);
        assert!("weekly".parse::<DashboardVariant>().is_err());
    }
}
