use std::fmt;

use serde::Serialize;

use super::{DashboardVariant, stats::DashboardStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    UnstartedClients,
    OverdueTasks,
    DueToday,
    DueThisWeek,
    NewClientsThisMonth,
}

impl NotificationKind {
    pub fn title(&self) -> &'static str {
        match self {
            NotificationKind::UnstartedClients => "Unstarted Clients",
            NotificationKind::OverdueTasks => "Overdue Tasks",
            NotificationKind::DueToday => "Due Today",
            NotificationKind::DueThisWeek => "Due This Week",
            NotificationKind::NewClientsThisMonth => "New Clients This Month",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            NotificationKind::OverdueTasks => Severity::Critical,
            NotificationKind::UnstartedClients | NotificationKind::DueToday => Severity::Warning,
            NotificationKind::DueThisWeek | NotificationKind::NewClientsThisMonth => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: &'static str,
    pub count: usize,
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    fn new(kind: NotificationKind, count: usize) -> Self {
        let message = match kind {
            NotificationKind::UnstartedClients => {
                format!("{} not started yet", plural(count, "client has", "clients have"))
            }
            NotificationKind::OverdueTasks => {
                format!("{} past the due date", plural(count, "task is", "tasks are"))
            }
            NotificationKind::DueToday => format!("{} due today", plural(count, "task is", "tasks are")),
            NotificationKind::DueThisWeek => {
                format!("{} due this week", plural(count, "task is", "tasks are"))
            }
            NotificationKind::NewClientsThisMonth => {
                format!("{} joined this month", plural(count, "client", "clients"))
            }
        };
        Self {
            kind,
            title: kind.title(),
            count,
            severity: kind.severity(),
            message,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.count)
    }
}

/// One notification per positive trigger, in a fixed order.
pub fn notifications(stats: &DashboardStats, variant: DashboardVariant) -> Vec<Notification> {
    let mut triggers = vec![
        (NotificationKind::UnstartedClients, stats.not_started_clients),
        (NotificationKind::OverdueTasks, stats.overdue_tasks),
        (NotificationKind::DueToday, stats.due_today),
        (NotificationKind::DueThisWeek, stats.due_this_week),
    ];
    if variant == DashboardVariant::Admin {
        triggers.push((
            NotificationKind::NewClientsThisMonth,
            stats.new_clients_this_month.unwrap_or(0),
        ));
    }

    triggers
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(kind, count)| Notification::new(kind, count))
        .collect()
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}
