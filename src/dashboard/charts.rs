use std::collections::HashMap;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeDelta};
use indexmap::IndexMap;
use serde::Serialize;

use super::{calendar, stats::percentage};
use crate::models::{Client, Subject, Task, Topic};

/// Colors assigned to distribution slices by position.
pub const PALETTE: [&str; 6] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899",
];

pub const UNKNOWN_BUCKET: &str = "Unknown";

/// Number of slices kept by the ranked subject distribution.
pub const TOP_SUBJECTS: usize = 6;

/// One day of the rolling seven-day activity chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    /// Short weekday name as chrono prints it (`Mon`).
    pub label: String,
    pub date: NaiveDate,
    pub completed: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSlice {
    pub name: String,
    pub count: usize,
    pub percentage: u32,
    pub color: &'static str,
}

/// The last seven days ending today, oldest first. A completed task counts
/// on the day of its last activity (update, or creation when never updated);
/// any other task counts as pending on the day it was created.
pub fn weekly_chart(tasks: &[Task], now: DateTime<FixedOffset>) -> Vec<DayBucket> {
    (0..7)
        .rev()
        .map(|days_ago| {
            let day = now - TimeDelta::days(days_ago);
            let completed = tasks
                .iter()
                .filter(|t| t.status.is_completed())
                .filter(|t| calendar::is_same_day(t.last_activity(), day))
                .count();
            let pending = tasks
                .iter()
                .filter(|t| !t.status.is_completed())
                .filter(|t| calendar::is_same_day(t.created_at, day))
                .count();
            DayBucket {
                label: day.weekday().to_string(),
                date: day.date_naive(),
                completed,
                pending,
            }
        })
        .collect()
}

/// Clients grouped by progress label in first-seen order.
pub fn client_progress_distribution(clients: &[Client]) -> Vec<DistributionSlice> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for client in clients {
        let label = client
            .progress
            .map(|p| p.label())
            .unwrap_or(UNKNOWN_BUCKET);
        *counts.entry(label.to_string()).or_default() += 1;
    }
    into_slices(counts, clients.len())
}

/// Tasks grouped by the subject their topic belongs to, ranked by count
/// and cut to the top `limit`. Percentages stay relative to all tasks.
pub fn subject_distribution(
    tasks: &[Task],
    topics: &[Topic],
    subjects: &[Subject],
    limit: usize,
) -> Vec<DistributionSlice> {
    let subject_names: HashMap<&str, &str> = subjects
        .iter()
        .map(|s| (s.id.as_str(), s.name.as_str()))
        .collect();
    let topic_subjects: HashMap<&str, &str> = topics
        .iter()
        .map(|t| (t.id.as_str(), t.subject_id.as_str()))
        .collect();

    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for task in tasks {
        let name = task
            .topic_id
            .as_deref()
            .and_then(|topic| topic_subjects.get(topic))
            .and_then(|subject| subject_names.get(subject))
            .copied()
            .unwrap_or(UNKNOWN_BUCKET);
        *counts.entry(name.to_string()).or_default() += 1;
    }

    // stable sort: ties keep first-seen order
    counts.sort_by(|_, a, _, b| b.cmp(a));
    counts.truncate(limit);
    into_slices(counts, tasks.len())
}

fn into_slices(counts: IndexMap<String, usize>, total: usize) -> Vec<DistributionSlice> {
    counts
        .into_iter()
        .enumerate()
        .map(|(index, (name, count))| DistributionSlice {
            name,
            count,
            percentage: percentage(count, total),
            color: PALETTE[index % PALETTE.len()],
        })
        .collect()
}
