use crate::model::{Task, TaskStatus};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use time::Date;

/// Days at or below which an open task counts as urgent.
pub const URGENT_WINDOW_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UrgencyCategory {
    Completed,
    #[serde(rename = "No Deadline")]
    NoDeadline,
    Overdue,
    #[serde(rename = "Due Today")]
    DueToday,
    Urgent,
    #[serde(rename = "On Track")]
    OnTrack,
}

impl UrgencyCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::NoDeadline => "No Deadline",
            Self::Overdue => "Overdue",
            Self::DueToday => "Due Today",
            Self::Urgent => "Urgent",
            Self::OnTrack => "On Track",
        }
    }
}

impl fmt::Display for UrgencyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn days_remaining(due_date: Option<Date>, today: Date) -> Option<i64> {
    due_date.map(|due| (due - today).whole_days())
}

/// Status wins over the date: a completed task is never overdue.
pub fn urgency(due_date: Option<Date>, status: TaskStatus, today: Date) -> UrgencyCategory {
    if status == TaskStatus::Completed {
        return UrgencyCategory::Completed;
    }

    match days_remaining(due_date, today) {
        None => UrgencyCategory::NoDeadline,
        Some(days) if days < 0 => UrgencyCategory::Overdue,
        Some(0) => UrgencyCategory::DueToday,
        Some(days) if days <= URGENT_WINDOW_DAYS => UrgencyCategory::Urgent,
        Some(_) => UrgencyCategory::OnTrack,
    }
}

pub fn task_urgency(task: &Task, today: Date) -> UrgencyCategory {
    urgency(task.due_date, task.status, today)
}

/// Percentage of completed tasks, rounded to two decimals; 0.0 for no tasks.
pub fn completion_rate(total: usize, completed: usize) -> f64 {
    (completion_percent(total, completed) * 100.0).round() / 100.0
}

pub(crate) fn completion_percent(total: usize, completed: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    completed as f64 * 100.0 / total as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakdownField {
    Category,
    Priority,
    Status,
}

impl BreakdownField {
    pub fn value_of(self, task: &Task) -> &'static str {
        match self {
            Self::Category => task.category.label(),
            Self::Priority => task.priority.label(),
            Self::Status => task.status.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownEntry {
    pub label: &'static str,
    pub count: usize,
}

/// Counts per distinct value of `field`, largest first. Equal counts keep the
/// order in which the values first appear in `tasks`.
pub fn breakdown_by(field: BreakdownField, tasks: &[Task]) -> Vec<BreakdownEntry> {
    let mut entries: Vec<BreakdownEntry> = Vec::new();
    for task in tasks {
        let label = field.value_of(task);
        match entries.iter_mut().find(|entry| entry.label == label) {
            Some(entry) => entry.count += 1,
            None => entries.push(BreakdownEntry { label, count: 1 }),
        }
    }
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

/// Completed tasks per UTC calendar day of `completed_at`, oldest day first.
pub fn completion_trend(tasks: &[Task]) -> Vec<(Date, usize)> {
    let mut per_day = BTreeMap::new();
    for completed_at in tasks.iter().filter_map(|task| task.completed_at) {
        *per_day.entry(completed_at.date()).or_insert(0) += 1;
    }
    per_day.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::{
        BreakdownEntry, BreakdownField, UrgencyCategory, breakdown_by, completion_rate,
        completion_trend, days_remaining, urgency,
    };
    use crate::model::{Category, Priority, Task, TaskStatus};
    use time::macros::{date, datetime};

    fn task(id: u64, category: Category, priority: Priority, status: TaskStatus) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            description: String::new(),
            category,
            priority,
            status,
            due_date: None,
            created_at: datetime!(2026-01-01 09:00:00 UTC),
            completed_at: None,
        }
    }

    #[test]
    fn days_remaining_counts_whole_days() {
        let today = date!(2026 - 01 - 10);
        assert_eq!(days_remaining(None, today), None);
        assert_eq!(days_remaining(Some(date!(2026 - 01 - 10)), today), Some(0));
        assert_eq!(days_remaining(Some(date!(2026 - 01 - 09)), today), Some(-1));
        assert_eq!(days_remaining(Some(date!(2026 - 02 - 09)), today), Some(30));
    }

    #[test]
    fn urgency_follows_check_order() {
        let today = date!(2026 - 01 - 10);
        let yesterday = Some(date!(2026 - 01 - 09));

        assert_eq!(urgency(yesterday, TaskStatus::Pending, today), UrgencyCategory::Overdue);
        assert_eq!(
            urgency(yesterday, TaskStatus::Completed, today),
            UrgencyCategory::Completed
        );
        assert_eq!(urgency(None, TaskStatus::Completed, today), UrgencyCategory::Completed);
        assert_eq!(urgency(None, TaskStatus::InProgress, today), UrgencyCategory::NoDeadline);
        assert_eq!(
            urgency(Some(today), TaskStatus::Pending, today),
            UrgencyCategory::DueToday
        );
        assert_eq!(
            urgency(Some(date!(2026 - 01 - 11)), TaskStatus::Pending, today),
            UrgencyCategory::Urgent
        );
        assert_eq!(
            urgency(Some(date!(2026 - 01 - 13)), TaskStatus::Pending, today),
            UrgencyCategory::Urgent
        );
        assert_eq!(
            urgency(Some(date!(2026 - 01 - 14)), TaskStatus::Pending, today),
            UrgencyCategory::OnTrack
        );
    }

    #[test]
    fn urgency_labels_are_human_readable() {
        assert_eq!(UrgencyCategory::NoDeadline.label(), "No Deadline");
        assert_eq!(UrgencyCategory::DueToday.to_string(), "Due Today");
        assert_eq!(UrgencyCategory::OnTrack.to_string(), "On Track");
    }

    #[test]
    fn completion_rate_handles_boundaries() {
        assert_eq!(completion_rate(0, 0), 0.0);
        assert_eq!(completion_rate(10, 3), 30.0);
        assert_eq!(completion_rate(3, 1), 33.33);
        assert_eq!(completion_rate(3, 2), 66.67);
        assert_eq!(completion_rate(4, 4), 100.0);
    }

    #[test]
    fn breakdown_sorts_by_count_with_stable_ties() {
        let tasks = vec![
            task(1, Category::Study, Priority::Low, TaskStatus::Pending),
            task(2, Category::Work, Priority::High, TaskStatus::Pending),
            task(3, Category::Work, Priority::Low, TaskStatus::Completed),
            task(4, Category::Health, Priority::High, TaskStatus::InProgress),
        ];

        assert_eq!(
            breakdown_by(BreakdownField::Category, &tasks),
            vec![
                BreakdownEntry { label: "Work", count: 2 },
                BreakdownEntry { label: "Study", count: 1 },
                BreakdownEntry { label: "Health", count: 1 },
            ]
        );
        assert_eq!(
            breakdown_by(BreakdownField::Priority, &tasks),
            vec![
                BreakdownEntry { label: "Low", count: 2 },
                BreakdownEntry { label: "High", count: 2 },
            ]
        );
        let statuses = breakdown_by(BreakdownField::Status, &tasks);
        assert_eq!(statuses[0], BreakdownEntry { label: "Pending", count: 2 });
        assert_eq!(statuses.iter().map(|entry| entry.count).sum::<usize>(), 4);
    }

    #[test]
    fn breakdown_of_nothing_is_empty() {
        assert!(breakdown_by(BreakdownField::Status, &[]).is_empty());
    }

    #[test]
    fn completion_trend_groups_by_day() {
        let mut first = task(1, Category::Work, Priority::Low, TaskStatus::Completed);
        first.completed_at = Some(datetime!(2026-01-03 18:00:00 UTC));
        let mut second = task(2, Category::Work, Priority::Low, TaskStatus::Completed);
        second.completed_at = Some(datetime!(2026-01-02 08:00:00 UTC));
        let mut third = task(3, Category::Work, Priority::Low, TaskStatus::Completed);
        third.completed_at = Some(datetime!(2026-01-03 07:30:00 UTC));
        let open = task(4, Category::Work, Priority::Low, TaskStatus::Pending);

        assert_eq!(
            completion_trend(&[first, second, third, open]),
            vec![(date!(2026 - 01 - 02), 1), (date!(2026 - 01 - 03), 2)]
        );
    }
}
