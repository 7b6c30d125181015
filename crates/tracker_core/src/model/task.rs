use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::{Date, OffsetDateTime};

pub const MAX_TITLE_LEN: usize = 200;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: TaskStatus,
    #[serde(default, with = "iso_date::option")]
    pub due_date: Option<Date>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Past its due date and still open.
    pub fn is_overdue_on(&self, today: Date) -> bool {
        !self.is_completed() && self.due_date.is_some_and(|due| due < today)
    }
}

/// Input accepted by the store's create operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub due_date: Option<Date>,
}

impl NewTask {
    pub fn new<T: Into<String>>(title: T, category: Category, priority: Priority) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            category,
            priority,
            due_date: None,
        }
    }

    pub fn with_description<D: Into<String>>(mut self, description: D) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_due_date(mut self, due_date: Option<Date>) -> Self {
        self.due_date = due_date;
        self
    }
}

/// Trims the title and checks it is non-empty and at most 200 characters.
pub fn validate_title(title: &str) -> Result<&str, AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("task title cannot be empty"));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::validation(format!(
            "task title too long (max {MAX_TITLE_LEN} characters)"
        )));
    }
    Ok(trimmed)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|status| task.status == status)
            && self.category.is_none_or(|category| task.category == category)
            && self.priority.is_none_or(|priority| task.priority == priority)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Work,
    Personal,
    Health,
    Study,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Work,
        Category::Personal,
        Category::Health,
        Category::Study,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Personal => "Personal",
            Self::Health => "Health",
            Self::Study => "Study",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

fn normalize_label(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '-' | '_'))
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

fn parse_label<T: Copy>(
    raw: &str,
    candidates: &[T],
    label: fn(T) -> &'static str,
    kind: &str,
) -> Result<T, AppError> {
    let wanted = normalize_label(raw);
    candidates
        .iter()
        .copied()
        .find(|candidate| normalize_label(label(*candidate)) == wanted)
        .ok_or_else(|| AppError::validation(format!("unknown {kind} '{}'", raw.trim())))
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_label(raw, &Self::ALL, Self::label, "category")
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_label(raw, &Self::ALL, Self::label, "priority")
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_label(raw, &Self::ALL, Self::label, "status")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Category, MAX_TITLE_LEN, Priority, Task, TaskFilter, TaskStatus, validate_title,
    };
    use time::macros::{date, datetime};

    fn sample() -> Task {
        Task {
            id: 1,
            title: "write report".to_string(),
            description: String::new(),
            category: Category::Work,
            priority: Priority::High,
            status: TaskStatus::Pending,
            due_date: Some(date!(2025 - 12 - 20)),
            created_at: datetime!(2025-12-01 08:00:00 UTC),
            completed_at: None,
        }
    }

    #[test]
    fn validate_title_trims_and_checks_length() {
        assert_eq!(validate_title("  demo  ").unwrap(), "demo");
        assert_eq!(validate_title("   ").unwrap_err().code(), "validation_error");

        let longest = "a".repeat(MAX_TITLE_LEN);
        assert!(validate_title(&longest).is_ok());
        let too_long = "a".repeat(MAX_TITLE_LEN + 1);
        assert_eq!(validate_title(&too_long).unwrap_err().code(), "validation_error");
    }

    #[test]
    fn status_labels_parse_loosely() {
        assert_eq!("in progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("In-Progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("in_progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("COMPLETED".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
        assert_eq!(" work ".parse::<Category>().unwrap(), Category::Work);
        assert_eq!("low".parse::<Priority>().unwrap(), Priority::Low);
    }

    #[test]
    fn unknown_labels_are_rejected() {
        let err = "urgent".parse::<Priority>().unwrap_err();
        assert_eq!(err.code(), "validation_error");
        assert!(err.message().contains("urgent"));
        assert!("Hobby".parse::<Category>().is_err());
    }

    #[test]
    fn task_serializes_with_display_labels() {
        let mut task = sample();
        task.status = TaskStatus::InProgress;
        let value = serde_json::to_value(&task).unwrap();

        assert_eq!(value["status"], "In Progress");
        assert_eq!(value["category"], "Work");
        assert_eq!(value["due_date"], "2025-12-20");
        assert_eq!(value["created_at"], "2025-12-01T08:00:00Z");
        assert!(value["completed_at"].is_null());
    }

    #[test]
    fn task_deserializes_without_optional_fields() {
        let content = r#"{
            "id": 7,
            "title": "stretch",
            "category": "Health",
            "priority": "Low",
            "status": "Pending",
            "created_at": "2025-12-01T08:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(content).unwrap();

        assert_eq!(task.id, 7);
        assert!(task.description.is_empty());
        assert_eq!(task.due_date, None);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn overdue_requires_past_due_date_and_open_status() {
        let task = sample();
        assert!(task.is_overdue_on(date!(2025 - 12 - 21)));
        assert!(!task.is_overdue_on(date!(2025 - 12 - 20)));

        let mut done = sample();
        done.status = TaskStatus::Completed;
        assert!(!done.is_overdue_on(date!(2025 - 12 - 21)));
    }

    #[test]
    fn filter_ands_provided_criteria() {
        let task = sample();
        assert!(TaskFilter::default().matches(&task));
        assert!(
            TaskFilter {
                category: Some(Category::Work),
                priority: Some(Priority::High),
                ..TaskFilter::default()
            }
            .matches(&task)
        );
        assert!(
            !TaskFilter {
                category: Some(Category::Work),
                status: Some(TaskStatus::Completed),
                ..TaskFilter::default()
            }
            .matches(&task)
        );
    }
}
