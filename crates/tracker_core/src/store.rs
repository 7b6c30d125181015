use crate::clock;
use crate::config::Config;
use crate::error::AppError;
use crate::model::{NewTask, Statistics, Task, TaskFilter, TaskStatus, validate_title};
use crate::storage::json_store::{self, TaskState};
use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use time::Date;
use tracing::{debug, warn};

/// Durable task collection backed by a single JSON document.
///
/// Every call reads the document fresh and mutations write it back whole, so
/// the value holds nothing but the location of the file.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self::open(config.resolved_store_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn create(&self, input: NewTask) -> Result<Task, AppError> {
        let title = validate_title(&input.title)?.to_string();

        let mut state = self.load()?;
        let task = Task {
            id: state.allocate_id()?,
            title,
            description: input.description.trim().to_string(),
            category: input.category,
            priority: input.priority,
            status: TaskStatus::Pending,
            due_date: input.due_date,
            created_at: clock::now(),
            completed_at: None,
        };
        state.tasks.push(task.clone());
        self.persist(&state)?;

        debug!(task_id = task.id, category = %task.category, "created task");
        Ok(task)
    }

    /// All tasks, newest first.
    pub fn all(&self) -> Result<Vec<Task>, AppError> {
        self.filter(&TaskFilter::default())
    }

    pub fn get(&self, id: u64) -> Result<Task, AppError> {
        self.load()?
            .tasks
            .into_iter()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::not_found(id))
    }

    /// Moves a task to `status`. Entering Completed stamps `completed_at`,
    /// any other status clears it.
    pub fn update_status(&self, id: u64, status: TaskStatus) -> Result<Task, AppError> {
        let mut state = self.load()?;
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::not_found(id))?;

        task.status = status;
        task.completed_at = match status {
            TaskStatus::Completed => Some(clock::now()),
            TaskStatus::Pending | TaskStatus::InProgress => None,
        };
        let updated = task.clone();
        self.persist(&state)?;

        debug!(task_id = id, status = %status, "updated task status");
        Ok(updated)
    }

    /// Removes a task. A missing id is `NotFound` and leaves the store as is.
    pub fn delete(&self, id: u64) -> Result<Task, AppError> {
        let mut state = self.load()?;
        let index = state
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| AppError::not_found(id))?;

        let removed = state.tasks.remove(index);
        self.persist(&state)?;

        debug!(task_id = id, "deleted task");
        Ok(removed)
    }

    /// Tasks matching every criterion set on `filter`, newest first.
    pub fn filter(&self, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
        let mut tasks: Vec<Task> = self
            .load()?
            .tasks
            .into_iter()
            .filter(|task| filter.matches(task))
            .collect();
        sort_newest_first(&mut tasks);
        Ok(tasks)
    }

    pub fn statistics(&self) -> Result<Statistics, AppError> {
        self.statistics_on(clock::today())
    }

    pub fn statistics_on(&self, today: Date) -> Result<Statistics, AppError> {
        Ok(statistics_for(&self.load()?.tasks, today))
    }

    fn load(&self) -> Result<TaskState, AppError> {
        json_store::load_state(&self.path).inspect_err(|err| {
            warn!(path = %self.path.display(), error = %err, "failed to load task store");
        })
    }

    fn persist(&self, state: &TaskState) -> Result<(), AppError> {
        json_store::save_state(&self.path, state).inspect_err(|err| {
            warn!(path = %self.path.display(), error = %err, "failed to write task store");
        })
    }
}

fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| Reverse((task.created_at, task.id)));
}

/// Counts per status plus open tasks whose due date is before `today`.
pub fn statistics_for(tasks: &[Task], today: Date) -> Statistics {
    let mut stats = Statistics {
        total: tasks.len(),
        ..Statistics::default()
    };
    for task in tasks {
        match task.status {
            TaskStatus::Completed => stats.completed += 1,
            TaskStatus::Pending => stats.pending += 1,
            TaskStatus::InProgress => stats.in_progress += 1,
        }
        if task.is_overdue_on(today) {
            stats.overdue += 1;
        }
    }
    stats
}
