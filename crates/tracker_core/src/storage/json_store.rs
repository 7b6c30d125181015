use crate::error::AppError;
use crate::model::{Task, TaskStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
pub const STORE_FILE_NAME: &str = "tasks.json";
pub const STORE_ENV_VAR: &str = "TRACKER_STORE_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredTasks {
    schema_version: u32,
    #[serde(default)]
    next_id: u64,
    tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskState {
    pub tasks: Vec<Task>,
    pub next_id: u64,
}

impl Default for TaskState {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }
}

impl TaskState {
    /// Hands out the next id and advances the counter.
    pub fn allocate_id(&mut self) -> Result<u64, AppError> {
        let id = self.next_id;
        self.next_id = successor(id)?;
        Ok(id)
    }
}

fn successor(id: u64) -> Result<u64, AppError> {
    id.checked_add(1)
        .ok_or_else(|| AppError::invalid_data("task id space exhausted"))
}

pub fn env_store_path() -> Option<PathBuf> {
    std::env::var(STORE_ENV_VAR)
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
}

/// Per-user directory holding the store and the config file.
pub fn app_dir() -> Result<PathBuf, AppError> {
    let (var, nested) = if cfg!(windows) {
        ("APPDATA", None)
    } else {
        ("HOME", Some(".config"))
    };
    let base = std::env::var(var).map_err(|_| AppError::invalid_data(format!("{var} is not set")))?;
    let mut dir = PathBuf::from(base);
    dir.extend(nested);
    Ok(dir.join("tracker"))
}

pub fn default_store_path() -> Result<PathBuf, AppError> {
    Ok(app_dir()?.join(STORE_FILE_NAME))
}

pub fn load_state(path: &Path) -> Result<TaskState, AppError> {
    if !path.exists() {
        return Ok(TaskState::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::store_read(format!("{}: {}", path.display(), err)))?;
    let stored: StoredTasks =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if stored.schema_version != SCHEMA_VERSION {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    let mut seen = HashSet::with_capacity(stored.tasks.len());
    for task in &stored.tasks {
        if !seen.insert(task.id) {
            return Err(AppError::invalid_data(format!(
                "duplicate task id {}",
                task.id
            )));
        }
        if (task.status == TaskStatus::Completed) != task.completed_at.is_some() {
            return Err(AppError::invalid_data(format!(
                "task {} completed_at does not match its status",
                task.id
            )));
        }
    }

    let floor = successor(stored.tasks.iter().map(|task| task.id).max().unwrap_or(0))?;
    Ok(TaskState {
        next_id: stored.next_id.max(floor),
        tasks: stored.tasks,
    })
}

/// Writes to a sibling temp file and renames it over `path`, so a failed
/// write never leaves a truncated document behind.
pub fn save_state(path: &Path, state: &TaskState) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| AppError::store_write(err.to_string()))?;
    }

    let stored = StoredTasks {
        schema_version: SCHEMA_VERSION,
        next_id: state.next_id,
        tasks: state.tasks.to_vec(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;

    let staging = staging_path(path);
    if let Err(err) = write_staging(&staging, &content) {
        std::fs::remove_file(&staging).ok();
        return Err(err);
    }
    std::fs::rename(&staging, path).map_err(|err| {
        std::fs::remove_file(&staging).ok();
        AppError::store_write(format!("{}: {}", path.display(), err))
    })
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| STORE_FILE_NAME.into());
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_staging(staging: &Path, content: &str) -> Result<(), AppError> {
    std::fs::write(staging, content)
        .map_err(|err| AppError::store_write(format!("{}: {}", staging.display(), err)))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(staging, permissions)
            .map_err(|err| AppError::store_write(err.to_string()))?;
    }

    Ok(())
}
