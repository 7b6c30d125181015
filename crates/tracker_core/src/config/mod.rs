use crate::error::AppError;
use crate::storage::json_store;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILE_NAME: &str = "config.json";
pub const CONFIG_ENV_VAR: &str = "TRACKER_CONFIG_PATH";

/// When terminal output carries the status, priority and category colors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// `Auto` follows whether stdout is a terminal.
    pub fn enabled(self, stdout_is_terminal: bool) -> bool {
        match self {
            Self::Auto => stdout_is_terminal,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

impl FromStr for ColorMode {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" | "on" | "true" => Ok(Self::Always),
            "never" | "off" | "false" => Ok(Self::Never),
            other => Err(AppError::validation(format!(
                "unknown color mode '{other}' (use auto, always or never)"
            ))),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Always => "always",
            Self::Never => "never",
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub color: ColorMode,
}

/// Outcome of reading the config file: always usable settings, plus the
/// reason they are defaults when the file could not be used.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

impl ConfigLoad {
    fn defaults(error: Option<AppError>) -> Self {
        Self {
            config: Config::default(),
            error,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub color: Option<ColorMode>,
    pub store_path: Option<PathBuf>,
}

/// `TRACKER_CONFIG_PATH`, else `config.json` next to the default store.
pub fn config_file_path() -> Result<PathBuf, AppError> {
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(json_store::app_dir()?.join(CONFIG_FILE_NAME)),
    }
}

impl Config {
    pub fn load() -> ConfigLoad {
        match config_file_path() {
            Ok(path) => Self::load_from(&path),
            Err(err) => ConfigLoad::defaults(Some(err)),
        }
    }

    pub fn load_from(path: &Path) -> ConfigLoad {
        match Self::read(path) {
            Ok(Some(config)) => ConfigLoad {
                config,
                error: None,
            },
            Ok(None) => ConfigLoad::defaults(None),
            Err(err) => ConfigLoad::defaults(Some(err)),
        }
    }

    fn read(path: &Path) -> Result<Option<Self>, AppError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(AppError::store_read(format!(
                    "{}: {}",
                    path.display(),
                    err
                )));
            }
        };
        serde_json::from_str(&content).map(Some).map_err(|err| {
            AppError::invalid_data(format!("invalid config {}: {}", path.display(), err))
        })
    }

    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Self {
        Self {
            store_path: overrides
                .store_path
                .clone()
                .or_else(|| self.store_path.clone()),
            color: overrides.color.unwrap_or(self.color),
        }
    }

    /// `TRACKER_STORE_PATH` wins, then the configured path, then the default
    /// location under the user's config directory.
    pub fn resolved_store_path(&self) -> Result<PathBuf, AppError> {
        if let Some(path) = json_store::env_store_path() {
            return Ok(path);
        }
        match self.store_path.as_ref() {
            Some(path) => Ok(path.clone()),
            None => json_store::default_store_path(),
        }
    }
}
