use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tracker", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: tracker add "Write report" -c work -p high --due 2026-01-15
    Add {
        title: Option<String>,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Work, Personal, Health, Study or Other
        #[arg(short, long, default_value = "Other")]
        category: String,
        /// High, Medium or Low
        #[arg(short, long, default_value = "Medium")]
        priority: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long, value_name = "YYYY-MM-DD")]
        due: Option<String>,
    },
    /// List tasks, newest first
    ///
    /// Example: tracker list --status pending --category work
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        priority: Option<String>,
    },
    /// Show details of a task
    ///
    /// Example: tracker show 1
    Show { id: u64 },
    /// Change the status of a task
    ///
    /// Example: tracker status 1 "in progress"
    Status { id: u64, status: String },
    /// Mark a task as completed
    ///
    /// Example: tracker done 1
    Done { id: u64 },
    /// Delete a task
    ///
    /// Example: tracker delete 1
    Delete { id: u64 },
    /// Show task statistics
    ///
    /// Example: tracker stats
    Stats,
    /// Count tasks by category, priority or status
    ///
    /// Example: tracker breakdown priority
    Breakdown { field: String },
    /// Completed tasks per day
    ///
    /// Example: tracker trend
    Trend,
    /// Export tasks as csv, json or a text report
    ///
    /// Example: tracker export csv
    /// Example: tracker export report -o summary.txt
    /// Example: tracker export json -o - (write to stdout)
    Export {
        format: String,
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Color,
    StorePath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match field.as_str() {
        "color" | "colour" => ConfigOverrideTarget::Color,
        "store_path" | "store" => ConfigOverrideTarget::StorePath,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() {
        return Err(format!("{CONFIG_OVERRIDE_FLAG} {field} requires a value"));
    }

    Ok(ParsedConfigOverride { target, value })
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, ConfigOverrideTarget, parse_config_override};
    use clap::Parser;

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" COLOUR = Always ").unwrap();
        assert_eq!(parsed.target, ConfigOverrideTarget::Color);
        assert_eq!(parsed.value, "Always");

        let parsed = parse_config_override("store-path=/tmp/tasks.json").unwrap();
        assert_eq!(parsed.target, ConfigOverrideTarget::StorePath);
        assert_eq!(parsed.value, "/tmp/tasks.json");
    }

    #[test]
    fn parse_config_override_rejects_unknown_fields() {
        let err = parse_config_override("unknown.field=value").unwrap_err();
        assert!(err.contains("unknown config field"));
    }

    #[test]
    fn parse_config_override_rejects_missing_equals() {
        let err = parse_config_override("colornever").unwrap_err();
        assert!(err.contains("KEY=VALUE"));
    }

    #[test]
    fn parse_config_override_rejects_empty_value() {
        let err = parse_config_override("store_path= ").unwrap_err();
        assert!(err.contains("requires a value"));
    }

    #[test]
    fn add_defaults_category_and_priority() {
        let cli = Cli::try_parse_from(["tracker", "add", "demo"]).unwrap();
        match cli.command {
            Command::Add {
                title,
                category,
                priority,
                due,
                ..
            } => {
                assert_eq!(title.as_deref(), Some("demo"));
                assert_eq!(category, "Other");
                assert_eq!(priority, "Medium");
                assert_eq!(due, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_json_flag_follows_subcommand() {
        let cli = Cli::try_parse_from(["tracker", "stats", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Stats));
    }
}
