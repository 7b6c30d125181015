use clap::Parser;
use clap::error::ErrorKind;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::Date;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracker_cli::cli::{Cli, Command, ConfigOverrideTarget, parse_config_override};
use tracker_core::clock;
use tracker_core::config::{Config, ConfigOverrides};
use tracker_core::error::AppError;
use tracker_core::model::{NewTask, Painter, Statistics, Task, TaskFilter, TaskStatus};
use tracker_core::report::{self, BreakdownField, ExportFormat};
use tracker_core::store::TaskStore;

const LOG_ENV_VAR: &str = "TRACKER_LOG";

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "")]
    icon: &'static str,
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Urgency")]
    urgency: &'static str,
}

impl TaskRow {
    fn new(task: &Task, today: Date) -> Self {
        let plain = Painter::plain();
        Self {
            icon: task.status.meta().icon,
            id: task.id,
            title: task.title.clone(),
            category: plain.badge(&task.category.meta()),
            priority: plain.badge(&task.priority.meta()),
            status: task.status.label(),
            due: report::format_due_date(task.due_date),
            urgency: report::task_urgency(task, today).label(),
        }
    }
}

fn parse_due_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), report::DATE_FORMAT)
        .map_err(|_| AppError::validation("due date must be YYYY-MM-DD"))
}

fn parse_breakdown_field(raw: &str) -> Result<BreakdownField, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "category" => Ok(BreakdownField::Category),
        "priority" => Ok(BreakdownField::Priority),
        "status" => Ok(BreakdownField::Status),
        other => Err(AppError::validation(format!(
            "cannot break down by '{other}' (use category, priority or status)"
        ))),
    }
}

fn parse_optional<T>(raw: Option<&str>) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr<Err = AppError>,
{
    raw.map(str::parse::<T>).transpose()
}

fn task_json(task: &Task, today: Date) -> Result<serde_json::Value, AppError> {
    let mut value =
        serde_json::to_value(task).map_err(|err| AppError::invalid_data(err.to_string()))?;
    value["urgency"] = serde_json::json!(report::task_urgency(task, today));
    value["days_remaining"] = serde_json::json!(report::days_remaining(task.due_date, today));
    Ok(value)
}

fn print_task_json(task: &Task, today: Date) -> Result<(), AppError> {
    println!("{}", task_json(task, today)?);
    Ok(())
}

fn print_tasks_json(tasks: &[Task], today: Date) -> Result<(), AppError> {
    let payload = tasks
        .iter()
        .map(|task| task_json(task, today))
        .collect::<Result<Vec<_>, _>>()?;
    println!("{}", serde_json::Value::Array(payload));
    Ok(())
}

fn print_tasks_table(tasks: &[Task], total: usize, today: Date, painter: Painter) {
    println!(
        "{}",
        painter.dim(&format!("Showing {} of {} tasks", tasks.len(), total))
    );
    if tasks.is_empty() {
        println!("No tasks found. Add your first task!");
        return;
    }

    let rows: Vec<TaskRow> = tasks.iter().map(|task| TaskRow::new(task, today)).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn print_task_details(task: &Task, today: Date, painter: Painter) {
    let status = task.status.meta();
    println!(
        "{}",
        painter.bold(&format!("{} #{} {}", status.icon, task.id, task.title))
    );
    if !task.description.is_empty() {
        println!("  {}", painter.dim(&task.description));
    }
    println!("  Category:  {}", painter.badge(&task.category.meta()));
    println!("  Priority:  {}", painter.badge(&task.priority.meta()));
    println!("  Status:    {}", painter.paint(&status, status.label));
    println!("  Due:       {}", report::format_due_date(task.due_date));
    if let Some(days) = report::days_remaining(task.due_date, today) {
        println!("  Days left: {days}");
    }
    println!("  Urgency:   {}", report::task_urgency(task, today));
    println!("  Created:   {}", task.created_at);
    if let Some(completed_at) = task.completed_at {
        println!("  Completed: {completed_at}");
    }
}

fn print_statistics(stats: &Statistics, painter: Painter) {
    let rate = report::completion_rate(stats.total, stats.completed);
    println!("{}", painter.bold("Dashboard"));
    println!("Total Tasks:  {}", stats.total);
    let count = |status: TaskStatus, value: usize| painter.paint(&status.meta(), &value.to_string());
    println!("Completed:    {}", count(TaskStatus::Completed, stats.completed));
    println!("Pending:      {}", count(TaskStatus::Pending, stats.pending));
    println!("In Progress:  {}", count(TaskStatus::InProgress, stats.in_progress));
    println!("Overdue:      {}", stats.overdue);
    if stats.total > 0 {
        println!("Progress:     {}", progress_bar(rate));
    }
}

fn progress_bar(rate: f64) -> String {
    const WIDTH: usize = 20;
    let filled = ((rate / 100.0) * WIDTH as f64).round() as usize;
    let filled = filled.min(WIDTH);
    format!(
        "[{}{}] {:.1}%",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled),
        rate
    )
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::validation(message)
}

fn resolve_config(cli: &Cli) -> Result<Config, AppError> {
    let loaded = Config::load();
    if let Some(err) = loaded.error {
        warn!(error = %err, "ignoring unreadable config file");
    }

    let mut overrides = ConfigOverrides::default();
    for raw in &cli.config_override {
        let parsed = parse_config_override(raw).map_err(AppError::validation)?;
        match parsed.target {
            ConfigOverrideTarget::Color => overrides.color = Some(parsed.value.parse()?),
            ConfigOverrideTarget::StorePath => {
                overrides.store_path = Some(PathBuf::from(parsed.value));
            }
        }
    }

    Ok(loaded.config.with_overrides(&overrides))
}

fn write_export(output: &Path, content: &str) -> Result<(), AppError> {
    std::fs::write(output, content)
        .map_err(|err| AppError::store_write(format!("{}: {}", output.display(), err)))
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let config = resolve_config(&cli)?;
    let painter = Painter::new(config.color.enabled(std::io::stdout().is_terminal()));
    let store = TaskStore::from_config(&config)?;
    let today = clock::today();

    match cli.command {
        Command::Add {
            title,
            description,
            category,
            priority,
            due,
        } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::validation("task title cannot be empty")),
            };
            let input = NewTask::new(title, category.parse()?, priority.parse()?)
                .with_description(description)
                .with_due_date(due.as_deref().map(parse_due_date).transpose()?);

            let task = store.create(input)?;
            if cli.json {
                print_task_json(&task, today)?;
            } else {
                println!("Added task: {} ({})", task.title, task.id);
            }
        }
        Command::List {
            status,
            category,
            priority,
        } => {
            let filter = TaskFilter {
                status: parse_optional(status.as_deref())?,
                category: parse_optional(category.as_deref())?,
                priority: parse_optional(priority.as_deref())?,
            };
            let tasks = store.filter(&filter)?;
            if cli.json {
                print_tasks_json(&tasks, today)?;
            } else {
                let total = store.all()?.len();
                print_tasks_table(&tasks, total, today, painter);
            }
        }
        Command::Show { id } => {
            let task = store.get(id)?;
            if cli.json {
                print_task_json(&task, today)?;
            } else {
                print_task_details(&task, today, painter);
            }
        }
        Command::Status { id, status } => {
            let task = store.update_status(id, status.parse()?)?;
            if cli.json {
                print_task_json(&task, today)?;
            } else {
                println!("Updated task: {} ({}) -> {}", task.title, task.id, task.status);
            }
        }
        Command::Done { id } => {
            let task = store.update_status(id, TaskStatus::Completed)?;
            if cli.json {
                print_task_json(&task, today)?;
            } else {
                println!("Completed task: {} ({})", task.title, task.id);
            }
        }
        Command::Delete { id } => {
            let task = store.delete(id)?;
            if cli.json {
                print_task_json(&task, today)?;
            } else {
                println!("Deleted task: {} ({})", task.title, task.id);
            }
        }
        Command::Stats => {
            let stats = store.statistics_on(today)?;
            if cli.json {
                let json = serde_json::json!({
                    "total": stats.total,
                    "completed": stats.completed,
                    "pending": stats.pending,
                    "in_progress": stats.in_progress,
                    "overdue": stats.overdue,
                    "completion_rate": report::completion_rate(stats.total, stats.completed),
                });
                println!("{}", json);
            } else {
                print_statistics(&stats, painter);
            }
        }
        Command::Breakdown { field } => {
            let field = parse_breakdown_field(&field)?;
            let entries = report::breakdown_by(field, &store.all()?);
            if cli.json {
                let json = serde_json::to_value(&entries)
                    .map_err(|err| AppError::invalid_data(err.to_string()))?;
                println!("{}", json);
            } else {
                for entry in entries {
                    println!("{:<20}: {}", entry.label, entry.count);
                }
            }
        }
        Command::Trend => {
            let trend = report::completion_trend(&store.all()?);
            if cli.json {
                let payload: Vec<serde_json::Value> = trend
                    .iter()
                    .map(|(day, count)| {
                        serde_json::json!({
                            "date": report::format_date(*day),
                            "completed": count,
                        })
                    })
                    .collect();
                println!("{}", serde_json::Value::Array(payload));
            } else if trend.is_empty() {
                println!("Complete tasks to see trends");
            } else {
                for (day, count) in trend {
                    println!("{}  {}", report::format_date(day), "#".repeat(count));
                }
            }
        }
        Command::Export { format, output } => {
            let format: ExportFormat = format.parse()?;
            let tasks = store.all()?;
            let stats = store.statistics_on(today)?;
            let content = report::render(format, &stats, &tasks, clock::local_now())?;

            if output.as_deref() == Some(Path::new("-")) {
                print!("{content}");
                return Ok(());
            }

            let output =
                output.unwrap_or_else(|| PathBuf::from(report::export_filename(format, today)));
            write_export(&output, &content)?;
            if cli.json {
                let json = serde_json::json!({
                    "path": output.display().to_string(),
                    "format": format.extension(),
                    "content_type": format.mime_type(),
                    "tasks": tasks.len(),
                });
                println!("{}", json);
            } else {
                println!("Exported {} tasks to {}", tasks.len(), output.display());
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
