use crate::error::AppError;
use crate::model::{Statistics, Task};
use crate::report::derive::{BreakdownField, breakdown_by, completion_percent};
use std::str::FromStr;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

pub const REPORT_HEADER: &str = "TASK PROGRESS REPORT";
pub const CSV_HEADER: [&str; 9] = [
    "id",
    "title",
    "description",
    "category",
    "priority",
    "status",
    "due_date",
    "created_at",
    "completed_at",
];

/// Calendar date as written in exports, filenames and `--due`.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

const BANNER_WIDTH: usize = 60;
const OVERVIEW_LABEL_WIDTH: usize = 22;
const BREAKDOWN_LABEL_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Report,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Report => "txt",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Report => "text/plain",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "report" | "txt" | "text" => Ok(Self::Report),
            other => Err(AppError::validation(format!(
                "unknown export format '{other}'"
            ))),
        }
    }
}

/// `tasks_<YYYY-MM-DD>.<ext>`
pub fn export_filename(format: ExportFormat, on: Date) -> String {
    format!("tasks_{}.{}", format_date(on), format.extension())
}

pub fn format_due_date(due_date: Option<Date>) -> String {
    due_date.map_or_else(|| "No deadline".to_string(), format_date)
}

/// `YYYY-MM-DD`. Falls back to `Date`'s own Display, which prints the same
/// fields, if the formatter ever errors.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

pub fn render(
    format: ExportFormat,
    stats: &Statistics,
    tasks: &[Task],
    generated_at: OffsetDateTime,
) -> Result<String, AppError> {
    match format {
        ExportFormat::Csv => to_csv(tasks),
        ExportFormat::Json => to_json(tasks),
        ExportFormat::Report => Ok(summary_report(stats, tasks, generated_at)),
    }
}

pub fn to_csv(tasks: &[Task]) -> Result<String, AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(CSV_HEADER)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    for task in tasks {
        writer
            .serialize(task)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn from_csv(content: &str) -> Result<Vec<Task>, AppError> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    if headers.iter().ne(CSV_HEADER) {
        return Err(AppError::invalid_data("unexpected CSV header"));
    }

    reader
        .deserialize::<Task>()
        .map(|row| row.map_err(|err| AppError::invalid_data(err.to_string())))
        .collect()
}

pub fn to_json(tasks: &[Task]) -> Result<String, AppError> {
    serde_json::to_string_pretty(tasks).map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn from_json(content: &str) -> Result<Vec<Task>, AppError> {
    serde_json::from_str(content).map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Plain-text summary. Output depends only on the arguments.
pub fn summary_report(stats: &Statistics, tasks: &[Task], generated_at: OffsetDateTime) -> String {
    let rate = completion_percent(stats.total, stats.completed);
    let banner = "=".repeat(BANNER_WIDTH);

    let mut report = String::new();
    report.push('\n');
    report.push_str(REPORT_HEADER);
    report.push('\n');
    report.push_str(&banner);
    report.push('\n');
    report.push_str(&format!("Generated: {}\n", format_timestamp(generated_at)));
    report.push('\n');

    report.push_str("OVERVIEW\n--------\n");
    for (label, value) in [
        ("Total Tasks:", stats.total.to_string()),
        ("Completed:", stats.completed.to_string()),
        ("Pending:", stats.pending.to_string()),
        ("In Progress:", stats.in_progress.to_string()),
        ("Overdue:", stats.overdue.to_string()),
        ("Completion Rate:", format!("{rate:.1}%")),
    ] {
        report.push_str(&format!("{label:<OVERVIEW_LABEL_WIDTH$}{value}\n"));
    }

    push_section(&mut report, "\nCATEGORY BREAKDOWN", BreakdownField::Category, tasks);
    if !tasks.is_empty() {
        push_section(&mut report, "\nPRIORITY BREAKDOWN", BreakdownField::Priority, tasks);
        push_section(&mut report, "\nSTATUS BREAKDOWN", BreakdownField::Status, tasks);
    }

    report.push('\n');
    report.push_str(&banner);
    report.push('\n');
    report.push_str("End of Report\n");
    report
}

fn push_section(report: &mut String, title: &str, field: BreakdownField, tasks: &[Task]) {
    report.push_str(title);
    report.push('\n');
    report.push_str(&"-".repeat(title.trim_start().len()));
    report.push('\n');
    for entry in breakdown_by(field, tasks) {
        report.push_str(&format!(
            "{:<BREAKDOWN_LABEL_WIDTH$}: {}\n",
            entry.label, entry.count
        ));
    }
}

/// Wall-clock time in `at`'s own offset, without the offset itself.
fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| format!("{} {}", format_date(at.date()), at.time()))
}
