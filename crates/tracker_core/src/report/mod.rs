//! Pure derivations over task collections: urgency, rates, breakdowns and
//! the CSV / JSON / text exports.

mod derive;
mod export;

pub use derive::{
    BreakdownEntry, BreakdownField, URGENT_WINDOW_DAYS, UrgencyCategory, breakdown_by,
    completion_rate, completion_trend, days_remaining, task_urgency, urgency,
};
pub use export::{
    CSV_HEADER, DATE_FORMAT, ExportFormat, REPORT_HEADER, export_filename, format_date,
    format_due_date, from_csv, from_json, render, summary_report, to_csv, to_json,
};
