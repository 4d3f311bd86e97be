//! Tabular views of engine results as polars frames, plus a plain-text
//! renderer for terminals.

use chrono::{Duration, NaiveDate};
use polars::prelude::*;

use crate::calculations::CriticalPathResult;
use crate::dispatch::DispatchCandidate;
use crate::gantt::GanttLayout;
use crate::model::Task;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn date_to_i32(date: NaiveDate) -> i32 {
    (date - epoch()).num_days() as i32
}

fn i32_to_date(days: i32) -> NaiveDate {
    epoch() + Duration::days(i64::from(days))
}

fn date_series(name: &'static str, values: Vec<Option<i32>>) -> PolarsResult<Column> {
    Ok(Series::new(PlSmallStr::from_static(name), values)
        .cast(&DataType::Date)?
        .into_column())
}

/// One row per task: planned dates, CPM times and chart placement.
pub fn schedule_frame(
    tasks: &[Task],
    cpm: &CriticalPathResult,
    layout: Option<&GanttLayout>,
) -> PolarsResult<DataFrame> {
    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
    let starts: Vec<Option<i32>> = tasks
        .iter()
        .map(|t| Some(date_to_i32(t.start_date)))
        .collect();
    let ends: Vec<Option<i32>> = tasks.iter().map(|t| Some(date_to_i32(t.end_date))).collect();
    let durations: Vec<i64> = tasks.iter().map(Task::duration_days).collect();
    let statuses: Vec<&str> = tasks.iter().map(|t| t.status.as_str()).collect();
    let progress: Vec<u32> = tasks.iter().map(|t| u32::from(t.progress)).collect();

    let dates: Vec<_> = tasks.iter().map(|t| cpm.dates_for(&t.id)).collect();
    let early_starts: Vec<Option<i32>> = dates
        .iter()
        .map(|d| d.map(|d| date_to_i32(d.early_start)))
        .collect();
    let late_starts: Vec<Option<i32>> = dates
        .iter()
        .map(|d| d.map(|d| date_to_i32(d.late_start)))
        .collect();
    let slack: Vec<Option<i64>> = tasks.iter().map(|t| cpm.slack(&t.id)).collect();
    let critical: Vec<bool> = tasks.iter().map(|t| cpm.is_critical(&t.id)).collect();

    let bar_of = |task: &Task| layout.and_then(|l| l.bar(&task.id));
    let left: Vec<Option<f64>> = tasks.iter().map(|t| bar_of(t).map(|b| b.left_pct)).collect();
    let width: Vec<Option<f64>> = tasks.iter().map(|t| bar_of(t).map(|b| b.width_pct)).collect();

    let columns = vec![
        Series::new(PlSmallStr::from_static("task_id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("name"), names).into_column(),
        date_series("start_date", starts)?,
        date_series("end_date", ends)?,
        Series::new(PlSmallStr::from_static("duration_days"), durations).into_column(),
        Series::new(PlSmallStr::from_static("status"), statuses).into_column(),
        Series::new(PlSmallStr::from_static("progress"), progress).into_column(),
        date_series("early_start", early_starts)?,
        date_series("late_start", late_starts)?,
        Series::new(PlSmallStr::from_static("slack_days"), slack).into_column(),
        Series::new(PlSmallStr::from_static("is_critical"), critical).into_column(),
        Series::new(PlSmallStr::from_static("left_pct"), left).into_column(),
        Series::new(PlSmallStr::from_static("width_pct"), width).into_column(),
    ];
    DataFrame::new(columns)
}

/// One row per worker considered for a booking.
pub fn dispatch_frame(candidates: &[DispatchCandidate]) -> PolarsResult<DataFrame> {
    let ids: Vec<&str> = candidates.iter().map(|c| c.worker_id.as_str()).collect();
    let names: Vec<&str> = candidates.iter().map(|c| c.worker_name.as_str()).collect();
    let available: Vec<bool> = candidates.iter().map(|c| c.availability.available).collect();
    let conflict: Vec<bool> = candidates.iter().map(|c| c.conflict.conflict).collect();
    let bookable: Vec<bool> = candidates.iter().map(|c| c.bookable).collect();
    let reasons: Vec<Option<&str>> = candidates
        .iter()
        .map(|c| {
            c.conflict
                .reason
                .as_deref()
                .or(c.availability.reason.as_deref())
        })
        .collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("worker_id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("worker_name"), names).into_column(),
        Series::new(PlSmallStr::from_static("available"), available).into_column(),
        Series::new(PlSmallStr::from_static("conflict"), conflict).into_column(),
        Series::new(PlSmallStr::from_static("bookable"), bookable).into_column(),
        Series::new(PlSmallStr::from_static("reason"), reasons).into_column(),
    ])
}

fn cell_text(value: &AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::Float64(v) => format!("{v:.2}"),
        AnyValue::Boolean(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::Date(days) => i32_to_date(*days).to_string(),
        other => other.to_string(),
    }
}

/// Boxed ASCII table with one header row.
pub fn render_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let rows: Vec<Vec<String>> = (0..df.height())
        .map(|row_idx| {
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = names.iter().map(String::len).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[String]| {
        let mut line = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}
