use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use utoipa::ToSchema;

use crate::logging::timed;
use crate::models::solar::OptimizationResult;
use crate::services::irradiation::IrradiationCalculator;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("plot error: {0}")]
    Plot(String),

    #[error("unknown report format: {0}. Valid formats are csv, json, xml")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Csv,
    Json,
    Xml,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            _ => Err(ReportError::UnknownFormat(s.to_string())),
        }
    }
}

// ─── Computation ─────────────────────────────────────────────

fn log_day(result: &OptimizationResult) {
    info!(
        "On day {}, the solar panel's optimal orientation is {} degrees, and the total direct irradiation is {} Megajoules per square meter.",
        result.day_of_year, result.optimal_tilt_degrees, result.total_irradiation
    );
}

/// Optimise every day of `[from_day, to_day)` in parallel. Rows come back in
/// day order.
pub fn optimize_range(
    calc: &IrradiationCalculator,
    from_day: i32,
    to_day: i32,
) -> Vec<OptimizationResult> {
    (from_day..to_day)
        .into_par_iter()
        .map(|day| {
            let result = calc.optimize_day(day);
            log_day(&result);
            result
        })
        .collect()
}

/// Sequential [`optimize_range`] that checks `cancel` before each day and
/// returns the rows finished so far once it is set.
pub fn optimize_range_until(
    calc: &IrradiationCalculator,
    from_day: i32,
    to_day: i32,
    cancel: &AtomicBool,
) -> Vec<OptimizationResult> {
    optimize_range_with(calc, from_day, to_day, cancel, |_| ())
}

fn optimize_range_with(
    calc: &IrradiationCalculator,
    from_day: i32,
    to_day: i32,
    cancel: &AtomicBool,
    mut on_row: impl FnMut(&OptimizationResult),
) -> Vec<OptimizationResult> {
    let mut rows = Vec::with_capacity((to_day - from_day).max(0) as usize);
    for day in from_day..to_day {
        if cancel.load(Ordering::Relaxed) {
            info!(day, "report computation cancelled");
            break;
        }
        let result = calc.optimize_day(day);
        log_day(&result);
        on_row(&result);
        rows.push(result);
    }
    rows
}

// ─── Writers ─────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct ReportRow {
    #[serde(rename = "Day")]
    day: i32,
    #[serde(rename = "Beta (degrees)")]
    beta: f64,
    #[serde(rename = "Total Direct Irradiation (Megajoules per square meter)")]
    total_irradiation: f64,
}

impl From<&OptimizationResult> for ReportRow {
    fn from(r: &OptimizationResult) -> Self {
        Self {
            day: r.day_of_year,
            beta: r.optimal_tilt_degrees,
            total_irradiation: r.total_irradiation,
        }
    }
}

const HEADER: [&str; 3] = [
    "Day",
    "Beta (degrees)",
    "Total Direct Irradiation (Megajoules per square meter)",
];

pub fn write_csv<W: Write>(writer: W, results: &[OptimizationResult]) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    if results.is_empty() {
        wtr.write_record(HEADER)?;
    }
    for r in results {
        wtr.serialize(ReportRow::from(r))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(
    mut writer: W,
    results: &[OptimizationResult],
) -> Result<(), ReportError> {
    let rows: Vec<ReportRow> = results.iter().map(ReportRow::from).collect();
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writer.flush()?;
    Ok(())
}

/// Values are plain numbers, so nothing needs escaping. Floats keep their
/// fractional part (`-3.0`), as in the CSV and JSON writers.
pub fn write_xml<W: Write>(
    mut writer: W,
    results: &[OptimizationResult],
) -> Result<(), ReportError> {
    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(writer, "<Report>")?;
    for r in results {
        writeln!(writer, r#"  <Day id="{}">"#, r.day_of_year)?;
        writeln!(writer, "    <Beta>{:?}</Beta>", r.optimal_tilt_degrees)?;
        writeln!(
            writer,
            "    <TotalDirectIrradiation>{:?}</TotalDirectIrradiation>",
            r.total_irradiation
        )?;
        writeln!(writer, "  </Day>")?;
    }
    writeln!(writer, "</Report>")?;
    writer.flush()?;
    Ok(())
}

pub fn write_report<W: Write>(
    writer: W,
    format: ReportFormat,
    results: &[OptimizationResult],
) -> Result<(), ReportError> {
    match format {
        ReportFormat::Csv => write_csv(writer, results),
        ReportFormat::Json => write_json(writer, results),
        ReportFormat::Xml => write_xml(writer, results),
    }
}

/// Render into memory, e.g. for an HTTP body.
pub fn render_report(
    format: ReportFormat,
    results: &[OptimizationResult],
) -> Result<Vec<u8>, ReportError> {
    let mut buf = Vec::new();
    write_report(&mut buf, format, results)?;
    Ok(buf)
}

/// Compute `[from_day, to_day)` for `calc` and write it to `path`.
pub fn generate_report(
    path: impl AsRef<Path>,
    format: ReportFormat,
    calc: &IrradiationCalculator,
    from_day: i32,
    to_day: i32,
) -> Result<Vec<OptimizationResult>, ReportError> {
    timed("generate_report", || {
        let results = optimize_range(calc, from_day, to_day);
        save_report(path, format, &results)?;
        Ok(results)
    })
}

pub fn save_report(
    path: impl AsRef<Path>,
    format: ReportFormat,
    results: &[OptimizationResult],
) -> Result<(), ReportError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_report(BufWriter::new(file), format, results)?;
    info!(path = %path.display(), %format, rows = results.len(), "report written");
    Ok(())
}
