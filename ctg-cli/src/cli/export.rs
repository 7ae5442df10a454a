//! CSV export of the validated-warnings report.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::ArgMatches;
use ctg_lib::source::StreamSource;
use ctg_lib::types::{ClinicalReport, ReportRow};
use log::{info, warn};

use super::CliError;

pub const CSV_HEADER: &str =
    "Start Time (s),End Time (s),Duration (s),CTG Category,Condition,Severity,Clinical Notes";

/// Where an export ended up.
#[derive(Debug, PartialEq)]
pub enum ExportOutcome {
    /// Nothing to write; the report had no rows.
    Empty,
    Stdout,
    File(PathBuf),
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn csv_row(row: &ReportRow) -> String {
    [
        row.start_time.to_string(),
        row.end_time.to_string(),
        row.duration_sec.to_string(),
        row.ctg_category.clone(),
        quote(&row.condition),
        row.severity.clone(),
        quote(&row.clinical_notes),
    ]
    .join(",")
}

/// Render the report as CSV, header first, one line per row.
pub fn report_to_csv(report: &ClinicalReport) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for row in &report.report {
        csv.push_str(&csv_row(row));
        csv.push('\n');
    }
    csv
}

/// `CTG_Report_<date>.csv`, dated from the report's generation timestamp.
pub fn default_file_name(report: &ClinicalReport) -> String {
    match report.generated_at.as_deref().and_then(|at| at.get(..10)) {
        Some(date) => format!("CTG_Report_{}.csv", date),
        None => "CTG_Report.csv".to_string(),
    }
}

/// Write `report` to `output` (`-` for stdout) or to the default file name.
pub fn write_report(
    report: &ClinicalReport,
    output: Option<&str>,
) -> Result<ExportOutcome, CliError> {
    if report.report.is_empty() {
        info!("no validated warnings found yet, nothing to export");
        return Ok(ExportOutcome::Empty);
    }

    let csv = report_to_csv(report);
    match output {
        Some("-") => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(csv.as_bytes())?;
            stdout.flush()?;
            Ok(ExportOutcome::Stdout)
        }
        other => {
            let path = PathBuf::from(
                other
                    .map(str::to_string)
                    .unwrap_or_else(|| default_file_name(report)),
            );
            fs::write(&path, csv)?;
            info!(
                "exported {} warning(s) to {}",
                report.report.len(),
                path.display()
            );
            Ok(ExportOutcome::File(path))
        }
    }
}

/// Fetch the report from `source` and write it.
pub fn run(args: &ArgMatches, source: &dyn StreamSource) -> Result<i32, CliError> {
    let report = match source.fetch_report() {
        Ok(report) => report,
        Err(err) => {
            warn!("report fetch failed: {}", err);
            return Err(err.into());
        }
    };

    match write_report(&report, args.get_one::<String>("output").map(String::as_str))? {
        ExportOutcome::Empty => eprintln!("No validated warnings found yet. Continue monitoring."),
        ExportOutcome::Stdout => {}
        ExportOutcome::File(path) => eprintln!("Wrote {}", path.display()),
    }
    Ok(0)
}
