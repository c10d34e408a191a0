//! CSV report generation
//!
//! Reports are written with a UTF-8 byte order mark so spreadsheet tools pick
//! the right encoding, followed by the header row and one row per result.

use crate::output::traits::{result_row, OutputResult, ReportSink, REPORT_COLUMNS};
use crate::state::PageResult;
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Numbered alternatives tried when the timestamped name is taken
const MAX_NAME_SUFFIX: u32 = 99;

/// Builds a timestamped report file name, e.g. `crawl_report_20250101_093000.csv`
pub fn report_file_name(prefix: &str, at: DateTime<Local>) -> String {
    format!("{}_{}.csv", prefix, at.format("%Y%m%d_%H%M%S"))
}

/// Creates a new report file that does not overwrite an existing one
///
/// When `crawl_report_20250101_093000.csv` already exists the next free name
/// of the form `crawl_report_20250101_093000_1.csv` is used.
pub fn create_report_file(directory: &Path, prefix: &str, at: DateTime<Local>) -> OutputResult<(PathBuf, File)> {
    let base = report_file_name(prefix, at);
    let stem = base.trim_end_matches(".csv");

    for suffix in 0..=MAX_NAME_SUFFIX {
        let name = if suffix == 0 {
            base.clone()
        } else {
            format!("{}_{}.csv", stem, suffix)
        };
        let path = directory.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!("Report {} already exists", path.display());
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free report name for {} in {}", base, directory.display()),
    )
    .into())
}

/// Report sink writing CSV rows to any writer
pub struct CsvReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvReportWriter<W> {
    /// Writes the byte order mark and header row
    pub fn new(mut inner: W) -> OutputResult<Self> {
        inner.write_all(UTF8_BOM)?;
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(REPORT_COLUMNS)?;
        Ok(Self { writer })
    }

    /// Finishes the report and returns the underlying writer
    pub fn into_inner(mut self) -> OutputResult<W> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| std::io::Error::new(e.error().kind(), e.error().to_string()).into())
    }
}

impl<W: Write> ReportSink for CsvReportWriter<W> {
    fn record(&mut self, result: &PageResult) -> OutputResult<()> {
        self.writer.write_record(result_row(result))?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes a complete report into `directory` and returns its path
///
/// # Arguments
///
/// * `results` - Results in the order they were produced
/// * `directory` - Existing directory to create the file in
/// * `prefix` - File name prefix, e.g. `crawl_report`
pub fn write_report(results: &[PageResult], directory: &Path, prefix: &str) -> OutputResult<PathBuf> {
    let (path, file) = create_report_file(directory, prefix, Local::now())?;

    let mut report = CsvReportWriter::new(file)?;
    report.record_all(results)?;
    report.finish()?;

    tracing::info!("Wrote {} rows to {}", results.len(), path.display());
    Ok(path)
}
