//! Output handler traits and types
//!
//! This module defines the trait interface for report sinks and the error
//! type shared by the output implementations.

use crate::state::PageResult;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write report: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Column order of every report
pub const REPORT_COLUMNS: [&str; 11] = [
    "url",
    "final_url",
    "status",
    "ok",
    "error",
    "elapsed_ms",
    "content_type",
    "redirected",
    "redirect_chain",
    "depth",
    "title",
];

/// Trait for report sinks
///
/// A sink receives results in the order they were produced and is finished
/// exactly once.
pub trait ReportSink {
    /// Records one page result
    fn record(&mut self, result: &PageResult) -> OutputResult<()>;

    /// Records every result in order
    fn record_all(&mut self, results: &[PageResult]) -> OutputResult<()> {
        results.iter().try_for_each(|result| self.record(result))
    }

    /// Flushes any buffered output
    fn finish(&mut self) -> OutputResult<()>;
}

/// Renders a result as report cells, in [`REPORT_COLUMNS`] order
///
/// Missing values become empty cells.
pub fn result_row(result: &PageResult) -> [String; 11] {
    let opt = |value: Option<String>| value.unwrap_or_default();

    [
        result.url.clone(),
        result.final_url.clone(),
        opt(result.status.map(|s| s.to_string())),
        result.ok.to_string(),
        opt(result.error.clone()),
        opt(result.elapsed_ms.map(|ms| ms.to_string())),
        opt(result.content_type.clone()),
        result.redirected.to_string(),
        result.redirect_chain_display(),
        result.depth.to_string(),
        opt(result.title.clone()),
    ]
}
