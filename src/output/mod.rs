//! Output module for crawl reports and summaries
//!
//! This module handles:
//! - Writing the CSV report of every page result
//! - Summarizing results on the console

mod report;
pub mod stats;
mod traits;

pub use report::{create_report_file, report_file_name, write_report, CsvReportWriter};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{result_row, OutputError, OutputResult, ReportSink, REPORT_COLUMNS};

/// File name prefix of crawl reports
pub const CRAWL_REPORT_PREFIX: &str = "crawl_report";

/// File name prefix of batch check reports
pub const CHECK_REPORT_PREFIX: &str = "check_report";
