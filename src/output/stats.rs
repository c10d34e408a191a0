//! Statistics over a finished crawl or batch check
//!
//! This module summarizes the result list and prints the console summary shown
//! after the report is written.

use crate::state::PageResult;
use std::collections::HashMap;
use std::path::Path;

/// Maximum number of failing pages listed in the summary
const MAX_EXAMPLES: usize = 10;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Number of result rows
    pub pages_checked: usize,

    /// Rows with a final status outside 2xx; rows without a status are not counted
    pub non_2xx: usize,

    /// Rows that are not ok
    pub errors: usize,

    /// Rows skipped because robots.txt disallowed them
    pub robots_blocked: usize,

    /// Count of rows by HTTP status
    pub pages_by_status: HashMap<u16, usize>,

    /// First failing rows, in result order
    pub failing_examples: Vec<PageResult>,
}

impl CrawlStatistics {
    pub fn from_results(results: &[PageResult]) -> Self {
        let mut stats = Self {
            pages_checked: results.len(),
            ..Self::default()
        };

        for result in results {
            if matches!(result.status, Some(code) if !(200..300).contains(&code)) {
                stats.non_2xx += 1;
            }
            if result.is_robots_blocked() {
                stats.robots_blocked += 1;
            }
            if let Some(status) = result.status {
                *stats.pages_by_status.entry(status).or_insert(0) += 1;
            }
            if !result.ok {
                stats.errors += 1;
                if stats.failing_examples.len() < MAX_EXAMPLES {
                    stats.failing_examples.push(result.clone());
                }
            }
        }

        stats
    }

    /// Percentage of rows that are ok
    pub fn success_rate(&self) -> f64 {
        if self.pages_checked == 0 {
            return 0.0;
        }
        (self.pages_checked - self.errors) as f64 / self.pages_checked as f64 * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
/// * `report` - Path of the written report
pub fn print_statistics(stats: &CrawlStatistics, report: &Path) {
    println!("=== Link Check Summary ===\n");

    println!("Overview:");
    println!("  Pages checked: {}", stats.pages_checked);
    println!("  Non-2xx: {}", stats.non_2xx);
    println!("  Errors: {}", stats.errors);
    println!("  Blocked by robots.txt: {}", stats.robots_blocked);
    println!();

    if !stats.pages_by_status.is_empty() {
        println!("Pages by Status:");
        let mut status_counts: Vec<_> = stats.pages_by_status.iter().collect();
        status_counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

        for (status, count) in status_counts {
            println!("  {}: {}", status, count);
        }
        println!();
    }

    if !stats.failing_examples.is_empty() {
        println!("Failing Pages (first {}):", stats.failing_examples.len());
        for result in &stats.failing_examples {
            println!("  - {}", result);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages ok)",
        stats.success_rate(),
        stats.pages_checked - stats.errors,
        stats.pages_checked
    );
    println!("Report: {}", report.display());
}
