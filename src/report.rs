/*!
 * Reporting for scan statistics
 *
 * Renders subtree statistics as console tables (via tabled) or JSON for
 * machine consumption.
 */

use std::time::Duration;

use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::types::ScanStats;
use crate::utils::format_file_size;

/// Statistics for one immediate child of the scan root
#[derive(Debug, Clone, Serialize)]
pub struct ChildStats {
    /// Leaf name of the child directory
    pub name: String,
    pub stats: ScanStats,
}

/// Statistics for a subtree scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Scan root, in its preferred textual form
    pub root: String,
    /// Time taken to scan
    pub duration: Duration,
    /// Whole-subtree totals
    pub totals: ScanStats,
    /// Per-child breakdown, native enumeration order
    pub children: Vec<ChildStats>,
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
    /// Pretty-printed JSON
    Json,
}

/// Report generator for scan results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Generate a report string based on scan statistics
    pub fn generate_report(&self, report: &ScanReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
            ReportFormat::Json => serde_json::to_string_pretty(report)
                .unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}")),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &ScanReport) {
        println!("{}", self.generate_report(report));
    }

    fn create_summary_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let rows = vec![
            SummaryRow {
                key: "Root".to_string(),
                value: report.root.clone(),
            },
            SummaryRow {
                key: "Scan Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "Directories".to_string(),
                value: report.totals.dirs.to_string(),
            },
            SummaryRow {
                key: "Files".to_string(),
                value: report.totals.files.to_string(),
            },
            SummaryRow {
                key: "Total Size".to_string(),
                value: format_file_size(report.totals.bytes),
            },
        ];

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    fn create_children_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct ChildRow {
            #[tabled(rename = "Directory")]
            name: String,

            #[tabled(rename = "Dirs")]
            dirs: u64,

            #[tabled(rename = "Files")]
            files: u64,

            #[tabled(rename = "Size")]
            size: String,
        }

        let mut children: Vec<_> = report.children.iter().collect();
        children.sort_by(|a, b| b.stats.bytes.cmp(&a.stats.bytes));

        let rows: Vec<ChildRow> = children
            .iter()
            .take(15)
            .map(|child| ChildRow {
                name: child.name.clone(),
                dirs: child.stats.dirs,
                files: child.stats.files,
                size: format_file_size(child.stats.bytes),
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    fn generate_console_report(&self, report: &ScanReport) -> String {
        let summary = self.create_summary_table(report);
        if report.children.is_empty() {
            return summary;
        }
        let children = self.create_children_table(report);
        format!("{}\n\n{}", summary, children)
    }
}
