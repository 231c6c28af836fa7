/*!
 * Reporting functionality for prompt-perfect
 *
 * Summarises what went into a prompt using the tabled library.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::assembler::{IncludedDocument, Prompt, SkippedDocument};
use crate::utils::{format_file_size, truncate_left};

/// Statistics for one prompt run
#[derive(Debug, Clone)]
pub struct PromptReport {
    /// Where the prompt was written
    pub destination: String,
    /// Time taken to assemble and write
    pub duration: Duration,
    /// Whether the source tree was included
    pub tree_included: bool,
    /// Documents in the prompt
    pub included: Vec<IncludedDocument>,
    /// Documents left out
    pub skipped: Vec<SkippedDocument>,
    /// Word tokens in the whole prompt
    pub tokens: usize,
    /// Token limit, if one applied
    pub token_limit: Option<usize>,
    /// Whether the prompt reached the clipboard
    pub copied_to_clipboard: bool,
}

impl PromptReport {
    pub fn new(prompt: &Prompt, destination: String, duration: Duration) -> Self {
        Self {
            destination,
            duration,
            tree_included: prompt.tree_included,
            included: prompt.included.clone(),
            skipped: prompt.skipped.clone(),
            tokens: prompt.tokens,
            token_limit: None,
            copied_to_clipboard: false,
        }
    }
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for prompt runs
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate the report text
    pub fn generate_report(&self, report: &PromptReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
        }
    }

    /// Print the report to stderr, keeping stdout for the prompt
    pub fn print_report(&self, report: &PromptReport) {
        eprintln!("\n{}", self.generate_report(report));
    }

    fn style(table: &mut Table) {
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
    }

    fn create_documents_table(&self, report: &PromptReport) -> String {
        #[derive(Tabled)]
        struct DocumentRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Size")]
            size: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Chars")]
            chars: String,

            #[tabled(rename = "Words")]
            tokens: String,
        }

        let rows: Vec<DocumentRow> = report
            .included
            .iter()
            .map(|doc| DocumentRow {
                path: truncate_left(&doc.path, 60),
                size: format_file_size(doc.bytes as u64),
                lines: self.format_number(doc.lines),
                chars: self.format_number(doc.chars),
                tokens: self.format_number(doc.tokens),
            })
            .collect();

        let mut table = Table::new(rows);
        Self::style(&mut table);
        table.to_string()
    }

    fn create_skipped_table(&self, report: &PromptReport) -> String {
        #[derive(Tabled)]
        struct SkippedRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Reason")]
            reason: String,
        }

        let rows: Vec<SkippedRow> = report
            .skipped
            .iter()
            .map(|doc| SkippedRow {
                path: truncate_left(&doc.path, 60),
                reason: doc.reason.to_string(),
            })
            .collect();

        let mut table = Table::new(rows);
        Self::style(&mut table);
        table.to_string()
    }

    fn create_summary_table(&self, report: &PromptReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let yes_no = |flag: bool| (if flag { "yes" } else { "no" }).to_string();

        let mut rows = vec![
            SummaryRow {
                key: "📂 Output".to_string(),
                value: report.destination.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "🌳 Source Tree".to_string(),
                value: yes_no(report.tree_included),
            },
            SummaryRow {
                key: "📄 Files Included".to_string(),
                value: self.format_number(report.included.len()),
            },
            SummaryRow {
                key: "📦 Word Tokens".to_string(),
                value: format!("{} (approximate)", self.format_number(report.tokens)),
            },
        ];

        if let Some(limit) = report.token_limit {
            rows.push(SummaryRow {
                key: "🚧 Token Limit".to_string(),
                value: self.format_number(limit),
            });
        }

        rows.push(SummaryRow {
            key: "📋 Clipboard".to_string(),
            value: yes_no(report.copied_to_clipboard),
        });

        let mut table = Table::new(rows);
        Self::style(&mut table);
        table.to_string()
    }

    fn generate_console_report(&self, report: &PromptReport) -> String {
        let mut sections = Vec::new();

        if !report.included.is_empty() {
            sections.push(format!(
                "📋  INCLUDED FILES\n{}",
                self.create_documents_table(report)
            ));
        }
        if !report.skipped.is_empty() {
            sections.push(format!(
                "⏭️  SKIPPED FILES\n{}",
                self.create_skipped_table(report)
            ));
        }
        sections.push(format!(
            "✅  PROMPT READY\n{}",
            self.create_summary_table(report)
        ));

        sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::SkipReason;

    fn sample_report() -> PromptReport {
        PromptReport {
            destination: "stdout".to_string(),
            duration: Duration::from_millis(12),
            tree_included: true,
            included: vec![IncludedDocument {
                path: "src/main.rs".to_string(),
                bytes: 1200,
                lines: 40,
                chars: 1200,
                tokens: 1500,
            }],
            skipped: vec![SkippedDocument {
                path: "big.log".to_string(),
                reason: SkipReason::Declined,
            }],
            tokens: 1530,
            token_limit: Some(4096),
            copied_to_clipboard: false,
        }
    }

    #[test]
    fn test_format_number() {
        let reporter = Reporter::new(ReportFormat::ConsoleTable);
        assert_eq!(reporter.format_number(999), "999");
        assert_eq!(reporter.format_number(1_500), "1.5K");
        assert_eq!(reporter.format_number(2_000_000), "2.0M");
    }

    #[test]
    fn test_console_report_sections() {
        let text = Reporter::new(ReportFormat::ConsoleTable).generate_report(&sample_report());
        assert!(text.contains("INCLUDED FILES"));
        assert!(text.contains("src/main.rs"));
        assert!(text.contains("1.17 KB"));
        assert!(text.contains("SKIPPED FILES"));
        assert!(text.contains("large file declined"));
        assert!(text.contains("PROMPT READY"));
        assert!(text.contains("1.5K (approximate)"));
        assert!(text.contains("4.1K"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let mut report = sample_report();
        report.included.clear();
        report.skipped.clear();
        let text = Reporter::new(ReportFormat::ConsoleTable).generate_report(&report);
        assert!(!text.contains("INCLUDED FILES"));
        assert!(!text.contains("SKIPPED FILES"));
        assert!(text.starts_with("✅  PROMPT READY"));
    }
}
