//! # Report Aggregation Module
//!
//! @title Finding Aggregator and Report Model
//! @author Ramprasad
//!
//! Merges the security and gas finding streams into one deduplicated,
//! severity-ranked report model, and renders it as terminal output,
//! Markdown, or JSON.
//!
//! ## Key Types
//!
//! - [`Report`] - Complete analysis report consumed by renderers
//! - [`Finding`] - Individual finding
//! - [`Severity`] / [`Category`] - Closed classification enums
//!
//! ## Ordering Contract
//!
//! [`aggregate`] imposes a deterministic total order: severity descending,
//! then contract declaration order, then function declaration order
//! (contract-level findings sort before function-scoped ones), then
//! category name. Repeated runs over the same source always produce an
//! identical finding list, so reports are diffable.

mod finding;
mod formatter;

pub use finding::{Category, Finding, Severity};
pub use formatter::to_markdown;

use colored::*;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;

/// Complete analysis report.
///
/// Contains metadata about the scan, all findings in their final order,
/// and summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Metadata about the scan operation.
    pub metadata: ReportMetadata,

    /// All findings, ordered by the aggregator.
    pub findings: Vec<Finding>,

    /// Summary statistics by severity.
    pub summary: ReportSummary,
}

/// Metadata about the scan operation.
///
/// Carries no wall-clock timestamp: the report model must be identical
/// across repeated runs over the same source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Tool version used for the scan.
    pub version: String,

    /// Path or identifier that was scanned.
    pub scanned_path: String,

    /// Number of distinct files referenced by findings.
    pub files_analyzed: usize,
}

/// Summary of findings by severity level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Count of critical severity findings.
    pub critical: usize,

    /// Count of high severity findings.
    pub high: usize,

    /// Count of medium severity findings.
    pub medium: usize,

    /// Count of low severity findings.
    pub low: usize,

    /// Count of informational findings.
    pub info: usize,

    /// Total count of all findings.
    pub total: usize,
}

/// Merges security and gas findings into the final report model.
///
/// Deduplicates identical (category, contract, function, line) tuples,
/// keeping the highest severity, then sorts by severity descending with
/// declaration-order tie-breaking. Idempotent: aggregating the same two
/// sequences twice yields the same report.
///
/// # Arguments
///
/// * `security` - Findings from the vulnerability detector catalog
/// * `gas` - Findings from the gas analyzer catalog
///
/// # Returns
///
/// A fully populated, deterministically ordered [`Report`].
pub fn aggregate(security: Vec<Finding>, gas: Vec<Finding>) -> Report {
    let mut merged: HashMap<(Category, String, Option<String>, usize), Finding> = HashMap::new();

    for finding in security.into_iter().chain(gas) {
        let key = finding.dedup_key();
        match merged.get(&key) {
            Some(existing) if existing.severity >= finding.severity => {}
            _ => {
                merged.insert(key, finding);
            }
        }
    }

    let mut findings: Vec<Finding> = merged.into_values().collect();
    findings.sort_by_key(|f| {
        (
            Reverse(f.severity),
            f.contract_order,
            f.function_order,
            f.category.as_str(),
            f.line,
            f.detector_id.clone(),
        )
    });

    Report::new(findings, String::new())
}

impl Report {
    /// Creates a new report from an already-ordered collection of findings.
    ///
    /// Automatically calculates summary statistics from the findings.
    ///
    /// # Arguments
    ///
    /// * `findings` - Ordered findings
    /// * `scanned_path` - Path or identifier that was analyzed
    ///
    /// # Returns
    ///
    /// A fully populated `Report` instance.
    pub fn new(findings: Vec<Finding>, scanned_path: String) -> Self {
        let summary = ReportSummary::from_findings(&findings);

        let metadata = ReportMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            scanned_path,
            files_analyzed: findings
                .iter()
                .map(|f| &f.file_path)
                .collect::<std::collections::HashSet<_>>()
                .len(),
        };

        Self {
            metadata,
            findings,
            summary,
        }
    }

    /// Returns `true` if the report contains any Critical or High finding.
    ///
    /// This drives the CLI exit-status contract.
    pub fn has_blocking_findings(&self) -> bool {
        self.summary.critical > 0 || self.summary.high > 0
    }

    /// Prints colorized output to the terminal.
    ///
    /// Displays each finding with appropriate color coding based on severity.
    pub fn print_terminal(&self) {
        if self.findings.is_empty() {
            println!("\n{}", "[+] No issues found.".green().bold());
            return;
        }

        println!("\n{}", "[!] Findings:".red().bold());
        println!("{}", "=".repeat(60).cyan());

        for (i, finding) in self.findings.iter().enumerate() {
            finding.print_terminal(i + 1);
        }
    }

    /// Prints summary statistics to the terminal.
    pub fn print_summary(&self) {
        println!(
            "{}",
            format!(
                "[*] Summary: {} Critical | {} High | {} Medium | {} Low | {} Info",
                self.summary.critical,
                self.summary.high,
                self.summary.medium,
                self.summary.low,
                self.summary.info
            )
            .bold()
        );

        if self.summary.total == 0 {
            println!("{}", "[+] No issues found.".green().bold());
        } else {
            let severity_color = if self.summary.critical > 0 {
                "red"
            } else if self.summary.high > 0 {
                "yellow"
            } else {
                "blue"
            };

            let message = format!("[!] Total: {} issue(s) found", self.summary.total);
            match severity_color {
                "red" => println!("{}", message.red().bold()),
                "yellow" => println!("{}", message.yellow().bold()),
                _ => println!("{}", message.blue().bold()),
            }
        }
    }

    /// Converts the report to Markdown format.
    ///
    /// # Returns
    ///
    /// A Markdown-formatted string representation of the report.
    pub fn to_markdown(&self) -> String {
        formatter::to_markdown(self)
    }
}

impl ReportSummary {
    /// Creates a summary from a collection of findings.
    fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = ReportSummary {
            critical: 0,
            high: 0,
            medium: 0,
            low: 0,
            info: 0,
            total: findings.len(),
        };

        for finding in findings {
            match finding.severity {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
                Severity::Info => summary.info += 1,
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(
        category: Category,
        severity: Severity,
        contract: &str,
        contract_order: usize,
        function: Option<&str>,
        function_order: Option<usize>,
        line: usize,
    ) -> Finding {
        Finding {
            id: format!("TEST-{}-{}", contract, line),
            detector_id: "TEST".to_string(),
            category,
            title: "Test Finding".to_string(),
            description: "Test description".to_string(),
            severity,
            contract: contract.to_string(),
            function: function.map(|f| f.to_string()),
            file_path: "test.sol".to_string(),
            line,
            location: format!("{}:{}", contract, line),
            code_snippet: None,
            remediation: "Fix it".to_string(),
            cwe: None,
            estimated_savings: None,
            contract_order,
            function_order,
        }
    }

    #[test]
    fn test_report_summary_counts() {
        let findings = vec![
            sample(Category::Reentrancy, Severity::Critical, "A", 0, Some("w"), Some(0), 10),
            sample(Category::TxOriginAuth, Severity::High, "A", 0, Some("w"), Some(0), 12),
        ];

        let report = Report::new(findings, "./test".to_string());

        assert_eq!(report.summary.critical, 1);
        assert_eq!(report.summary.high, 1);
        assert_eq!(report.summary.total, 2);
        assert!(report.has_blocking_findings());
    }

    #[test]
    fn test_aggregate_orders_by_severity_then_declaration() {
        let security = vec![
            sample(Category::TxOriginAuth, Severity::High, "B", 1, Some("f"), Some(0), 5),
            sample(Category::Reentrancy, Severity::Critical, "B", 1, Some("g"), Some(1), 9),
        ];
        let gas = vec![
            sample(Category::StringRequireMessage, Severity::Low, "A", 0, Some("f"), Some(0), 3),
        ];

        let report = aggregate(security, gas);
        let severities: Vec<_> = report.findings.iter().map(|f| f.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Critical, Severity::High, Severity::Low]
        );
    }

    #[test]
    fn test_aggregate_dedup_keeps_highest_severity() {
        let a = sample(Category::Reentrancy, Severity::High, "A", 0, Some("w"), Some(0), 7);
        let b = sample(Category::Reentrancy, Severity::Critical, "A", 0, Some("w"), Some(0), 7);

        let report = aggregate(vec![a, b], Vec::new());
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].severity, Severity::Critical);
    }

    #[test]
    fn test_aggregate_contract_level_sorts_before_function_level() {
        let contract_level =
            sample(Category::LockedEther, Severity::Medium, "A", 0, None, None, 1);
        let function_level = sample(
            Category::TimestampDependence,
            Severity::Medium,
            "A",
            0,
            Some("f"),
            Some(0),
            4,
        );

        let report = aggregate(vec![function_level, contract_level], Vec::new());
        assert_eq!(report.findings[0].category, Category::LockedEther);
    }

    #[test]
    fn test_aggregate_idempotent() {
        let security = vec![
            sample(Category::Reentrancy, Severity::Critical, "A", 0, Some("w"), Some(0), 10),
            sample(Category::TxOriginAuth, Severity::High, "A", 0, Some("g"), Some(1), 20),
        ];
        let gas = vec![
            sample(Category::StringRequireMessage, Severity::Low, "A", 0, Some("w"), Some(0), 11),
        ];

        let first = aggregate(security.clone(), gas.clone());
        let second = aggregate(security, gas);
        assert_eq!(first, second);
    }
}
