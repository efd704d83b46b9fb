//! # Finding and Severity Definitions
//!
//! @title Security Finding Data Structures
//! @author Ramprasad
//!
//! Defines the core data structures for representing security findings,
//! their vulnerability category, and their severity classification.

use colored::*;
use serde::{Deserialize, Serialize};

/// Severity level classification for security findings.
///
/// Ordered from lowest to highest severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational finding, no direct security impact.
    Info = 0,

    /// Low severity, minimal security impact.
    Low = 1,

    /// Medium severity, moderate security impact.
    Medium = 2,

    /// High severity, significant security impact.
    High = 3,

    /// Critical severity, severe security impact.
    Critical = 4,
}

impl Severity {
    /// Parses a severity level from a string.
    ///
    /// # Arguments
    ///
    /// * `s` - String representation of severity
    ///
    /// # Returns
    ///
    /// The corresponding `Severity` variant, defaulting to `Info` for unknown values.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Info,
        }
    }

    /// Returns a colored label for terminal output.
    pub fn colored_label(&self) -> ColoredString {
        match self {
            Severity::Critical => "CRITICAL".white().on_red().bold(),
            Severity::High => "HIGH".black().on_yellow().bold(),
            Severity::Medium => "MEDIUM".white().on_bright_blue().bold(),
            Severity::Low => "LOW".black().on_white().bold(),
            Severity::Info => "INFO".black().on_bright_white(),
        }
    }

    /// Returns a text indicator for the severity.
    pub fn indicator(&self) -> &'static str {
        match self {
            Severity::Critical => "[!!]",
            Severity::High => "[!]",
            Severity::Medium => "[~]",
            Severity::Low => "[-]",
            Severity::Info => "[i]",
        }
    }

    /// Returns a Markdown badge for the severity.
    pub fn markdown_badge(&self) -> &'static str {
        match self {
            Severity::Critical => {
                "![Critical](https://img.shields.io/badge/severity-CRITICAL-red)"
            }
            Severity::High => "![High](https://img.shields.io/badge/severity-HIGH-orange)",
            Severity::Medium => "![Medium](https://img.shields.io/badge/severity-MEDIUM-yellow)",
            Severity::Low => "![Low](https://img.shields.io/badge/severity-LOW-blue)",
            Severity::Info => "![Info](https://img.shields.io/badge/severity-INFO-lightgrey)",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "Critical"),
            Severity::High => write!(f, "High"),
            Severity::Medium => write!(f, "Medium"),
            Severity::Low => write!(f, "Low"),
            Severity::Info => write!(f, "Informational"),
        }
    }
}

/// Vulnerability category classification.
///
/// A closed enumeration of everything the rule catalogs can report. The
/// aggregator sorts ties by [`Category::as_str`], so the names here are part
/// of the report's deterministic ordering contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// External call precedes the state write it should gate.
    Reentrancy,

    /// Privileged state mutation reachable without an authorization guard.
    MissingAccessControl,

    /// `tx.origin` used for authentication.
    TxOriginAuth,

    /// Low-level call success value never checked.
    UncheckedCallReturn,

    /// Block timestamp used in an outcome-deciding comparison.
    TimestampDependence,

    /// `delegatecall` to a caller-supplied target.
    UnsafeDelegatecall,

    /// Contract accepts Ether but can never pay it out.
    LockedEther,

    /// Storage read inside a loop body.
    GasLoopStorageRead,

    /// `require` with a string message instead of a custom error.
    StringRequireMessage,

    /// `public` function that could be `external`.
    VisibilityOptimization,

    /// State variable that could be `constant` or `immutable`.
    ConstantCandidate,

    /// Recoverable extraction problem reported instead of aborting.
    ParseWarning,
}

impl Category {
    /// Returns the stable name used for tie-breaking in report ordering.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Reentrancy => "Reentrancy",
            Category::MissingAccessControl => "MissingAccessControl",
            Category::TxOriginAuth => "TxOriginAuth",
            Category::UncheckedCallReturn => "UncheckedCallReturn",
            Category::TimestampDependence => "TimestampDependence",
            Category::UnsafeDelegatecall => "UnsafeDelegatecall",
            Category::LockedEther => "LockedEther",
            Category::GasLoopStorageRead => "GasLoopStorageRead",
            Category::StringRequireMessage => "StringRequireMessage",
            Category::VisibilityOptimization => "VisibilityOptimization",
            Category::ConstantCandidate => "ConstantCandidate",
            Category::ParseWarning => "ParseWarning",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a security or gas finding from static analysis.
///
/// Contains all information needed to understand, locate, and remediate
/// a detected issue. The `contract_order`/`function_order` ordinals record
/// declaration order within the scan and exist solely so the aggregator can
/// impose its deterministic total order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Deterministic identifier for this finding instance.
    pub id: String,

    /// ID of the detector that produced this finding (e.g., "V001").
    pub detector_id: String,

    /// Vulnerability category.
    pub category: Category,

    /// Short, descriptive title of the finding.
    pub title: String,

    /// Detailed description of the issue.
    pub description: String,

    /// Severity classification.
    pub severity: Severity,

    /// Name of the contract the finding was derived from.
    pub contract: String,

    /// Function (or modifier) the finding is scoped to, if any.
    pub function: Option<String>,

    /// Path to the file containing the issue.
    pub file_path: String,

    /// Line number where the issue was detected.
    pub line: usize,

    /// Code location identifier (e.g., "Vault::withdraw").
    pub location: String,

    /// Optional code snippet showing the flagged pattern.
    pub code_snippet: Option<String>,

    /// Remediation guidance for fixing the issue.
    pub remediation: String,

    /// CWE (Common Weakness Enumeration) identifier if applicable.
    pub cwe: Option<String>,

    /// Opaque estimated-savings hint for gas findings.
    pub estimated_savings: Option<String>,

    /// Declaration order of the contract within the scan.
    pub contract_order: usize,

    /// Declaration order of the function within its contract.
    pub function_order: Option<usize>,
}

impl Finding {
    /// Prints the finding to terminal with color formatting.
    ///
    /// # Arguments
    ///
    /// * `index` - The finding number for display.
    pub fn print_terminal(&self, index: usize) {
        println!();
        println!(
            "{} {} [{}] {}",
            format!("#{}", index).cyan().bold(),
            self.severity.colored_label(),
            self.detector_id.yellow(),
            self.title.white().bold()
        );

        println!(
            "   {} {}:{}",
            "Location:".dimmed(),
            self.file_path.blue(),
            self.line.to_string().cyan()
        );

        for line in self.description.lines() {
            println!("   {}", line.dimmed());
        }

        if let Some(ref snippet) = self.code_snippet {
            println!("\n   {}", "Code:".yellow());
            for line in snippet.lines() {
                println!("   {}", line.bright_white());
            }
        }

        if let Some(ref cwe) = self.cwe {
            println!("   {} {}", "Reference:".dimmed(), cwe.blue());
        }

        if let Some(ref savings) = self.estimated_savings {
            println!("   {} {}", "Estimated savings:".dimmed(), savings.blue());
        }

        println!("\n   {}", "Remediation:".green());
        for line in self.remediation.lines().take(3) {
            println!("   {}", line.green().dimmed());
        }

        println!("{}", "-".repeat(60).dimmed());
    }

    /// Returns the deduplication key used by the aggregator.
    ///
    /// Identical (category, contract, function, line) tuples collapse into
    /// one finding, keeping the highest severity.
    pub fn dedup_key(&self) -> (Category, String, Option<String>, usize) {
        (
            self.category,
            self.contract.clone(),
            self.function.clone(),
            self.line,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Info);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!(Severity::from_str("critical"), Severity::Critical);
        assert_eq!(Severity::from_str("HIGH"), Severity::High);
        assert_eq!(Severity::from_str("unknown"), Severity::Info);
    }

    #[test]
    fn test_category_names_unique() {
        let categories = [
            Category::Reentrancy,
            Category::MissingAccessControl,
            Category::TxOriginAuth,
            Category::UncheckedCallReturn,
            Category::TimestampDependence,
            Category::UnsafeDelegatecall,
            Category::LockedEther,
            Category::GasLoopStorageRead,
            Category::StringRequireMessage,
            Category::VisibilityOptimization,
            Category::ConstantCandidate,
            Category::ParseWarning,
        ];

        let mut names: Vec<_> = categories.iter().map(|c| c.as_str()).collect();
        let len_before = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), len_before, "Category names must be unique");
    }
}
