//! # Vulnerability Detector Module
//!
//! @title Vulnerability Detection Framework
//! @author Ramprasad
//!
//! This module provides the framework for vulnerability detection and contains
//! implementations of all security detectors.
//!
//! ## Architecture
//!
//! All detectors implement the [`VulnerabilityDetector`] trait, which provides
//! a consistent interface for detection, severity classification, and
//! remediation guidance. Each detector is a pure structural pattern match
//! over one [`ContractUnit`]: rules share no mutable state, and the order in
//! which they run is unobservable because the report aggregator imposes the
//! final ordering.
//!
//! ## Available Detectors
//!
//! | ID | Name | Severity |
//! |----|------|----------|
//! | V001 | Reentrancy | Critical |
//! | V002 | Missing Access Control | Critical/High |
//! | V003 | tx.origin Authentication | High |
//! | V004 | Unchecked Call Return | High |
//! | V005 | Timestamp Dependence | Medium |
//! | V006 | Unsafe Delegatecall | Critical |
//! | V007 | Locked Ether | Medium |

mod locked_ether;
mod missing_access_control;
mod reentrancy;
mod timestamp_dependence;
mod tx_origin;
mod unchecked_call;
mod unsafe_delegatecall;
pub mod utils;

pub use locked_ether::LockedEtherDetector;
pub use missing_access_control::MissingAccessControlDetector;
pub use reentrancy::ReentrancyDetector;
pub use timestamp_dependence::TimestampDependenceDetector;
pub use tx_origin::TxOriginDetector;
pub use unchecked_call::UncheckedCallDetector;
pub use unsafe_delegatecall::UnsafeDelegatecallDetector;

use crate::parser::{ContractUnit, Function};
use crate::report::{Category, Finding, Severity};

/// Trait for implementing vulnerability detectors.
///
/// All detectors must implement this trait to be registered with the
/// [`DetectorRegistry`]. The trait provides a consistent interface for
/// detection, classification, and remediation guidance.
///
/// # Example Implementation
///
/// ```rust,ignore
/// pub struct MyDetector;
///
/// impl VulnerabilityDetector for MyDetector {
///     fn id(&self) -> &'static str { "V999" }
///     fn name(&self) -> &'static str { "My Vulnerability" }
///     fn description(&self) -> &'static str { "Detects my vulnerability" }
///     fn category(&self) -> Category { Category::Reentrancy }
///     fn severity(&self) -> Severity { Severity::High }
///     fn remediation(&self) -> &'static str { "Fix the issue" }
///
///     fn detect(&self, unit: &ContractUnit) -> Vec<Finding> {
///         // Detection logic
///         Vec::new()
///     }
/// }
/// ```
pub trait VulnerabilityDetector: Send + Sync {
    /// Returns the unique identifier for this detector.
    ///
    /// Format: "Vnnn" where nnn is a zero-padded number (e.g., "V001").
    fn id(&self) -> &'static str;

    /// Returns the human-readable name of the vulnerability.
    fn name(&self) -> &'static str;

    /// Returns a detailed description of what this detector looks for.
    fn description(&self) -> &'static str;

    /// Returns the vulnerability category reported by this detector.
    fn category(&self) -> Category;

    /// Returns the default severity level for findings from this detector.
    fn severity(&self) -> Severity;

    /// Runs the detector against one contract unit.
    ///
    /// # Arguments
    ///
    /// * `unit` - The extracted contract to analyze
    ///
    /// # Returns
    ///
    /// A vector of findings discovered during analysis.
    fn detect(&self, unit: &ContractUnit) -> Vec<Finding>;

    /// Returns the CWE (Common Weakness Enumeration) ID if applicable.
    fn cwe(&self) -> Option<&'static str> {
        None
    }

    /// Returns remediation advice for addressing this vulnerability.
    fn remediation(&self) -> &'static str;
}

/// Registry containing all available vulnerability detectors.
///
/// The catalog is closed per scan run: the same source text with the same
/// registry always yields the same finding set.
///
/// # Example
///
/// ```rust,ignore
/// let registry = DetectorRegistry::new();
/// let findings = registry.run_all(&units);
/// ```
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn VulnerabilityDetector>>,
}

impl DetectorRegistry {
    /// Creates a new registry with all default detectors.
    ///
    /// Initializes the registry with all built-in vulnerability detectors:
    /// V001 through V007.
    pub fn new() -> Self {
        let detectors: Vec<Box<dyn VulnerabilityDetector>> = vec![
            Box::new(ReentrancyDetector),
            Box::new(MissingAccessControlDetector),
            Box::new(TxOriginDetector),
            Box::new(UncheckedCallDetector),
            Box::new(TimestampDependenceDetector),
            Box::new(UnsafeDelegatecallDetector),
            Box::new(LockedEtherDetector),
        ];

        Self { detectors }
    }

    /// Returns a reference to all registered detectors.
    pub fn detectors(&self) -> &[Box<dyn VulnerabilityDetector>] {
        &self.detectors
    }

    /// Runs every detector against every contract unit.
    ///
    /// A panicking detector is a programming defect, not a user error: its
    /// contribution is dropped and logged, and the scan continues with the
    /// remaining rules and units.
    ///
    /// # Arguments
    ///
    /// * `units` - The extracted contract units to scan
    ///
    /// # Returns
    ///
    /// All findings, sorted by severity in descending order. Final report
    /// ordering and deduplication happen in the aggregator.
    pub fn run_all(&self, units: &[ContractUnit]) -> Vec<Finding> {
        let mut all_findings = Vec::new();

        for unit in units {
            for detector in &self.detectors {
                match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    detector.detect(unit)
                })) {
                    Ok(findings) => all_findings.extend(findings),
                    Err(_) => {
                        log::error!(
                            "detector {} panicked on contract `{}`; dropping its findings",
                            detector.id(),
                            unit.name
                        );
                    }
                }
            }
        }

        all_findings.sort_by(|a, b| b.severity.cmp(&a.severity));

        all_findings
    }

    /// Runs a specific detector by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The detector ID (e.g., "V001")
    /// * `units` - The contract units to scan
    ///
    /// # Returns
    ///
    /// Findings from the specified detector, or empty if not found.
    pub fn run_by_id(&self, id: &str, units: &[ContractUnit]) -> Vec<Finding> {
        for detector in &self.detectors {
            if detector.id() == id {
                return units.iter().flat_map(|u| detector.detect(u)).collect();
            }
        }
        Vec::new()
    }

    /// Retrieves a detector by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The detector ID to look up
    ///
    /// # Returns
    ///
    /// A reference to the detector if found.
    pub fn get_detector(&self, id: &str) -> Option<&dyn VulnerabilityDetector> {
        for detector in &self.detectors {
            if detector.id() == id {
                return Some(detector.as_ref());
            }
        }
        None
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper function to create a finding from a detector.
///
/// Standardizes the creation of findings with consistent formatting. The
/// finding id derives from detector, contract, and line so repeated scans
/// of the same source produce identical ids.
///
/// # Arguments
///
/// * `detector` - The detector creating the finding
/// * `unit` - The contract unit the finding belongs to
/// * `function` - The function the finding is scoped to, if any
/// * `title` - Short title describing the finding
/// * `description` - Detailed description of the vulnerability
/// * `line` - Line number in the source file
/// * `code_snippet` - Optional code snippet showing the flagged pattern
///
/// # Returns
///
/// A fully populated [`Finding`] instance.
pub fn create_finding(
    detector: &dyn VulnerabilityDetector,
    unit: &ContractUnit,
    function: Option<&Function>,
    title: String,
    description: String,
    line: usize,
    code_snippet: Option<String>,
) -> Finding {
    let location = match function {
        Some(f) => format!("{}::{}", unit.name, f.name),
        None => unit.name.clone(),
    };

    Finding {
        id: format!("{}-{}-{}", detector.id(), unit.name, line),
        detector_id: detector.id().to_string(),
        category: detector.category(),
        title,
        description,
        severity: detector.severity(),
        contract: unit.name.clone(),
        function: function.map(|f| f.name.clone()),
        file_path: unit.file_path.clone(),
        line,
        location,
        code_snippet,
        remediation: detector.remediation().to_string(),
        cwe: detector.cwe().map(|s| s.to_string()),
        estimated_savings: None,
        contract_order: unit.order,
        function_order: function.map(|f| f.index),
    }
}
