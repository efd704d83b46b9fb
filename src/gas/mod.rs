//! # Gas Analyzer Module
//!
//! @title Gas Optimization Analysis Framework
//! @author Ramprasad
//!
//! A rule catalog and runner parallel to the security detectors, specialized
//! for efficiency patterns. Gas findings are Informational/Low and carry an
//! opaque estimated-savings annotation; the numbers are rule-of-thumb
//! hints, not simulated gas costs.
//!
//! ## Available Rules
//!
//! | ID | Name | Severity |
//! |----|------|----------|
//! | G001 | Storage Access In Loop | Info |
//! | G002 | Require String Message | Low |
//! | G003 | Public vs External | Info |
//! | G004 | Constant/Immutable Candidate | Info |

mod constant_candidate;
mod loop_storage;
mod string_require;
mod visibility;

pub use constant_candidate::ConstantCandidateDetector;
pub use loop_storage::LoopStorageDetector;
pub use string_require::RequireStringDetector;
pub use visibility::PublicExternalDetector;

use crate::parser::{ContractUnit, Function};
use crate::report::{Category, Finding, Severity};

/// Trait for implementing gas optimization rules.
///
/// Same contract shape as the security detectors: each rule is a pure
/// function over one [`ContractUnit`], sharing no mutable state.
pub trait GasDetector: Send + Sync {
    /// Returns the unique identifier for this rule (e.g., "G001").
    fn id(&self) -> &'static str;

    /// Returns the human-readable name of the optimization.
    fn name(&self) -> &'static str;

    /// Returns a detailed description of the pattern this rule looks for.
    fn description(&self) -> &'static str;

    /// Returns the finding category reported by this rule.
    fn category(&self) -> Category;

    /// Returns the severity of findings from this rule (Info or Low).
    fn severity(&self) -> Severity;

    /// Returns the estimated-savings annotation attached to findings.
    fn estimated_savings(&self) -> &'static str;

    /// Returns the optimization suggestion.
    fn remediation(&self) -> &'static str;

    /// Runs the rule against one contract unit.
    fn detect(&self, unit: &ContractUnit) -> Vec<Finding>;
}

/// Registry containing all gas optimization rules.
pub struct GasRegistry {
    detectors: Vec<Box<dyn GasDetector>>,
}

impl GasRegistry {
    /// Creates a new registry with all default rules, G001 through G004.
    pub fn new() -> Self {
        let detectors: Vec<Box<dyn GasDetector>> = vec![
            Box::new(LoopStorageDetector),
            Box::new(RequireStringDetector),
            Box::new(PublicExternalDetector),
            Box::new(ConstantCandidateDetector),
        ];

        Self { detectors }
    }

    /// Returns a reference to all registered rules.
    pub fn detectors(&self) -> &[Box<dyn GasDetector>] {
        &self.detectors
    }

    /// Runs every gas rule against every contract unit.
    ///
    /// Mirrors the security registry: a panicking rule loses only its own
    /// contribution.
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
                            "gas rule {} panicked on contract `{}`; dropping its findings",
                            detector.id(),
                            unit.name
                        );
                    }
                }
            }
        }

        all_findings
    }
}

impl Default for GasRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper to create a gas finding with the rule's savings annotation.
pub fn create_gas_finding(
    detector: &dyn GasDetector,
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
        cwe: None,
        estimated_savings: Some(detector.estimated_savings().to_string()),
        contract_order: unit.order,
        function_order: function.map(|f| f.index),
    }
}
