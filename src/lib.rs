//! # Solidity-Sentinel Library
//!
//! @title Solidity-Sentinel - Static Analysis Security Scanner
//! @author Ramprasad
//!
//! A static analysis library for Solidity smart contracts.
//!
//! This library provides the core functionality for detecting security
//! vulnerabilities and gas inefficiencies in Solidity source code without
//! executing it: source text becomes a structural model, and closed rule
//! catalogs are evaluated against the model to produce an ordered,
//! severity-ranked report.
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface definitions and argument parsing
//! - [`parser`] - Structural extraction of Solidity source code
//! - [`detectors`] - Security vulnerability detection rules
//! - [`gas`] - Gas optimization analysis rules
//! - [`report`] - Finding aggregation and report generation
//!
//! ## Example
//!
//! ```rust,ignore
//! use solidity_sentinel::{parser::extract_contracts, run_all_detectors};
//!
//! let (units, warnings) = extract_contracts(&source, "Vault.sol");
//! let report = run_all_detectors(&units);
//! println!("{}", report.to_markdown());
//! ```

pub mod cli;
pub mod detectors;
pub mod gas;
pub mod parser;
pub mod report;

pub use cli::Cli;
pub use detectors::DetectorRegistry;
pub use gas::GasRegistry;
pub use parser::ContractUnit;
pub use report::{Category, Finding, Report, Severity};

/// Runs both rule catalogs over the extracted units and aggregates the
/// result into the final report model.
///
/// Deterministic: the same units with the same catalogs always yield an
/// identical ordered finding list.
///
/// # Arguments
///
/// * `units` - Contract units produced by [`parser::extract_contracts`]
///
/// # Returns
///
/// The deduplicated, severity-ordered [`Report`].
pub fn run_all_detectors(units: &[ContractUnit]) -> Report {
    build_report(units, Vec::new())
}

/// Like [`run_all_detectors`], but folds extraction parse warnings into
/// the report so renderers see them alongside rule findings.
///
/// # Arguments
///
/// * `units` - Contract units produced by extraction
/// * `parse_warnings` - Warning findings returned by the extractor
///
/// # Returns
///
/// The deduplicated, severity-ordered [`Report`].
pub fn build_report(units: &[ContractUnit], parse_warnings: Vec<Finding>) -> Report {
    let mut security = DetectorRegistry::new().run_all(units);
    security.extend(parse_warnings);

    let gas = GasRegistry::new().run_all(units);

    report::aggregate(security, gas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_is_deterministic_end_to_end() {
        let source = r#"
            contract Vault {
                address public owner;
                mapping(address => uint256) public balances;

                constructor() {
                    owner = msg.sender;
                }

                function deposit() public payable {
                    balances[msg.sender] += msg.value;
                }

                function withdraw() public {
                    (bool ok, ) = msg.sender.call{value: balances[msg.sender]}("");
                    balances[msg.sender] = 0;
                }
            }
        "#;

        let (units, warnings) = parser::extract_contracts(source, "Vault.sol");
        let first = build_report(&units, warnings.clone());
        let second = build_report(&units, warnings);

        assert_eq!(first, second);
        assert!(first.summary.total > 0);
    }

    #[test]
    fn test_ordering_law_severity_descending() {
        let source = r#"
            contract Mixed {
                address public owner;

                function setOwner(address next) public {
                    owner = next;
                }

                function check() public view {
                    require(msg.sender == owner, "denied");
                }
            }
        "#;

        let (units, _) = parser::extract_contracts(source, "Mixed.sol");
        let report = run_all_detectors(&units);

        let severities: Vec<_> = report.findings.iter().map(|f| f.severity).collect();
        let mut sorted = severities.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(severities, sorted, "findings must be severity-descending");
    }
}
