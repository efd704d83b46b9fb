//! # V005: Timestamp Dependence Detector
//!
//! @title V005 - Block Timestamp Dependence
//! @author Ramprasad
//!
//! Miners can skew `block.timestamp` by several seconds. Using it in a
//! modulus or equality comparison (lottery-style selection, exact-time
//! gates) hands the outcome to the block producer. Plain inequality
//! deadlines (`block.timestamp > deadline`) are tolerated.
//!
//! ## CWE Reference
//!
//! - CWE-829: Inclusion of Functionality from Untrusted Control Sphere

use super::{create_finding, VulnerabilityDetector};
use crate::parser::{contains_word, ContractUnit, Statement, StatementKind};
use crate::report::{Category, Finding, Severity};

/// Detector for outcome-deciding timestamp comparisons.
pub struct TimestampDependenceDetector;

impl TimestampDependenceDetector {
    /// The conditional expression of a statement, if it has one.
    fn conditional_expr(stmt: &Statement) -> Option<&str> {
        match &stmt.kind {
            StatementKind::Require { condition, .. } => Some(condition),
            _ if stmt.raw.trim_start().starts_with("if") => Some(&stmt.raw),
            _ => None,
        }
    }

    fn is_timestamp_sensitive(expr: &str) -> bool {
        let references_timestamp =
            expr.contains("block.timestamp") || contains_word(expr, "now");
        references_timestamp && (expr.contains('%') || expr.contains("=="))
    }
}

impl VulnerabilityDetector for TimestampDependenceDetector {
    fn id(&self) -> &'static str {
        "V005"
    }

    fn name(&self) -> &'static str {
        "Timestamp Dependence"
    }

    fn description(&self) -> &'static str {
        "Detects block.timestamp used in modulus or equality comparisons, \
         where miner-controlled skew decides the outcome."
    }

    fn category(&self) -> Category {
        Category::TimestampDependence
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn cwe(&self) -> Option<&'static str> {
        Some("CWE-829")
    }

    fn remediation(&self) -> &'static str {
        "Do not derive randomness or exact equality from block.timestamp. \
         Use a commit-reveal scheme or an oracle for randomness; use \
         inequality ranges for deadlines."
    }

    fn detect(&self, unit: &ContractUnit) -> Vec<Finding> {
        let mut findings = Vec::new();

        for function in &unit.functions {
            for stmt in &function.body {
                let Some(expr) = Self::conditional_expr(stmt) else {
                    continue;
                };

                if Self::is_timestamp_sensitive(expr) {
                    findings.push(create_finding(
                        self,
                        unit,
                        Some(function),
                        format!("`{}` gates an outcome on block.timestamp", function.name),
                        "The comparison uses the block timestamp in a modulus or equality \
                         check. Block producers can shift the timestamp enough to choose \
                         the result."
                            .to_string(),
                        stmt.line,
                        Some(stmt.raw.clone()),
                    ));
                }
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract_contracts;

    fn analyze(source: &str) -> Vec<Finding> {
        let (units, _) = extract_contracts(source, "test.sol");
        let detector = TimestampDependenceDetector;
        units.iter().flat_map(|u| detector.detect(u)).collect()
    }

    #[test]
    fn test_lottery_modulus_is_flagged() {
        let source = r#"
            contract Lottery {
                function draw() public {
                    require(block.timestamp % 15 == 0, "not yet");
                }
            }
        "#;

        let findings = analyze(source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
    }

    #[test]
    fn test_deadline_inequality_is_quiet() {
        let source = r#"
            contract Sale {
                uint256 public deadline;

                function buy() public payable {
                    require(block.timestamp < deadline, "sale over");
                }
            }
        "#;

        assert!(analyze(source).is_empty());
    }
}
