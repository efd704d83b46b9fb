//! # V001: Reentrancy Detector
//!
//! @title V001 - Reentrancy (Checks-Effects-Interactions Violation)
//! @author Ramprasad
//!
//! Detects functions where an external call precedes the state write that
//! should gate it, the pattern behind the classic recursive-drain exploits.
//!
//! ## Vulnerability Description
//!
//! When a function sends value based on a state variable and only updates
//! that variable *after* the external call, the callee can reenter the
//! function before the update and drain funds repeatedly.
//!
//! ```solidity
//! // VULNERABLE: effect follows interaction
//! function withdraw() public {
//!     (bool ok, ) = msg.sender.call{value: balances[msg.sender]}("");
//!     balances[msg.sender] = 0;
//! }
//! ```
//!
//! ## Detection Strategy
//!
//! Pure statement-order matching, no dataflow graph:
//!
//! 1. Find each `ExternalCall` statement at index *i*
//! 2. Collect the state variables its value/target expression reads, plus
//!    those read by `require` guards before the call
//! 3. Flag if a `StorageWrite` to one of those variables appears at an
//!    index *j > i*
//!
//! A write the call never depended on is not flagged, so bookkeeping
//! updates after an unrelated call stay quiet (documented false-negative
//! bias; the converse ordering is the high-confidence signal).
//!
//! ## CWE Reference
//!
//! - CWE-841: Improper Enforcement of Behavioral Workflow

use super::{create_finding, VulnerabilityDetector};
use crate::parser::{contains_word, ContractUnit, Function, StatementKind};
use crate::report::{Category, Finding, Severity};

/// Detector for checks-effects-interactions violations.
pub struct ReentrancyDetector;

impl VulnerabilityDetector for ReentrancyDetector {
    fn id(&self) -> &'static str {
        "V001"
    }

    fn name(&self) -> &'static str {
        "Reentrancy"
    }

    fn description(&self) -> &'static str {
        "Detects external calls that precede the state writes gating them. \
         The callee can reenter before the state update and repeat the \
         interaction, draining funds."
    }

    fn category(&self) -> Category {
        Category::Reentrancy
    }

    fn severity(&self) -> Severity {
        Severity::Critical
    }

    fn cwe(&self) -> Option<&'static str> {
        Some("CWE-841")
    }

    fn remediation(&self) -> &'static str {
        "Apply the Checks-Effects-Interactions pattern:\n\
         1. Perform all require checks first\n\
         2. Update state variables (effects)\n\
         3. Make the external call last (interaction)\n\
         Alternatively guard the function with a reentrancy lock."
    }

    fn detect(&self, unit: &ContractUnit) -> Vec<Finding> {
        let mut findings = Vec::new();

        for function in &unit.functions {
            if function.is_constructor {
                continue;
            }

            for (i, stmt) in function.body.iter().enumerate() {
                let StatementKind::ExternalCall { target, value, .. } = &stmt.kind else {
                    continue;
                };

                let gating = self.variables_feeding_call(unit, function, i, target, value.as_deref());
                if gating.is_empty() {
                    continue;
                }

                let late_write = function.body[i + 1..].iter().find_map(|later| match &later.kind {
                    StatementKind::StorageWrite { variable }
                        if gating.iter().any(|g| g == variable) =>
                    {
                        Some((later.line, variable.clone()))
                    }
                    _ => None,
                });

                if let Some((write_line, variable)) = late_write {
                    findings.push(create_finding(
                        self,
                        unit,
                        Some(function),
                        format!(
                            "External call in `{}` precedes the write to `{}`",
                            function.name, variable
                        ),
                        format!(
                            "`{}` makes an external call at line {} and only updates `{}` at \
                             line {}. The callee can reenter before the update and repeat the \
                             interaction against stale state.",
                            function.name, stmt.line, variable, write_line
                        ),
                        stmt.line,
                        Some(stmt.raw.clone()),
                    ));
                }
            }
        }

        findings
    }
}

impl ReentrancyDetector {
    /// State variables the call at `call_idx` depends on: those read by its
    /// value or target expression, or by a require guard before the call.
    fn variables_feeding_call(
        &self,
        unit: &ContractUnit,
        function: &Function,
        call_idx: usize,
        target: &str,
        value: Option<&str>,
    ) -> Vec<String> {
        let mut gating = Vec::new();
        let mut collect = |expr: &str| {
            for var in &unit.state_variables {
                if contains_word(expr, &var.name) && !gating.contains(&var.name) {
                    gating.push(var.name.clone());
                }
            }
        };

        if let Some(value) = value {
            collect(value);
        }
        collect(target);

        for stmt in &function.body[..call_idx] {
            if let StatementKind::Require { condition, .. } = &stmt.kind {
                collect(condition);
            }
        }

        gating
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract_contracts;

    fn analyze(source: &str) -> Vec<Finding> {
        let (units, _) = extract_contracts(source, "test.sol");
        let detector = ReentrancyDetector;
        units.iter().flat_map(|u| detector.detect(u)).collect()
    }

    #[test]
    fn test_detect_call_before_write() {
        let source = r#"
            contract Vault {
                mapping(address => uint256) public balances;

                function withdraw() public {
                    (bool ok, ) = msg.sender.call{value: balances[msg.sender]}("");
                    balances[msg.sender] = 0;
                }
            }
        "#;

        let findings = analyze(source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Critical);
        assert_eq!(findings[0].category, Category::Reentrancy);
        assert_eq!(findings[0].function.as_deref(), Some("withdraw"));
    }

    #[test]
    fn test_no_finding_when_write_precedes_call() {
        let source = r#"
            contract Vault {
                mapping(address => uint256) public balances;

                function withdraw() public {
                    uint256 amount = balances[msg.sender];
                    balances[msg.sender] = 0;
                    (bool ok, ) = msg.sender.call{value: amount}("");
                }
            }
        "#;

        assert!(analyze(source).is_empty());
    }

    #[test]
    fn test_require_guard_counts_as_dependency() {
        let source = r#"
            contract Vault {
                mapping(address => uint256) public balances;

                function withdraw(uint256 amount) public {
                    require(balances[msg.sender] >= amount, "insufficient");
                    (bool ok, ) = msg.sender.call{value: amount}("");
                    balances[msg.sender] -= amount;
                }
            }
        "#;

        let findings = analyze(source);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_unrelated_late_write_is_quiet() {
        let source = r#"
            contract Logger {
                uint256 public callCount;

                function ping(address target) public {
                    (bool ok, ) = target.call("");
                    callCount += 1;
                }
            }
        "#;

        assert!(analyze(source).is_empty());
    }
}
