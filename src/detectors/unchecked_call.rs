//! # V004: Unchecked Call Return Detector
//!
//! @title V004 - Unchecked Low-Level Call Return
//! @author Ramprasad
//!
//! Detects low-level calls whose success flag is never consulted. `send`,
//! `call`, `delegatecall`, and `staticcall` signal failure by returning
//! `false`; ignoring the flag lets execution continue as if the call
//! succeeded.
//!
//! ## Detection Strategy
//!
//! A call is checked when its success flag is bound to a local and a later
//! `require` or conditional in the same function references that local.
//! Calls wrapped directly in `require(...)` classify as requires during
//! extraction and are therefore their own check. `transfer` reverts on
//! failure and is excluded.
//!
//! ## CWE Reference
//!
//! - CWE-252: Unchecked Return Value

use super::{create_finding, VulnerabilityDetector};
use crate::parser::{contains_word, CallKind, ContractUnit, StatementKind};
use crate::report::{Category, Finding, Severity};

/// Detector for ignored low-level call results.
pub struct UncheckedCallDetector;

impl VulnerabilityDetector for UncheckedCallDetector {
    fn id(&self) -> &'static str {
        "V004"
    }

    fn name(&self) -> &'static str {
        "Unchecked Call Return"
    }

    fn description(&self) -> &'static str {
        "Detects low-level calls (call/send/delegatecall/staticcall) whose \
         boolean success value is never bound or never checked."
    }

    fn category(&self) -> Category {
        Category::UncheckedCallReturn
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn cwe(&self) -> Option<&'static str> {
        Some("CWE-252")
    }

    fn remediation(&self) -> &'static str {
        "Bind and check the success flag:\n\
         (bool success, ) = target.call{value: amount}(\"\");\n\
         require(success, \"call failed\");"
    }

    fn detect(&self, unit: &ContractUnit) -> Vec<Finding> {
        let mut findings = Vec::new();

        for function in &unit.functions {
            for (i, stmt) in function.body.iter().enumerate() {
                let StatementKind::ExternalCall { kind, bound_to, .. } = &stmt.kind else {
                    continue;
                };

                // transfer() reverts on failure; nothing to check.
                if *kind == CallKind::Transfer {
                    continue;
                }

                let checked = match bound_to {
                    None => false,
                    Some(flag) => function.body[i + 1..].iter().any(|later| match &later.kind {
                        StatementKind::Require { condition, .. } => contains_word(condition, flag),
                        _ => {
                            later.raw.trim_start().starts_with("if")
                                && contains_word(&later.raw, flag)
                        }
                    }),
                };

                if !checked {
                    findings.push(create_finding(
                        self,
                        unit,
                        Some(function),
                        format!(
                            "Return value of {:?} in `{}` is not checked",
                            kind, function.name
                        ),
                        format!(
                            "The call at line {} returns a success flag that no later \
                             require or conditional in `{}` consults. A failed call is \
                             silently ignored.",
                            stmt.line, function.name
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract_contracts;

    fn analyze(source: &str) -> Vec<Finding> {
        let (units, _) = extract_contracts(source, "test.sol");
        let detector = UncheckedCallDetector;
        units.iter().flat_map(|u| detector.detect(u)).collect()
    }

    #[test]
    fn test_unbound_send_is_flagged() {
        let source = r#"
            contract Payout {
                function pay(address payable to) public {
                    to.send(1 ether);
                }
            }
        "#;

        let findings = analyze(source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, Category::UncheckedCallReturn);
    }

    #[test]
    fn test_bound_but_unchecked_is_flagged() {
        let source = r#"
            contract Payout {
                function pay(address payable to) public {
                    (bool ok, ) = to.call{value: 1 ether}("");
                }
            }
        "#;

        assert_eq!(analyze(source).len(), 1);
    }

    #[test]
    fn test_required_flag_is_quiet() {
        let source = r#"
            contract Payout {
                function pay(address payable to) public {
                    (bool ok, ) = to.call{value: 1 ether}("");
                    require(ok, "transfer failed");
                }
            }
        "#;

        assert!(analyze(source).is_empty());
    }

    #[test]
    fn test_transfer_is_excluded() {
        let source = r#"
            contract Payout {
                function pay(address payable to) public {
                    to.transfer(1 ether);
                }
            }
        "#;

        assert!(analyze(source).is_empty());
    }
}
