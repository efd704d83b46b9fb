//! # V006: Unsafe Delegatecall Detector
//!
//! @title V006 - Delegatecall to Caller-Supplied Target
//! @author Ramprasad
//!
//! `delegatecall` executes foreign code with this contract's storage and
//! balance. When the target address arrives as a function argument, any
//! caller can point it at a contract that rewrites storage or
//! self-destructs the proxy (the Parity wallet failure mode).
//!
//! ## CWE Reference
//!
//! - CWE-829: Inclusion of Functionality from Untrusted Control Sphere

use super::{create_finding, VulnerabilityDetector};
use crate::parser::{contains_word, CallKind, ContractUnit, StatementKind};
use crate::report::{Category, Finding, Severity};

/// Detector for delegatecalls whose target a caller controls.
pub struct UnsafeDelegatecallDetector;

impl VulnerabilityDetector for UnsafeDelegatecallDetector {
    fn id(&self) -> &'static str {
        "V006"
    }

    fn name(&self) -> &'static str {
        "Unsafe Delegatecall"
    }

    fn description(&self) -> &'static str {
        "Detects delegatecall where the target address is sourced from a \
         function argument rather than a fixed or storage-held address."
    }

    fn category(&self) -> Category {
        Category::UnsafeDelegatecall
    }

    fn severity(&self) -> Severity {
        Severity::Critical
    }

    fn cwe(&self) -> Option<&'static str> {
        Some("CWE-829")
    }

    fn remediation(&self) -> &'static str {
        "Delegatecall only to immutable, audited implementation addresses:\n\
         - Store the implementation in an immutable/constant variable\n\
         - If upgradability is required, restrict the setter with access \
           control and consider a timelock"
    }

    fn detect(&self, unit: &ContractUnit) -> Vec<Finding> {
        let mut findings = Vec::new();

        for function in &unit.functions {
            for stmt in &function.body {
                let StatementKind::ExternalCall { target, kind, .. } = &stmt.kind else {
                    continue;
                };
                if *kind != CallKind::Delegatecall {
                    continue;
                }

                let tainted_param = function
                    .params
                    .iter()
                    .find(|p| !p.name.is_empty() && contains_word(target, &p.name));

                if let Some(param) = tainted_param {
                    findings.push(create_finding(
                        self,
                        unit,
                        Some(function),
                        format!(
                            "`{}` delegatecalls a caller-supplied address",
                            function.name
                        ),
                        format!(
                            "The delegatecall target `{}` comes from parameter `{}`. Any \
                             caller can supply code that executes with this contract's \
                             storage and balance.",
                            target, param.name
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
        let detector = UnsafeDelegatecallDetector;
        units.iter().flat_map(|u| detector.detect(u)).collect()
    }

    #[test]
    fn test_argument_target_is_flagged() {
        let source = r#"
            contract Proxy {
                function execute(address target, bytes memory data) public {
                    (bool ok, ) = target.delegatecall(data);
                    require(ok);
                }
            }
        "#;

        let findings = analyze(source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Critical);
        assert_eq!(findings[0].category, Category::UnsafeDelegatecall);
    }

    #[test]
    fn test_storage_target_is_quiet() {
        let source = r#"
            contract Proxy {
                address public implementation;

                function execute(bytes memory data) public {
                    (bool ok, ) = implementation.delegatecall(data);
                    require(ok);
                }
            }
        "#;

        assert!(analyze(source).is_empty());
    }
}
