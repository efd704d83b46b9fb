//! # V003: tx.origin Authentication Detector
//!
//! @title V003 - tx.origin Authentication
//! @author Ramprasad
//!
//! Using `tx.origin` for authentication is vulnerable to phishing: a
//! malicious contract called by the victim passes the victim's address as
//! `tx.origin` and clears the check.
//!
//! ## CWE Reference
//!
//! - CWE-345: Insufficient Verification of Data Authenticity

use super::{create_finding, VulnerabilityDetector};
use crate::parser::{ContractUnit, Statement, StatementKind};
use crate::report::{Category, Finding, Severity};

/// Detector for `tx.origin`-based authentication.
pub struct TxOriginDetector;

impl TxOriginDetector {
    /// A statement uses tx.origin for authentication when the primitive
    /// appears inside a require or a comparison.
    fn is_origin_auth(stmt: &Statement) -> bool {
        if !stmt.raw.contains("tx.origin") {
            return false;
        }
        matches!(stmt.kind, StatementKind::Require { .. })
            || stmt.raw.contains("==")
            || stmt.raw.contains("!=")
            || stmt.raw.trim_start().starts_with("if")
    }
}

impl VulnerabilityDetector for TxOriginDetector {
    fn id(&self) -> &'static str {
        "V003"
    }

    fn name(&self) -> &'static str {
        "tx.origin Authentication"
    }

    fn description(&self) -> &'static str {
        "Detects authentication based on tx.origin instead of msg.sender, \
         which a phishing contract can satisfy on the victim's behalf."
    }

    fn category(&self) -> Category {
        Category::TxOriginAuth
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn cwe(&self) -> Option<&'static str> {
        Some("CWE-345")
    }

    fn remediation(&self) -> &'static str {
        "Use msg.sender instead of tx.origin for authentication checks."
    }

    fn detect(&self, unit: &ContractUnit) -> Vec<Finding> {
        let mut findings = Vec::new();

        for function in &unit.functions {
            for stmt in &function.body {
                if Self::is_origin_auth(stmt) {
                    findings.push(create_finding(
                        self,
                        unit,
                        Some(function),
                        format!("`{}` authenticates with tx.origin", function.name),
                        "tx.origin is the outermost transaction signer, not the direct \
                         caller. A contract the victim is tricked into calling passes \
                         this check."
                            .to_string(),
                        stmt.line,
                        Some(stmt.raw.clone()),
                    ));
                }
            }
        }

        for modifier in &unit.modifiers {
            for stmt in &modifier.body {
                if Self::is_origin_auth(stmt) {
                    let mut finding = create_finding(
                        self,
                        unit,
                        None,
                        format!("Modifier `{}` authenticates with tx.origin", modifier.name),
                        "tx.origin is the outermost transaction signer, not the direct \
                         caller. A contract the victim is tricked into calling passes \
                         this check."
                            .to_string(),
                        stmt.line,
                        Some(stmt.raw.clone()),
                    );
                    finding.function = Some(modifier.name.clone());
                    finding.location = format!("{}::{}", unit.name, modifier.name);
                    findings.push(finding);
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
        let detector = TxOriginDetector;
        units.iter().flat_map(|u| detector.detect(u)).collect()
    }

    #[test]
    fn test_require_with_tx_origin() {
        let source = r#"
            contract Wallet {
                address public owner;

                function withdrawAll() public {
                    require(tx.origin == owner, "not owner");
                    payable(msg.sender).transfer(address(this).balance);
                }
            }
        "#;

        let findings = analyze(source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[0].category, Category::TxOriginAuth);
    }

    #[test]
    fn test_msg_sender_is_quiet() {
        let source = r#"
            contract Wallet {
                address public owner;

                function withdrawAll() public {
                    require(msg.sender == owner, "not owner");
                    payable(msg.sender).transfer(address(this).balance);
                }
            }
        "#;

        assert!(analyze(source).is_empty());
    }

    #[test]
    fn test_tx_origin_in_modifier() {
        let source = r#"
            contract Wallet {
                address public owner;

                modifier onlyOwner() {
                    require(tx.origin == owner);
                    _;
                }
            }
        "#;

        let findings = analyze(source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].function.as_deref(), Some("onlyOwner"));
    }
}
