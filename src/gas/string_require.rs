//! # G002: Require String Message
//!
//! @title G002 - require() With String Message
//! @author Ramprasad
//!
//! String revert reasons are stored in the deployed bytecode and ABI-encoded
//! on every revert. Custom errors (Solidity >= 0.8.4) encode as a 4-byte
//! selector and are significantly cheaper on both counts.

use super::{create_gas_finding, GasDetector};
use crate::parser::{ContractUnit, StatementKind};
use crate::report::{Category, Finding, Severity};

/// Rule flagging require statements with string messages.
pub struct RequireStringDetector;

impl GasDetector for RequireStringDetector {
    fn id(&self) -> &'static str {
        "G002"
    }

    fn name(&self) -> &'static str {
        "Require String Message"
    }

    fn description(&self) -> &'static str {
        "Detects require statements carrying a string message where a typed \
         custom error would be cheaper."
    }

    fn category(&self) -> Category {
        Category::StringRequireMessage
    }

    fn severity(&self) -> Severity {
        Severity::Low
    }

    fn estimated_savings(&self) -> &'static str {
        "~50 gas"
    }

    fn remediation(&self) -> &'static str {
        "Declare a custom error and revert with it:\n\
         error NotOwner();\n\
         if (msg.sender != owner) revert NotOwner();"
    }

    fn detect(&self, unit: &ContractUnit) -> Vec<Finding> {
        let mut findings = Vec::new();

        for function in &unit.functions {
            for stmt in &function.body {
                if matches!(
                    stmt.kind,
                    StatementKind::Require {
                        has_message: true,
                        ..
                    }
                ) {
                    findings.push(create_gas_finding(
                        self,
                        unit,
                        Some(function),
                        "require() with string message".to_string(),
                        format!(
                            "The require at line {} carries a string revert reason; a \
                             custom error avoids storing and encoding the string.",
                            stmt.line
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
