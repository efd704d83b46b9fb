//! # V002: Missing Access Control Detector
//!
//! @title V002 - Missing Access Control
//! @author Ramprasad
//!
//! Detects externally callable functions that mutate protected state
//! without any recognizable authorization guard.
//!
//! ## Vulnerability Description
//!
//! A state variable that the constructor initializes, or that the contract
//! compares against `msg.sender`, is part of the contract's trust model.
//! If a `public`/`external` function reassigns such a variable and neither
//! an authorization modifier nor an inline sender check protects it, any
//! caller can take over the contract.
//!
//! ## Detection Strategy
//!
//! 1. Consider non-view `public`/`external` functions (constructors and
//!    receive/fallback excluded)
//! 2. Collect the state variables they write
//! 3. A variable is protected when it is written in the constructor, is an
//!    authority-named `address`, or is compared against `msg.sender`
//!    elsewhere in the unit
//! 4. Flag when no applied modifier declared in this unit enforces a
//!    sender check and no inline `require(msg.sender ...)` exists
//!
//! Modifiers that are only referenced by name (inherited from another
//! unit) are opaque and never count as guards: the rule prefers a false
//! positive on inherited `onlyOwner` over silently trusting an unknown
//! modifier. Severity escalates to Critical when the mutated variable
//! gates a fund transfer.
//!
//! ## CWE Reference
//!
//! - CWE-862: Missing Authorization

use super::utils::{
    compared_to_sender, constructor_written_vars, gates_fund_transfer, has_guard_modifier,
    has_inline_sender_guard, is_authority_name,
};
use super::{create_finding, VulnerabilityDetector};
use crate::parser::{ContractUnit, StatementKind, Visibility};
use crate::report::{Category, Finding, Severity};

/// Detector for unguarded privileged state mutations.
pub struct MissingAccessControlDetector;

impl VulnerabilityDetector for MissingAccessControlDetector {
    fn id(&self) -> &'static str {
        "V002"
    }

    fn name(&self) -> &'static str {
        "Missing Access Control"
    }

    fn description(&self) -> &'static str {
        "Detects public/external functions that mutate authority-bearing or \
         constructor-initialized state without a sender authorization check."
    }

    fn category(&self) -> Category {
        Category::MissingAccessControl
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn cwe(&self) -> Option<&'static str> {
        Some("CWE-862")
    }

    fn remediation(&self) -> &'static str {
        "Guard privileged functions with an authorization check:\n\
         - Apply a modifier that compares msg.sender against the stored \
           authority and reverts on mismatch\n\
         - Or add `require(msg.sender == owner)` at the top of the function"
    }

    fn detect(&self, unit: &ContractUnit) -> Vec<Finding> {
        let mut findings = Vec::new();
        let ctor_vars = constructor_written_vars(unit);

        for function in &unit.functions {
            if function.is_constructor || function.is_receive_or_fallback {
                continue;
            }
            if !matches!(function.visibility, Visibility::Public | Visibility::External) {
                continue;
            }
            if function.is_read_only() {
                continue;
            }

            let written: Vec<&String> = function
                .body
                .iter()
                .filter_map(|stmt| match &stmt.kind {
                    StatementKind::StorageWrite { variable } => Some(variable),
                    _ => None,
                })
                .collect();

            let protected: Vec<&String> = written
                .into_iter()
                .filter(|variable| self.is_protected(unit, &ctor_vars, variable))
                .collect();

            if protected.is_empty() {
                continue;
            }

            if has_guard_modifier(unit, function) || has_inline_sender_guard(function) {
                continue;
            }

            let gates_funds = protected
                .iter()
                .any(|variable| gates_fund_transfer(unit, variable));

            let variables = protected
                .iter()
                .map(|v| format!("`{}`", v))
                .collect::<Vec<_>>()
                .join(", ");

            let mut finding = create_finding(
                self,
                unit,
                Some(function),
                format!(
                    "Function `{}` mutates {} without access control",
                    function.name, variables
                ),
                format!(
                    "`{}` is callable by anyone and reassigns {}. No applied modifier in \
                     `{}` performs a msg.sender check, and the body contains no inline \
                     sender requirement.",
                    function.name, variables, unit.name
                ),
                function.line,
                None,
            );

            if gates_funds {
                finding.severity = Severity::Critical;
            }

            findings.push(finding);
        }

        findings
    }
}

impl MissingAccessControlDetector {
    /// A state variable is protected when the constructor initializes it,
    /// it is an authority-named address, or the unit compares it against
    /// `msg.sender`.
    fn is_protected(&self, unit: &ContractUnit, ctor_vars: &[String], variable: &str) -> bool {
        if ctor_vars.iter().any(|v| v == variable) {
            return true;
        }

        if let Some(var) = unit.find_state_variable(variable) {
            if var.ty.starts_with("address") && is_authority_name(&var.name) {
                return true;
            }
        }

        compared_to_sender(unit, variable)
    }
}
