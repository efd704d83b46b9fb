//! # Shared Detector Heuristics
//!
//! @title Authorization and State-Flow Helpers
//! @author Ramprasad
//!
//! Structural helpers shared by the detectors: authority-name matching,
//! modifier-based and inline authorization guard recognition, and
//! constructor/fund-flow queries over a [`ContractUnit`].
//!
//! Everything here is deliberately a heuristic over the structural model.
//! The tradeoffs are one-sided by design: guard recognition prefers false
//! negatives (an unrecognized guard suppresses a finding) so the access
//! control rule stays quiet on well-guarded code.

use crate::parser::{contains_word, CallKind, ContractUnit, Function, Modifier, StatementKind};

/// Naming patterns that suggest an account or variable holds authority.
const AUTHORITY_PATTERNS: [&str; 11] = [
    "authority",
    "owner",
    "admin",
    "manager",
    "operator",
    "governor",
    "controller",
    "treasury",
    "guardian",
    "minter",
    "beneficiary",
];

/// Returns `true` if a name suggests an authority reference.
pub fn is_authority_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    AUTHORITY_PATTERNS
        .iter()
        .any(|pattern| lower.contains(pattern))
}

/// Returns `true` if a modifier body enforces an authorization check:
/// a `msg.sender` comparison guarded by a require/revert.
pub fn is_auth_guard(modifier: &Modifier) -> bool {
    modifier.body.iter().any(|stmt| match &stmt.kind {
        StatementKind::Require { condition, .. } => condition.contains("msg.sender"),
        _ => stmt.raw.contains("msg.sender") && stmt.raw.contains("revert"),
    })
}

/// Returns `true` if any modifier applied to `function` resolves to an
/// authorization guard declared in the same unit.
///
/// Modifiers referenced by name only (inherited or external) are opaque:
/// they never count as guards, which keeps the reasoning sound at the cost
/// of false positives on inherited `onlyOwner`-style modifiers.
pub fn has_guard_modifier(unit: &ContractUnit, function: &Function) -> bool {
    function
        .modifiers
        .iter()
        .filter_map(|name| unit.find_modifier(name))
        .any(is_auth_guard)
}

/// Returns `true` if the function body itself compares `msg.sender` inside
/// a require, or reverts behind a sender comparison.
pub fn has_inline_sender_guard(function: &Function) -> bool {
    function.body.iter().any(|stmt| match &stmt.kind {
        StatementKind::Require { condition, .. } => condition.contains("msg.sender"),
        _ => stmt.raw.contains("msg.sender") && stmt.raw.contains("revert"),
    })
}

/// Names of state variables written inside the constructor.
pub fn constructor_written_vars(unit: &ContractUnit) -> Vec<String> {
    unit.functions
        .iter()
        .filter(|f| f.is_constructor)
        .flat_map(|f| f.body.iter())
        .filter_map(|stmt| match &stmt.kind {
            StatementKind::StorageWrite { variable } => Some(variable.clone()),
            _ => None,
        })
        .collect()
}

/// Returns `true` if the variable is compared against `msg.sender`
/// anywhere in the unit (function or modifier bodies).
pub fn compared_to_sender(unit: &ContractUnit, variable: &str) -> bool {
    let mentions_both = |raw: &str| {
        raw.contains("msg.sender")
            && contains_word(raw, variable)
            && (raw.contains("==") || raw.contains("!="))
    };

    unit.functions
        .iter()
        .flat_map(|f| f.body.iter())
        .chain(unit.modifiers.iter().flat_map(|m| m.body.iter()))
        .any(|stmt| mentions_both(&stmt.raw))
}

/// Returns `true` if a statement moves Ether out of the contract.
pub fn is_value_transfer(kind: &StatementKind) -> bool {
    match kind {
        StatementKind::ExternalCall { kind, value, .. } => match kind {
            CallKind::Transfer | CallKind::Send => true,
            CallKind::Call => value.is_some(),
            _ => false,
        },
        _ => false,
    }
}

/// Returns `true` if the variable guards a function that moves Ether:
/// some value-transferring function references it in its body or in one of
/// its resolved modifiers. Used to escalate access control findings.
pub fn gates_fund_transfer(unit: &ContractUnit, variable: &str) -> bool {
    unit.functions.iter().any(|f| {
        let transfers = f.body.iter().any(|s| is_value_transfer(&s.kind));
        if !transfers {
            return false;
        }

        let in_body = f.body.iter().any(|s| contains_word(&s.raw, variable));
        let in_modifiers = f
            .modifiers
            .iter()
            .filter_map(|name| unit.find_modifier(name))
            .flat_map(|m| m.body.iter())
            .any(|s| contains_word(&s.raw, variable));

        in_body || in_modifiers
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract_contracts;

    fn unit(source: &str) -> ContractUnit {
        let (mut units, _) = extract_contracts(source, "test.sol");
        units.remove(0)
    }

    #[test]
    fn test_is_authority_name() {
        assert!(is_authority_name("owner"));
        assert!(is_authority_name("pendingAdmin"));
        assert!(!is_authority_name("totalSupply"));
    }

    #[test]
    fn test_modifier_guard_recognition() {
        let unit = unit(
            r#"
            contract Guarded {
                address public owner;

                modifier onlyOwner() {
                    require(msg.sender == owner, "not owner");
                    _;
                }

                modifier nonReentrant() {
                    require(!locked);
                    _;
                }
            }
        "#,
        );

        assert!(is_auth_guard(unit.find_modifier("onlyOwner").unwrap()));
        assert!(!is_auth_guard(unit.find_modifier("nonReentrant").unwrap()));
    }

    #[test]
    fn test_constructor_written_vars() {
        let unit = unit(
            r#"
            contract C {
                address public owner;
                uint256 public fee;

                constructor() {
                    owner = msg.sender;
                }
            }
        "#,
        );

        let written = constructor_written_vars(&unit);
        assert_eq!(written, vec!["owner".to_string()]);
    }

    #[test]
    fn test_compared_to_sender() {
        let unit = unit(
            r#"
            contract C {
                address public owner;
                address public feeRecipient;

                function f() public {
                    require(msg.sender == owner);
                }
            }
        "#,
        );

        assert!(compared_to_sender(&unit, "owner"));
        assert!(!compared_to_sender(&unit, "feeRecipient"));
    }
}
