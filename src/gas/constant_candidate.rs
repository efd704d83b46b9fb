//! # G004: Constant/Immutable Candidate
//!
//! @title G004 - State Variable Never Reassigned After Construction
//! @author Ramprasad
//!
//! A state variable that is only written during construction can be
//! `immutable` (constructor-set) or `constant` (declaration-initialized),
//! turning every read from a storage load into a bytecode constant.

use super::{create_gas_finding, GasDetector};
use crate::parser::{ContractUnit, StatementKind, VarMutability};
use crate::report::{Category, Finding, Severity};

/// Rule flagging mutable state variables never reassigned after construction.
pub struct ConstantCandidateDetector;

impl ConstantCandidateDetector {
    /// Returns `true` if anything outside the constructor writes `name`.
    fn written_after_construction(unit: &ContractUnit, name: &str) -> bool {
        let function_writes = unit
            .functions
            .iter()
            .filter(|f| !f.is_constructor)
            .flat_map(|f| f.body.iter());
        let modifier_writes = unit.modifiers.iter().flat_map(|m| m.body.iter());

        function_writes.chain(modifier_writes).any(|stmt| {
            matches!(&stmt.kind, StatementKind::StorageWrite { variable } if variable == name)
        })
    }

    /// Returns `true` if the constructor writes `name`.
    fn written_in_constructor(unit: &ContractUnit, name: &str) -> bool {
        unit.functions
            .iter()
            .filter(|f| f.is_constructor)
            .flat_map(|f| f.body.iter())
            .any(|stmt| {
                matches!(&stmt.kind, StatementKind::StorageWrite { variable } if variable == name)
            })
    }
}

impl GasDetector for ConstantCandidateDetector {
    fn id(&self) -> &'static str {
        "G004"
    }

    fn name(&self) -> &'static str {
        "Constant/Immutable Candidate"
    }

    fn description(&self) -> &'static str {
        "Detects mutable state variables that are never reassigned after \
         construction and could be constant or immutable."
    }

    fn category(&self) -> Category {
        Category::ConstantCandidate
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn estimated_savings(&self) -> &'static str {
        "~2100 gas per read operation"
    }

    fn remediation(&self) -> &'static str {
        "Mark declaration-initialized variables constant and \
         constructor-set variables immutable."
    }

    fn detect(&self, unit: &ContractUnit) -> Vec<Finding> {
        let mut findings = Vec::new();

        for var in &unit.state_variables {
            if var.mutability != VarMutability::Mutable {
                continue;
            }
            // Reference types cannot be immutable; mappings cannot be
            // constant either.
            if var.ty.starts_with("mapping") || var.ty.contains("[]") {
                continue;
            }
            if Self::written_after_construction(unit, &var.name) {
                continue;
            }

            let ctor_set = Self::written_in_constructor(unit, &var.name);
            let keyword = if ctor_set {
                "immutable"
            } else if var.has_initializer {
                "constant"
            } else {
                continue;
            };

            findings.push(create_gas_finding(
                self,
                unit,
                None,
                format!("State variable `{}` could be {}", var.name, keyword),
                format!(
                    "`{}` is never reassigned after construction; declaring it {} \
                     replaces storage reads with an in-code value.",
                    var.name, keyword
                ),
                var.line,
                None,
            ));
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
        let detector = ConstantCandidateDetector;
        units.iter().flat_map(|u| detector.detect(u)).collect()
    }

    #[test]
    fn test_constructor_set_suggests_immutable() {
        let source = r#"
            contract C {
                address public deployer;

                constructor() {
                    deployer = msg.sender;
                }
            }
        "#;

        let findings = analyze(source);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].title.contains("immutable"));
    }

    #[test]
    fn test_initialized_suggests_constant() {
        let source = r#"
            contract C {
                uint256 public fee = 100;
            }
        "#;

        let findings = analyze(source);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].title.contains("constant"));
    }

    #[test]
    fn test_reassigned_variable_is_quiet() {
        let source = r#"
            contract C {
                uint256 public fee = 100;

                function setFee(uint256 next) public {
                    fee = next;
                }
            }
        "#;

        assert!(analyze(source).is_empty());
    }

    #[test]
    fn test_already_constant_is_quiet() {
        let source = r#"
            contract C {
                uint256 public constant FEE = 100;
            }
        "#;

        assert!(analyze(source).is_empty());
    }
}
