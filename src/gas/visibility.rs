//! # G003: Public vs External Visibility
//!
//! @title G003 - Public Function Never Called Internally
//! @author Ramprasad
//!
//! `public` functions copy calldata arguments to memory to support internal
//! callers. A function with no internal call sites can be `external` and
//! read arguments directly from calldata.

use super::{create_gas_finding, GasDetector};
use crate::parser::{find_word, ContractUnit, Function, Visibility};
use crate::report::{Category, Finding, Severity};

/// Rule suggesting `external` for never-internally-called public functions.
pub struct PublicExternalDetector;

impl PublicExternalDetector {
    /// Returns `true` if any body in the unit calls `name(...)` directly
    /// (without `this.`), i.e. an internal call site exists.
    fn called_internally(unit: &ContractUnit, name: &str) -> bool {
        unit.functions
            .iter()
            .flat_map(|f| f.body.iter())
            .chain(unit.modifiers.iter().flat_map(|m| m.body.iter()))
            .any(|stmt| {
                let mut search = 0usize;
                while let Some(pos) = find_word(&stmt.raw[search..], name) {
                    let abs = search + pos;
                    let after = abs + name.len();
                    let preceded_by_this = abs >= 5 && &stmt.raw[abs - 5..abs] == "this.";
                    if stmt.raw[after..].trim_start().starts_with('(') && !preceded_by_this {
                        return true;
                    }
                    search = after;
                }
                false
            })
    }

    fn eligible(function: &Function) -> bool {
        function.visibility == Visibility::Public
            && !function.is_constructor
            && !function.is_receive_or_fallback
    }
}

impl GasDetector for PublicExternalDetector {
    fn id(&self) -> &'static str {
        "G003"
    }

    fn name(&self) -> &'static str {
        "Public vs External"
    }

    fn description(&self) -> &'static str {
        "Detects public functions with no internal call sites that could be \
         declared external for cheaper calldata handling."
    }

    fn category(&self) -> Category {
        Category::VisibilityOptimization
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn estimated_savings(&self) -> &'static str {
        "~200-2000 gas depending on parameters"
    }

    fn remediation(&self) -> &'static str {
        "Declare the function external instead of public if it is never \
         called from inside the contract."
    }

    fn detect(&self, unit: &ContractUnit) -> Vec<Finding> {
        let mut findings = Vec::new();

        for function in &unit.functions {
            if !Self::eligible(function) {
                continue;
            }
            if Self::called_internally(unit, &function.name) {
                continue;
            }

            findings.push(create_gas_finding(
                self,
                unit,
                Some(function),
                format!("Function `{}` could be external", function.name),
                format!(
                    "`{}` is public but nothing in `{}` calls it internally; external \
                     visibility avoids the memory copy of its arguments.",
                    function.name, unit.name
                ),
                function.line,
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
        let detector = PublicExternalDetector;
        units.iter().flat_map(|u| detector.detect(u)).collect()
    }

    #[test]
    fn test_uncalled_public_function_is_flagged() {
        let source = r#"
            contract C {
                function standalone(uint256 x) public {}
            }
        "#;

        let findings = analyze(source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, Category::VisibilityOptimization);
    }

    #[test]
    fn test_internally_called_function_is_quiet() {
        let source = r#"
            contract C {
                uint256 public total;

                function add(uint256 x) public {
                    total += x;
                }

                function addTwice(uint256 x) public {
                    add(x);
                    add(x);
                }
            }
        "#;

        let findings = analyze(source);
        assert!(findings.iter().all(|f| !f.title.contains("`add`")));
        assert!(findings.iter().any(|f| f.title.contains("addTwice")));
    }

    #[test]
    fn test_external_function_not_considered() {
        let source = r#"
            contract C {
                function f() external {}
            }
        "#;

        assert!(analyze(source).is_empty());
    }
}
