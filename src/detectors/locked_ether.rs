//! # V007: Locked Ether Detector
//!
//! @title V007 - Locked Ether
//! @author Ramprasad
//!
//! A contract that accepts Ether but never sends any out strands every wei
//! it receives. Flagged at contract level: a payable entrypoint exists but
//! no function in the unit performs a value transfer.

use super::utils::is_value_transfer;
use super::{create_finding, VulnerabilityDetector};
use crate::parser::{ContractKind, ContractUnit};
use crate::report::{Category, Finding, Severity};

/// Detector for contracts that accept value with no way to release it.
pub struct LockedEtherDetector;

impl VulnerabilityDetector for LockedEtherDetector {
    fn id(&self) -> &'static str {
        "V007"
    }

    fn name(&self) -> &'static str {
        "Locked Ether"
    }

    fn description(&self) -> &'static str {
        "Detects contracts with a payable entrypoint but no transfer, send, \
         or value-bearing call anywhere in the unit."
    }

    fn category(&self) -> Category {
        Category::LockedEther
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn remediation(&self) -> &'static str {
        "Add a withdrawal path guarded by access control, or remove the \
         payable entrypoints if the contract should not hold Ether."
    }

    fn detect(&self, unit: &ContractUnit) -> Vec<Finding> {
        if unit.kind != ContractKind::Contract {
            return Vec::new();
        }

        let accepts = unit.accepts_value();
        let sends = unit
            .functions
            .iter()
            .flat_map(|f| f.body.iter())
            .any(|s| is_value_transfer(&s.kind));

        if accepts && !sends {
            vec![create_finding(
                self,
                unit,
                None,
                format!("Contract `{}` can receive Ether but never releases it", unit.name),
                "At least one entrypoint is payable, but no function performs a \
                 transfer, send, or value-bearing call. Received Ether is locked \
                 permanently."
                    .to_string(),
                unit.line,
                None,
            )]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract_contracts;

    fn analyze(source: &str) -> Vec<Finding> {
        let (units, _) = extract_contracts(source, "test.sol");
        let detector = LockedEtherDetector;
        units.iter().flat_map(|u| detector.detect(u)).collect()
    }

    #[test]
    fn test_payable_without_withdrawal_is_flagged() {
        let source = r#"
            contract PiggyBank {
                uint256 public total;

                receive() external payable {
                    total += msg.value;
                }
            }
        "#;

        let findings = analyze(source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, Category::LockedEther);
        assert!(findings[0].function.is_none());
    }

    #[test]
    fn test_withdrawal_path_is_quiet() {
        let source = r#"
            contract PiggyBank {
                address public owner;

                receive() external payable {}

                function withdraw() public {
                    require(msg.sender == owner);
                    payable(owner).transfer(address(this).balance);
                }
            }
        "#;

        assert!(analyze(source).is_empty());
    }

    #[test]
    fn test_non_payable_contract_is_quiet() {
        let source = r#"
            contract Registry {
                mapping(address => string) public names;

                function register(string memory name) public {
                    names[msg.sender] = name;
                }
            }
        "#;

        assert!(analyze(source).is_empty());
    }
}
