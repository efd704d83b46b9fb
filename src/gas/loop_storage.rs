//! # G001: Storage Access In Loop
//!
//! @title G001 - Storage Variable Accessed Inside Loop
//! @author Ramprasad
//!
//! Every storage slot read costs ~2100 gas after EIP-2929. A state variable
//! touched on each loop iteration should be cached in memory before the
//! loop and written back once after it.

use super::{create_gas_finding, GasDetector};
use crate::parser::{contains_word, ContractUnit, StatementKind};
use crate::report::{Category, Finding, Severity};

/// Rule flagging state variables accessed inside loop regions.
pub struct LoopStorageDetector;

impl GasDetector for LoopStorageDetector {
    fn id(&self) -> &'static str {
        "G001"
    }

    fn name(&self) -> &'static str {
        "Storage Access In Loop"
    }

    fn description(&self) -> &'static str {
        "Detects state variables read or written inside loop bodies, where \
         each access pays the full storage cost per iteration."
    }

    fn category(&self) -> Category {
        Category::GasLoopStorageRead
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn estimated_savings(&self) -> &'static str {
        "~2100 gas per iteration"
    }

    fn remediation(&self) -> &'static str {
        "Cache the storage value in a memory variable before the loop and \
         write it back once after the loop completes."
    }

    fn detect(&self, unit: &ContractUnit) -> Vec<Finding> {
        let mut findings = Vec::new();

        for function in &unit.functions {
            if !function.has_loop {
                continue;
            }

            let mut flagged: Vec<&str> = Vec::new();

            for stmt in &function.body {
                if stmt.loop_depth == 0 || matches!(stmt.kind, StatementKind::LoopHeader) {
                    continue;
                }

                for var in &unit.state_variables {
                    if flagged.contains(&var.name.as_str()) {
                        continue;
                    }
                    if contains_word(&stmt.raw, &var.name) {
                        flagged.push(&var.name);
                        findings.push(create_gas_finding(
                            self,
                            unit,
                            Some(function),
                            format!("Storage variable `{}` accessed inside loop", var.name),
                            format!(
                                "`{}` touches storage variable `{}` on every iteration of \
                                 the loop at line {}.",
                                function.name, var.name, stmt.line
                            ),
                            stmt.line,
                            Some(stmt.raw.clone()),
                        ));
                    }
                }
            }
        }

        findings
    }
}
