//! # Structural Extractor Module
//!
//! @title Solidity Structural Model Extractor
//! @author Ramprasad
//!
//! This module converts raw Solidity source text into the queryable
//! structural model the detector catalogs operate on: contracts, state
//! variables, functions, modifiers, and ordered statement sequences.
//!
//! Extraction is lexical and structural, not semantic: statements are
//! classified by syntactic shape (an external call is recognized by its
//! call-target form, a storage write by its left-hand side), and anything
//! unrecognized degrades to [`StatementKind::Other`] instead of failing.
//! The extractor is total: malformed input produces parse-warning findings,
//! never an error, and a broken contract does not block extraction of its
//! siblings in the same file.
//!
//! ## Submodules
//!
//! - [`contract_parser`] - Contract boundaries, state variables, modifiers
//! - [`statement_parser`] - Function bodies as ordered statement sequences
//!
//! ## Key Types
//!
//! - [`ContractUnit`] - One declared contract, immutable after extraction
//! - [`Function`] / [`Modifier`] / [`StateVariable`] - Declaration metadata
//! - [`Statement`] / [`StatementKind`] - Ordered, tagged body statements

mod contract_parser;
mod statement_parser;

pub use contract_parser::*;
pub use statement_parser::*;

use crate::report::{Category, Finding, Severity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recoverable problems encountered during extraction.
///
/// Every variant converts into an Informational [`Category::ParseWarning`]
/// finding; none of them aborts the scan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseIssue {
    /// A contract body ran to end of file without a closing brace.
    #[error("unbalanced braces in contract `{name}`; body truncated at end of file")]
    UnbalancedBraces { name: String, line: usize },

    /// A block comment ran to end of file.
    #[error("unterminated block comment starting at line {line}")]
    UnterminatedComment { line: usize },

    /// A function-like declaration whose signature could not be parsed.
    #[error("malformed function signature in contract `{contract}` at line {line}")]
    MalformedSignature { contract: String, line: usize },

    /// The file mentions a contract keyword but no declaration parsed.
    #[error("no parseable contract declaration found")]
    NoContractFound,
}

impl ParseIssue {
    /// Best-effort source line for the warning finding.
    pub fn line(&self) -> usize {
        match self {
            ParseIssue::UnbalancedBraces { line, .. } => *line,
            ParseIssue::UnterminatedComment { line } => *line,
            ParseIssue::MalformedSignature { line, .. } => *line,
            ParseIssue::NoContractFound => 1,
        }
    }

    /// Contract the warning is attributed to, if known.
    pub fn contract(&self) -> Option<&str> {
        match self {
            ParseIssue::UnbalancedBraces { name, .. } => Some(name),
            ParseIssue::MalformedSignature { contract, .. } => Some(contract),
            _ => None,
        }
    }
}

/// Kind of a top-level Solidity declaration unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractKind {
    /// A deployable `contract` (including `abstract contract`).
    Contract,

    /// An `interface` declaration (bodies are absent).
    Interface,

    /// A `library` declaration.
    Library,
}

/// Visibility of a function or state variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    External,
    Internal,
    Private,
}

/// State mutability of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateMutability {
    Pure,
    View,
    Payable,
    Nonpayable,
}

/// Mutability of a state variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarMutability {
    Constant,
    Immutable,
    Mutable,
}

/// Low-level call shape of an [`StatementKind::ExternalCall`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallKind {
    /// `<expr>.call{...}(...)`
    Call,

    /// `<expr>.delegatecall(...)`
    Delegatecall,

    /// `<expr>.staticcall(...)`
    Staticcall,

    /// `<expr>.transfer(amount)` - reverts on failure.
    Transfer,

    /// `<expr>.send(amount)` - returns a success flag.
    Send,
}

/// Tagged classification of one body statement.
///
/// The `Other` fallback preserves totality: inline assembly, emits without
/// state reads, and anything else unrecognized is carried opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    /// A call leaving the contract, recognized by call-target shape.
    ExternalCall {
        /// Receiver expression of the call.
        target: String,

        /// Value expression attached to the call, if any.
        value: Option<String>,

        /// Low-level call shape.
        kind: CallKind,

        /// Local variable the success flag is bound to, if any.
        bound_to: Option<String>,
    },

    /// Assignment whose left-hand side roots in a state variable.
    StorageWrite {
        /// Name of the written state variable.
        variable: String,
    },

    /// Statement that reads a state variable without writing one.
    StorageRead {
        /// Name of the first state variable read.
        variable: String,
    },

    /// `require(...)` or `assert(...)`.
    Require {
        /// Condition expression (first top-level argument).
        condition: String,

        /// Whether a string message argument is present.
        has_message: bool,
    },

    /// Assignment touching only locals.
    Assignment,

    /// `for`/`while`/`do` loop header; opens a loop region.
    LoopHeader,

    /// `return ...`.
    Return,

    /// Anything else, carried opaquely.
    Other,
}

/// One body statement in exact source order.
///
/// Source order is the primary signal for reentrancy and
/// checks-effects-interactions detection; nothing reorders this sequence
/// after extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Tagged classification.
    pub kind: StatementKind,

    /// Source line (1-indexed).
    pub line: usize,

    /// Lexical nesting depth under loop headers (0 = not in a loop).
    pub loop_depth: usize,

    /// Raw statement text, whitespace-normalized.
    pub raw: String,
}

/// A declared state variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateVariable {
    /// Variable name.
    pub name: String,

    /// Declared type as written.
    pub ty: String,

    /// Declared visibility (Solidity default is internal).
    pub visibility: Visibility,

    /// `constant`, `immutable`, or mutable.
    pub mutability: VarMutability,

    /// Whether the declaration carries an initializer.
    pub has_initializer: bool,

    /// Source line of the declaration.
    pub line: usize,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name (empty for unnamed parameters).
    pub name: String,

    /// Parameter type as written.
    pub ty: String,
}

/// A parsed function with signature metadata and ordered body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// Function name (empty for constructor/receive/fallback sugar names).
    pub name: String,

    /// Declared visibility.
    pub visibility: Visibility,

    /// State mutability.
    pub mutability: StateMutability,

    /// Applied modifier names, in application order.
    pub modifiers: Vec<String>,

    /// Declared parameters.
    pub params: Vec<Parameter>,

    /// Ordered statement sequence of the body.
    pub body: Vec<Statement>,

    /// Whether the body contains any external call.
    pub has_external_call: bool,

    /// Whether the body contains any loop header.
    pub has_loop: bool,

    /// Whether this is the constructor.
    pub is_constructor: bool,

    /// Whether this is a `receive` or `fallback` function.
    pub is_receive_or_fallback: bool,

    /// Declaration order within the contract.
    pub index: usize,

    /// Source line of the declaration.
    pub line: usize,
}

impl Function {
    /// Returns `true` for `view`/`pure` functions, which cannot mutate state.
    pub fn is_read_only(&self) -> bool {
        matches!(self.mutability, StateMutability::Pure | StateMutability::View)
    }

    /// Returns `true` if the function can receive Ether.
    pub fn is_payable(&self) -> bool {
        self.mutability == StateMutability::Payable
    }
}

/// A declared modifier with its parsed body.
///
/// Modifier bodies feed authorization-check reasoning: a modifier that
/// compares `msg.sender` and reverts on mismatch counts as a guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    /// Modifier name.
    pub name: String,

    /// Ordered statement sequence of the body.
    pub body: Vec<Statement>,

    /// Source line of the declaration.
    pub line: usize,
}

/// One declared contract unit, immutable once extraction completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractUnit {
    /// Contract name.
    pub name: String,

    /// Declaration kind.
    pub kind: ContractKind,

    /// Names of inherited contracts/interfaces.
    pub inherits: Vec<String>,

    /// State variables in declaration order.
    pub state_variables: Vec<StateVariable>,

    /// Functions in declaration order.
    pub functions: Vec<Function>,

    /// Modifiers in declaration order.
    pub modifiers: Vec<Modifier>,

    /// File identifier the unit was extracted from.
    pub file_path: String,

    /// Declaration order within the scan.
    pub order: usize,

    /// Source line of the declaration.
    pub line: usize,
}

impl ContractUnit {
    /// Returns `true` if the unit can receive Ether through any entrypoint
    /// (payable function, or payable receive/fallback).
    pub fn accepts_value(&self) -> bool {
        self.functions.iter().any(|f| f.is_payable())
    }

    /// Returns `true` if any function performs a value transfer to an
    /// address (`transfer`, `send`, or a `call` with attached value).
    pub fn sends_value(&self) -> bool {
        self.functions.iter().any(|f| {
            f.body.iter().any(|s| match &s.kind {
                StatementKind::ExternalCall { kind, value, .. } => match kind {
                    CallKind::Transfer | CallKind::Send => true,
                    CallKind::Call => value.is_some(),
                    _ => false,
                },
                _ => false,
            })
        })
    }

    /// Looks up a declared modifier by name.
    ///
    /// Modifiers referenced by name but not declared in this unit resolve
    /// to `None` and are treated as opaque by the detectors.
    pub fn find_modifier(&self, name: &str) -> Option<&Modifier> {
        self.modifiers.iter().find(|m| m.name == name)
    }

    /// Looks up a state variable by name.
    pub fn find_state_variable(&self, name: &str) -> Option<&StateVariable> {
        self.state_variables.iter().find(|v| v.name == name)
    }
}

/// Extracts all contract units from one source file.
///
/// This is the extractor half of the core's public interface. It never
/// fails: malformed fragments are reported through the returned parse
/// warnings, and extraction continues for sibling contracts.
///
/// # Arguments
///
/// * `source_text` - Raw Solidity source code
/// * `file_identifier` - Path or label used in findings
///
/// # Returns
///
/// The extracted units (declaration order preserved) and any parse-warning
/// findings produced along the way.
pub fn extract_contracts(source_text: &str, file_identifier: &str) -> (Vec<ContractUnit>, Vec<Finding>) {
    let (units, issues) = contract_parser::parse_source(source_text);

    let units: Vec<ContractUnit> = units
        .into_iter()
        .enumerate()
        .map(|(order, mut unit)| {
            unit.order = order;
            unit.file_path = file_identifier.to_string();
            unit
        })
        .collect();

    let warnings = issues
        .iter()
        .map(|issue| parse_warning_finding(issue, file_identifier, &units))
        .collect();

    (units, warnings)
}

/// Converts a [`ParseIssue`] into an Informational parse-warning finding.
fn parse_warning_finding(issue: &ParseIssue, file_identifier: &str, units: &[ContractUnit]) -> Finding {
    let contract = issue.contract().unwrap_or("<file>").to_string();
    let contract_order = units
        .iter()
        .find(|u| u.name == contract)
        .map(|u| u.order)
        .unwrap_or(usize::MAX);

    log::warn!("{}: {}", file_identifier, issue);

    Finding {
        id: format!("P001-{}-{}", contract, issue.line()),
        detector_id: "P001".to_string(),
        category: Category::ParseWarning,
        title: "Source fragment could not be fully parsed".to_string(),
        description: issue.to_string(),
        severity: Severity::Info,
        contract,
        function: None,
        file_path: file_identifier.to_string(),
        line: issue.line(),
        location: file_identifier.to_string(),
        code_snippet: None,
        remediation: "Verify the contract compiles with solc; analysis of the affected \
                      region is best-effort."
            .to_string(),
        cwe: None,
        estimated_savings: None,
        contract_order,
        function_order: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_contract() {
        let source = r#"
            pragma solidity ^0.8.0;

            contract Vault {
                address public owner;
                mapping(address => uint256) public balances;

                constructor() {
                    owner = msg.sender;
                }

                function deposit() public payable {
                    balances[msg.sender] += msg.value;
                }
            }
        "#;

        let (units, warnings) = extract_contracts(source, "Vault.sol");

        assert!(warnings.is_empty());
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name, "Vault");
        assert_eq!(units[0].state_variables.len(), 2);
        assert_eq!(units[0].functions.len(), 2);
        assert!(units[0].functions[0].is_constructor);
        assert!(units[0].accepts_value());
    }

    #[test]
    fn test_extraction_is_total_on_garbage() {
        let (units, warnings) = extract_contracts("contract {{{ ???", "garbage.sol");
        assert!(units.is_empty());
        assert!(!warnings.is_empty());
        assert_eq!(warnings[0].category, Category::ParseWarning);
    }

    #[test]
    fn test_broken_contract_does_not_block_sibling() {
        let source = "contract Broken { function f() public { \n\
                      contract Intact { uint256 public x; }";

        let (units, warnings) = extract_contracts(source, "multi.sol");
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].name, "Broken");
        assert_eq!(units[1].name, "Intact");
        assert_eq!(units[1].state_variables.len(), 1);
        assert!(warnings
            .iter()
            .any(|w| w.category == Category::ParseWarning && w.contract == "Broken"));
    }

    #[test]
    fn test_multiple_contracts_preserve_order() {
        let source = r#"
            contract First { uint256 public a; }
            interface ISecond { function f() external; }
            contract Third is First { uint256 public b; }
        "#;

        let (units, _) = extract_contracts(source, "multi.sol");
        assert_eq!(units.len(), 3);
        assert_eq!(units[0].name, "First");
        assert_eq!(units[1].name, "ISecond");
        assert_eq!(units[1].kind, ContractKind::Interface);
        assert_eq!(units[2].name, "Third");
        assert_eq!(units[2].inherits, vec!["First".to_string()]);
        assert_eq!(units[2].order, 2);
    }
}
