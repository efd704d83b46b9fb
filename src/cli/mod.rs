//! # CLI Module
//!
//! @title Command Line Interface
//! @author Ramprasad
//!
//! This module defines the command-line interface for Solidity-Sentinel
//! using the `clap` derive macros for declarative argument parsing.
//!
//! ## Commands
//!
//! - `scan` - Analyze Solidity contracts for vulnerabilities and gas issues
//! - `list` - Display available detectors
//! - `version` - Show version information

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Solidity-Sentinel command-line interface.
///
/// A static analysis security scanner for Solidity smart contracts.
/// Detects common vulnerability patterns and gas inefficiencies and
/// renders severity-ranked audit reports.
#[derive(Parser, Debug)]
#[command(name = "solidity-sentinel")]
#[command(author = "RamprasadGoud")]
#[command(version)]
#[command(about = "Static analysis security scanner for Solidity smart contracts")]
#[command(long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the Solidity-Sentinel CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan Solidity contracts for security and gas issues.
    ///
    /// Analyzes `.sol` files for common security issues including
    /// reentrancy, missing access control, tx.origin authentication,
    /// and more, plus gas optimization opportunities.
    ///
    /// Exits with a non-zero status when any Critical or High severity
    /// finding is present, for CI gating.
    Scan {
        /// Path to the file or directory to scan.
        ///
        /// If a directory is specified, all `.sol` files within it will be
        /// analyzed.
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Scan directories recursively.
        ///
        /// When enabled, subdirectories will also be searched for Solidity
        /// source files.
        #[arg(short, long, default_value_t = true)]
        recursive: bool,

        /// Output format for the report.
        ///
        /// Supported formats:
        /// - `terminal`: Colorized console output (default)
        /// - `json`: Machine-readable JSON format
        /// - `markdown`: Human-readable Markdown audit report
        /// - `github`: GitHub Actions annotations
        #[arg(short, long, default_value = "terminal")]
        format: String,

        /// Output directory for rendered reports.
        ///
        /// If not specified, reports are printed to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum severity level to include in results.
        ///
        /// Valid values: critical, high, medium, low, info
        #[arg(short, long)]
        severity: Option<String>,

        /// Exclude specific detectors from the scan.
        ///
        /// Comma-separated list of detector IDs to skip.
        /// Example: --exclude V005,G002
        #[arg(short = 'x', long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// Include only specific detectors in the scan.
        ///
        /// Comma-separated list of detector IDs to run.
        /// Example: --only V001,V002,V003
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
    },

    /// List all available detectors.
    ///
    /// Displays the ID, name, severity, and description of each
    /// registered security detector and gas rule.
    List,

    /// Print version information.
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    /// Verify that the CLI definition is valid.
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
