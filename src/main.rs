//! # Solidity-Sentinel CLI Entry Point
//!
//! @title Solidity-Sentinel CLI
//! @author Ramprasad
//!
//! This module provides the main entry point for the Solidity-Sentinel
//! command-line security scanner. All detection logic lives in the
//! library; this layer only collects files, invokes the core, and renders
//! the report model.

use anyhow::Result;
use clap::Parser;
use colored::*;
use solidity_sentinel::report::Report;
use solidity_sentinel::{build_report, Cli, ContractUnit, DetectorRegistry, Finding, GasRegistry, Severity};
use std::path::{Path, PathBuf};

/// ASCII art banner displayed at startup.
const BANNER: &str = r#"
  ____        _ _     _ _ _           ____             _   _            _
 / ___|  ___ | (_) __| (_) |_ _   _  / ___|  ___ _ __ | |_(_)_ __   ___| |
 \___ \ / _ \| | |/ _` | | __| | | | \___ \ / _ \ '_ \| __| | '_ \ / _ \ |
  ___) | (_) | | | (_| | | |_| |_| |  ___) |  __/ | | | |_| | | | |  __/ |
 |____/ \___/|_|_|\__,_|_|\__|\__, | |____/ \___|_| |_|\__|_|_| |_|\___|_|
                              |___/
               Solidity Smart Contract Security Scanner
"#;

/// Application entry point.
///
/// Initializes the logging system, displays the banner, parses command-line
/// arguments, and dispatches to the appropriate command handler.
///
/// # Returns
///
/// Returns `Ok(())` on successful execution, or an error if any operation
/// fails. The process exits non-zero when a scan reports Critical or High
/// findings.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("{}", BANNER.cyan().bold());

    let cli = Cli::parse();

    match cli.command {
        solidity_sentinel::cli::Commands::Scan {
            path,
            recursive,
            format,
            output,
            severity,
            exclude,
            only,
        } => {
            run_scan(path, recursive, format, output, severity, exclude, only)?;
        }
        solidity_sentinel::cli::Commands::List => {
            list_detectors();
        }
        solidity_sentinel::cli::Commands::Version => {
            println!(
                "{} {}",
                "Solidity-Sentinel version:".green(),
                env!("CARGO_PKG_VERSION").yellow()
            );
        }
    }

    Ok(())
}

/// Executes the scan operation.
///
/// This function orchestrates the complete scanning workflow:
/// 1. Collects Solidity source files from the specified path
/// 2. Extracts every file into contract units (parse warnings included)
/// 3. Runs both rule catalogs and aggregates the report
/// 4. Applies severity and detector filters
/// 5. Renders the report in the requested format
/// 6. Exits non-zero when Critical/High findings remain
#[allow(clippy::too_many_arguments)]
fn run_scan(
    path: PathBuf,
    recursive: bool,
    format: String,
    output: Option<PathBuf>,
    min_severity: Option<String>,
    exclude: Vec<String>,
    only: Vec<String>,
) -> Result<()> {
    println!(
        "{} {}",
        "[*] Scanning:".green().bold(),
        path.display().to_string().yellow()
    );

    let (units, warnings) = extract_path(&path, recursive)?;

    if units.is_empty() && warnings.is_empty() {
        println!("{}", "[!] No Solidity contracts found.".yellow());
        return Ok(());
    }

    let report = build_report(&units, warnings);
    let report = apply_filters(report, &path, min_severity, &exclude, &only);

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "markdown" => {
            let md = report.to_markdown();
            if let Some(ref out_path) = output {
                std::fs::create_dir_all(out_path)?;
                let report_path = out_path.join("security_report.md");
                std::fs::write(&report_path, &md)?;
                println!(
                    "{} {}",
                    "[+] Report saved to:".green(),
                    report_path.display().to_string().yellow()
                );
            } else {
                println!("{}", md);
            }
        }
        "github" => {
            // Print GitHub Actions annotations
            // Format: ::error file={name},line={line},title={title}::{message}
            for finding in &report.findings {
                let level = match finding.severity {
                    Severity::Critical | Severity::High => "error",
                    Severity::Medium => "warning",
                    _ => "notice",
                };

                println!(
                    "::{} file={},line={},title={}::{}",
                    level, finding.file_path, finding.line, finding.title, finding.description
                );
            }
        }
        _ => {
            report.print_terminal();
        }
    }

    println!("\n{}", "=".repeat(60).cyan());
    report.print_summary();

    if report.has_blocking_findings() {
        std::process::exit(1);
    }

    Ok(())
}

/// Extracts every Solidity file under `path` into one unit list with a
/// single global declaration order.
fn extract_path(path: &Path, recursive: bool) -> Result<(Vec<ContractUnit>, Vec<Finding>)> {
    use indicatif::{ProgressBar, ProgressStyle};
    use solidity_sentinel::parser::extract_contracts;

    let files = if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        collect_solidity_files(path, recursive)?
    };

    if files.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut all_units = Vec::new();
    let mut all_warnings = Vec::new();

    for file_path in &files {
        pb.set_message(format!(
            "Analyzing {}",
            file_path.file_name().unwrap_or_default().to_string_lossy()
        ));

        match std::fs::read_to_string(file_path) {
            Ok(source) => {
                let identifier = file_path.display().to_string();
                let (mut units, mut warnings) = extract_contracts(&source, &identifier);

                // Renumber into one scan-wide declaration order so the
                // aggregator's tie-breaking stays deterministic across files.
                let offset = all_units.len();
                for unit in &mut units {
                    unit.order += offset;
                }
                for warning in &mut warnings {
                    if warning.contract_order != usize::MAX {
                        warning.contract_order += offset;
                    }
                }

                all_units.extend(units);
                all_warnings.extend(warnings);
            }
            Err(e) => {
                log::warn!("Failed to read {}: {}", file_path.display(), e);
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok((all_units, all_warnings))
}

/// Applies severity and detector-id filters, rebuilding the report with the
/// scanned path recorded in its metadata.
fn apply_filters(
    report: Report,
    path: &Path,
    min_severity: Option<String>,
    exclude: &[String],
    only: &[String],
) -> Report {
    let mut findings = report.findings;

    if let Some(ref min_sev) = min_severity {
        let min = Severity::from_str(min_sev);
        findings.retain(|f| f.severity >= min);
    }

    if !exclude.is_empty() {
        let exclude_upper: Vec<String> = exclude.iter().map(|s| s.to_uppercase()).collect();
        findings.retain(|f| !exclude_upper.contains(&f.detector_id.to_uppercase()));
    }

    if !only.is_empty() {
        let only_upper: Vec<String> = only.iter().map(|s| s.to_uppercase()).collect();
        findings.retain(|f| only_upper.contains(&f.detector_id.to_uppercase()));
    }

    Report::new(findings, path.display().to_string())
}

/// Collects Solidity source files from a directory.
///
/// Traverses the specified directory and collects all `.sol` files,
/// excluding anything under `node_modules`.
fn collect_solidity_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    use walkdir::WalkDir;

    let walker = if recursive {
        WalkDir::new(dir)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path().extension().map_or(false, |ext| ext == "sol")
                && !e.path().to_string_lossy().contains("node_modules")
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    Ok(files)
}

/// Displays all available detectors and gas rules.
///
/// Prints a formatted list of registered detectors including their
/// IDs, names, severity levels, and descriptions.
fn list_detectors() {
    let registry = DetectorRegistry::new();

    println!("{}", "[*] Available Security Detectors:".green().bold());
    println!("{}", "-".repeat(60).cyan());

    for detector in registry.detectors() {
        println!(
            "  {} {} [{}]",
            detector.id().cyan().bold(),
            detector.name().white(),
            detector.severity().to_string().yellow()
        );
        println!("     {}", detector.description().dimmed());
        println!();
    }

    let gas_registry = GasRegistry::new();

    println!("{}", "[*] Available Gas Rules:".green().bold());
    println!("{}", "-".repeat(60).cyan());

    for rule in gas_registry.detectors() {
        println!(
            "  {} {} [{}]",
            rule.id().cyan().bold(),
            rule.name().white(),
            rule.severity().to_string().yellow()
        );
        println!("     {}", rule.description().dimmed());
        println!();
    }
}
