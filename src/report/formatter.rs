//! # Markdown Report Formatter
//!
//! @title Markdown Audit Report Renderer
//! @author Ramprasad
//!
//! Renders a [`Report`] as a self-contained Markdown audit document with an
//! executive summary, per-severity findings, and a gas optimization section.

use super::Report;

/// Renders the complete report as Markdown.
///
/// # Arguments
///
/// * `report` - The report model to render
///
/// # Returns
///
/// A Markdown document string.
pub fn to_markdown(report: &Report) -> String {
    let mut sections = Vec::new();

    sections.push(header(report));
    sections.push(executive_summary(report));
    sections.push(findings_section(report));
    sections.push(gas_section(report));
    sections.push(footer());

    sections.join("\n\n")
}

fn header(report: &Report) -> String {
    format!(
        "# Smart Contract Security Audit Report\n\n\
         **Scanned:** `{}`  \n\
         **Tool:** Solidity-Sentinel v{}  \n\
         **Files analyzed:** {}\n\n\
         ---",
        report.metadata.scanned_path, report.metadata.version, report.metadata.files_analyzed
    )
}

fn executive_summary(report: &Report) -> String {
    let s = &report.summary;

    let (risk, recommendation) = if s.critical > 0 {
        ("**CRITICAL RISK**", "Not recommended for production deployment")
    } else if s.high > 0 {
        ("**HIGH RISK**", "Requires immediate attention before deployment")
    } else if s.medium > 0 {
        ("**MEDIUM RISK**", "Address issues before production deployment")
    } else if s.low > 0 {
        ("**LOW RISK**", "Minor improvements recommended")
    } else {
        ("**MINIMAL RISK**", "No issues detected by the rule catalog")
    };

    format!(
        "## Executive Summary\n\n\
         ### Overall Risk Assessment\n\
         {}\n\n\
         **Deployment Recommendation:** {}\n\n\
         ### Findings Overview\n\n\
         | Severity | Count |\n\
         |----------|-------|\n\
         | Critical | {} |\n\
         | High | {} |\n\
         | Medium | {} |\n\
         | Low | {} |\n\
         | Informational | {} |\n\
         | **Total** | **{}** |",
        risk, recommendation, s.critical, s.high, s.medium, s.low, s.info, s.total
    )
}

fn findings_section(report: &Report) -> String {
    let security: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.estimated_savings.is_none())
        .collect();

    if security.is_empty() {
        return "## Security Findings\n\nNo security findings.".to_string();
    }

    let mut out = String::from("## Security Findings");

    for (i, finding) in security.iter().enumerate() {
        out.push_str(&format!(
            "\n\n### {}. {} {}\n\n\
             {}\n\n\
             **Category:** {}  \n\
             **Location:** `{}` line {}  \n",
            i + 1,
            finding.title,
            finding.severity.markdown_badge(),
            finding.description,
            finding.category,
            finding.location,
            finding.line
        ));

        if let Some(ref cwe) = finding.cwe {
            out.push_str(&format!("**Reference:** {}  \n", cwe));
        }

        if let Some(ref snippet) = finding.code_snippet {
            out.push_str(&format!("\n```solidity\n{}\n```\n", snippet));
        }

        out.push_str(&format!("\n**Remediation:**\n\n{}", finding.remediation));
    }

    out
}

fn gas_section(report: &Report) -> String {
    let gas: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.estimated_savings.is_some())
        .collect();

    if gas.is_empty() {
        return "## Gas Optimizations\n\nNo gas optimization opportunities found.".to_string();
    }

    let mut out = String::from(
        "## Gas Optimizations\n\n\
         | Location | Line | Issue | Estimated Savings |\n\
         |----------|------|-------|-------------------|",
    );

    for finding in &gas {
        out.push_str(&format!(
            "\n| `{}` | {} | {} | {} |",
            finding.location,
            finding.line,
            finding.title,
            finding.estimated_savings.as_deref().unwrap_or("-")
        ));
    }

    out.push_str("\n\nSee the remediation guidance in each finding for details.");
    out
}

fn footer() -> String {
    "---\n\n\
     *Generated by Solidity-Sentinel. Static analysis cannot prove the absence of \
     vulnerabilities; findings should be reviewed by a human auditor.*"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::super::{aggregate, Category, Finding, Severity};
    use super::*;

    fn finding(severity: Severity, savings: Option<&str>) -> Finding {
        Finding {
            id: "V001-Vault-10".to_string(),
            detector_id: "V001".to_string(),
            category: Category::Reentrancy,
            title: "External call before state update".to_string(),
            description: "Call precedes balance write.".to_string(),
            severity,
            contract: "Vault".to_string(),
            function: Some("withdraw".to_string()),
            file_path: "Vault.sol".to_string(),
            line: 10,
            location: "Vault::withdraw".to_string(),
            code_snippet: Some("msg.sender.call{value: amount}(\"\");".to_string()),
            remediation: "Apply checks-effects-interactions.".to_string(),
            cwe: Some("CWE-841".to_string()),
            estimated_savings: savings.map(|s| s.to_string()),
            contract_order: 0,
            function_order: Some(0),
        }
    }

    #[test]
    fn test_markdown_contains_summary_and_sections() {
        let report = aggregate(vec![finding(Severity::Critical, None)], Vec::new());
        let md = report.to_markdown();

        assert!(md.contains("# Smart Contract Security Audit Report"));
        assert!(md.contains("CRITICAL RISK"));
        assert!(md.contains("External call before state update"));
        assert!(md.contains("CWE-841"));
    }

    #[test]
    fn test_markdown_gas_table() {
        let report = aggregate(
            Vec::new(),
            vec![finding(Severity::Info, Some("~2100 gas per iteration"))],
        );
        let md = report.to_markdown();

        assert!(md.contains("## Gas Optimizations"));
        assert!(md.contains("~2100 gas per iteration"));
    }
}
