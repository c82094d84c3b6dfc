//! Report renderers. All three formats are views of the same `ScanReport`.

use std::fmt::Write as _;

use anyhow::Result;
use statescan_engine::{Finding, RiskLevel, ScanReport};

pub fn render_json(report: &ScanReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render_console(report: &ScanReport) -> String {
    let mut out = String::new();
    let meta = &report.metadata;
    let _ = writeln!(out, "State-Scan report for {}", meta.project_path);
    let _ = writeln!(
        out,
        "  {} classes, {} archives, {} ms",
        meta.classes_scanned, meta.archives_scanned, meta.duration_ms
    );
    let _ = writeln!(
        out,
        "  findings: {} critical, {} high, {} medium, {} low, {} info ({} total)",
        report.summary.critical,
        report.summary.high,
        report.summary.medium,
        report.summary.low,
        report.summary.info,
        report.summary.total
    );

    if report.findings.is_empty() {
        let _ = writeln!(out, "\nNo scaling-hostile state found.");
        return out;
    }

    for class in &report.class_summaries {
        let _ = writeln!(
            out,
            "\n[{}] {} ({} finding{})",
            class.highest_risk.name(),
            class.class_fqn,
            class.finding_count,
            if class.finding_count == 1 { "" } else { "s" }
        );
        for finding in report
            .findings
            .iter()
            .filter(|f| f.class_fqn == class.class_fqn)
        {
            render_console_finding(&mut out, finding);
        }
    }
    out
}

fn render_console_finding(out: &mut String, finding: &Finding) {
    match (&finding.field_name, &finding.field_type) {
        (Some(name), Some(ty)) => {
            let _ = writeln!(
                out,
                "  - {} {}: {} ({})",
                finding.risk_level.name(),
                name,
                finding.pattern,
                ty
            );
        }
        _ => {
            let _ = writeln!(out, "  - {} {}", finding.risk_level.name(), finding.pattern);
        }
    }
    if let Some(steps) = &finding.reachability_path {
        let chain: Vec<&str> = steps.iter().map(|s| s.class_fqn.as_str()).collect();
        let _ = writeln!(out, "      path: {}", chain.join(" -> "));
    }
    for endpoint in &finding.affected_endpoints {
        let _ = writeln!(out, "      endpoint: {endpoint}");
    }
    let _ = writeln!(out, "      {}", finding.recommendation);
}

pub fn render_html(report: &ScanReport) -> String {
    let mut rows = String::new();
    for finding in &report.findings {
        let _ = write!(
            rows,
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            finding.risk_level.name().to_ascii_lowercase(),
            finding.risk_level.name(),
            escape(&finding.class_fqn),
            escape(finding.field_name.as_deref().unwrap_or("—")),
            escape(finding.field_type.as_deref().unwrap_or("—")),
            escape(&finding.pattern),
            escape(&finding.recommendation),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>State-Scan report — {project}</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border: 1px solid #ccc; padding: 0.4rem 0.6rem; text-align: left; }}
tr.critical td:first-child {{ color: #fff; background: #b00020; }}
tr.high td:first-child {{ background: #ffd54f; }}
tr.medium td:first-child {{ background: #e0e0e0; }}
.summary span {{ margin-right: 1.2rem; }}
</style>
</head>
<body>
<h1>State-Scan report</h1>
<p>{project} — scanned {date}, {classes} classes in {duration} ms</p>
<p class="summary">
<span>CRITICAL: {critical}</span><span>HIGH: {high}</span><span>MEDIUM: {medium}</span>
<span>LOW: {low}</span><span>INFO: {info}</span><span>total: {total}</span>
</p>
<table>
<thead><tr><th>Risk</th><th>Class</th><th>Field</th><th>Type</th><th>Pattern</th><th>Recommendation</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
</body>
</html>
"#,
        project = escape(&report.metadata.project_path),
        date = escape(&report.metadata.scan_date),
        classes = report.metadata.classes_scanned,
        duration = report.metadata.duration_ms,
        critical = report.summary.critical,
        high = report.summary.high,
        medium = report.summary.medium,
        low = report.summary.low,
        info = report.summary.info,
        total = report.summary.total,
        rows = rows,
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Highest-severity-aware exit code: 0 clean, 2 when the gate trips.
pub fn exit_code_for(report: &ScanReport, fail_on: Option<RiskLevel>) -> i32 {
    match fail_on {
        Some(gate) if report.exceeds_gate(gate) => 2,
        _ => 0,
    }
}
