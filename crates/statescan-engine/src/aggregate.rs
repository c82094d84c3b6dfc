//! Post-detector aggregation: user exclusion, dedup, severity filtering,
//! per-class roll-ups, and report summary counts.

use std::collections::{BTreeMap, HashSet};

use statescan_catalog::Catalog;
use tracing::debug;

use crate::report::{ClassSummary, Finding, RiskLevel, ScanSummary};

#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateOptions {
    /// Findings below this severity are suppressed from the report.
    pub risk_threshold: Option<RiskLevel>,
}

pub struct Aggregated {
    pub findings: Vec<Finding>,
    pub class_summaries: Vec<ClassSummary>,
    pub summary: ScanSummary,
}

pub fn aggregate(
    mut findings: Vec<Finding>,
    catalog: &Catalog,
    options: &AggregateOptions,
) -> Aggregated {
    let before = findings.len();

    // Phase 1: user exclusion on the primary type of the finding.
    findings.retain(|finding| !is_excluded(finding, catalog));

    // Phase 2: dedup by (detector, class, field-or-pattern, leaf).
    let mut seen: HashSet<(String, String, String, Option<String>)> = HashSet::new();
    findings.retain(|finding| {
        seen.insert((
            finding.detector_id.to_string(),
            finding.class_fqn.clone(),
            finding
                .field_name
                .clone()
                .unwrap_or_else(|| finding.pattern.clone()),
            finding.leaf_fqn().map(str::to_string),
        ))
    });

    if let Some(threshold) = options.risk_threshold {
        findings.retain(|finding| finding.risk_level.at_least(threshold));
    }

    findings.sort_by(|a, b| {
        (a.risk_level, &a.class_fqn, &a.field_name, a.detector_id).cmp(&(
            b.risk_level,
            &b.class_fqn,
            &b.field_name,
            b.detector_id,
        ))
    });

    let mut summary = ScanSummary::default();
    for finding in &findings {
        summary.count(finding.risk_level);
    }

    let class_summaries = summarize_classes(&findings);
    debug!(
        before,
        after = findings.len(),
        classes = class_summaries.len(),
        "findings aggregated"
    );

    Aggregated {
        findings,
        class_summaries,
        summary,
    }
}

fn is_excluded(finding: &Finding, catalog: &Catalog) -> bool {
    if let Some(field_type) = &finding.field_type {
        if catalog.is_excluded_type(field_type.trim_end_matches("[]")) {
            return true;
        }
    }
    if let Some(leaf) = finding.leaf_fqn() {
        if catalog.is_excluded_type(leaf) {
            return true;
        }
    }
    false
}

/// Group findings per class: unique fields at their highest severity,
/// classes ordered by severity ascending (CRITICAL first) then finding
/// count descending.
fn summarize_classes(findings: &[Finding]) -> Vec<ClassSummary> {
    let mut by_class: BTreeMap<&str, Vec<&Finding>> = BTreeMap::new();
    for finding in findings {
        by_class.entry(&finding.class_fqn).or_default().push(finding);
    }

    let mut summaries: Vec<ClassSummary> = by_class
        .into_iter()
        .map(|(class_fqn, class_findings)| {
            let highest_risk = class_findings
                .iter()
                .map(|f| f.risk_level)
                .min()
                .expect("non-empty group");

            let mut fields: BTreeMap<&str, RiskLevel> = BTreeMap::new();
            for finding in &class_findings {
                if let Some(field) = &finding.field_name {
                    let slot = fields.entry(field).or_insert(finding.risk_level);
                    *slot = (*slot).min(finding.risk_level);
                }
            }

            ClassSummary {
                class_fqn: class_fqn.to_string(),
                highest_risk,
                finding_count: class_findings.len(),
                fields: fields
                    .into_iter()
                    .map(|(name, risk)| (name.to_string(), risk))
                    .collect(),
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        a.highest_risk
            .cmp(&b.highest_risk)
            .then(b.finding_count.cmp(&a.finding_count))
            .then(a.class_fqn.cmp(&b.class_fqn))
    });
    summaries
}
