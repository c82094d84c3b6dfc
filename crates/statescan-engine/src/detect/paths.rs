//! Reachability-based detectors: a project root that can reach a leaf
//! category through field, invocation, inheritance, or DI edges depends on
//! that state even though it declares none of it.

use statescan_catalog::LeafCategory;

use super::ScanContext;
use crate::reach::ReachablePath;
use crate::report::{EdgeKind, Finding, RiskLevel, ScopeSource, StateType};
use crate::risk::{assess, RiskInput};

pub(super) fn external_state(cx: &ScanContext<'_>) -> Vec<Finding> {
    path_findings(
        cx,
        "external-state",
        LeafCategory::ExternalState,
        StateType::External,
        "reaches external state",
        "External connections and pools must be configured for concurrent instances (pool sizing, failover)",
    )
}

pub(super) fn cache_paths(cx: &ScanContext<'_>) -> Vec<Finding> {
    path_findings(
        cx,
        "cache-state",
        LeafCategory::Cache,
        StateType::Cache,
        "reaches in-process cache",
        "A cache reached through this dependency chain diverges between instances",
    )
}

pub(super) fn resilience_paths(cx: &ScanContext<'_>) -> Vec<Finding> {
    path_findings(
        cx,
        "resilience-state",
        LeafCategory::Resilience,
        StateType::Resilience,
        "reaches resilience state",
        "Breaker/limiter decisions made here are per-instance",
    )
}

pub(super) fn file_state_paths(cx: &ScanContext<'_>) -> Vec<Finding> {
    path_findings(
        cx,
        "file-state",
        LeafCategory::FileState,
        StateType::File,
        "reaches local file state",
        "Files written through this chain stay on one instance's disk",
    )
}

pub(super) fn client_paths(cx: &ScanContext<'_>) -> Vec<Finding> {
    let mut findings = path_findings(
        cx,
        "service-client",
        LeafCategory::ServiceClient,
        StateType::Client,
        "reaches long-lived service client",
        "Verify the client's connection state tolerates horizontal scaling",
    );
    findings.extend(path_findings(
        cx,
        "service-client",
        LeafCategory::Grpc,
        StateType::Client,
        "reaches gRPC channel",
        "Verify channel load balancing across scaled-out backends",
    ));
    findings
}

fn path_findings(
    cx: &ScanContext<'_>,
    detector_id: &'static str,
    category: LeafCategory,
    state_type: StateType,
    pattern: &str,
    recommendation: &str,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for path in cx.paths.iter().filter(|path| path.category == category) {
        findings.push(finding_for_path(
            path,
            detector_id,
            state_type,
            pattern,
            recommendation,
            cx,
        ));
        findings.extend(ambiguity_findings(cx, path));
    }
    findings
}

fn finding_for_path(
    path: &ReachablePath,
    detector_id: &'static str,
    state_type: StateType,
    pattern: &str,
    recommendation: &str,
    cx: &ScanContext<'_>,
) -> Finding {
    let risk = assess(&RiskInput {
        state_type: Some(state_type),
        category: Some(path.category),
        inferred: path.inferred,
        ..RiskInput::default()
    });

    let mut finding = Finding::new(path.root.clone(), detector_id, state_type, risk, pattern);
    finding.scope_source = if path.inferred {
        ScopeSource::Inferred
    } else if path
        .steps
        .iter()
        .any(|step| step.edge == Some(EdgeKind::DiBinding))
    {
        ScopeSource::DiBinding
    } else {
        ScopeSource::None
    };
    finding.scope_module = path.modules.first().cloned();
    finding.reachability_path = Some(path.steps.clone());
    finding.affected_endpoints = path.endpoints.clone();
    finding.source_file = cx
        .graph
        .get(&path.root)
        .and_then(|shape| shape.source_file.clone());
    finding.description = format!(
        "{} reaches {} in {} step{}",
        finding.simple_class_name,
        path.leaf,
        path.steps.len() - 1,
        if path.steps.len() == 2 { "" } else { "s" }
    );
    finding.recommendation = recommendation.to_string();
    finding
}

/// Interfaces with several implementations sitting on a kept path are worth
/// a note: the scanner picked no implementation, so the path may understate
/// what is reachable.
fn ambiguity_findings(cx: &ScanContext<'_>, path: &ReachablePath) -> Vec<Finding> {
    path.steps
        .iter()
        .filter(|step| cx.bindings.is_ambiguous(&step.class_fqn))
        .map(|step| {
            let mut finding = Finding::new(
                step.class_fqn.clone(),
                "ambiguous-binding",
                StateType::InMemory,
                RiskLevel::Info,
                "ambiguous binding on reachability path",
            );
            finding.description = format!(
                "{} has multiple implementations and no explicit binding; reachability through it is incomplete",
                finding.simple_class_name
            );
            finding.recommendation =
                "Declare an explicit binding so analysis (and injection) is unambiguous".to_string();
            finding
        })
        .collect()
}
