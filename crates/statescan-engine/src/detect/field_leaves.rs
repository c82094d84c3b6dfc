//! Field-typed leaf detectors: instance fields whose declared type lands in
//! a catalogue category. Static fields of these types surface through the
//! static-state detector instead, so each field yields one finding.

use statescan_catalog::LeafCategory;
use statescan_graph::ClassShape;

use super::ScanContext;
use crate::report::{Finding, StateType};
use crate::risk::{assess, RiskInput};

pub(super) fn cache_fields(cx: &ScanContext<'_>) -> Vec<Finding> {
    scan(
        cx,
        "cache-state",
        LeafCategory::Cache,
        StateType::Cache,
        "in-process cache field",
        "Cached entries diverge between instances; use a shared cache or accept per-instance staleness explicitly",
    )
}

pub(super) fn thread_local_fields(cx: &ScanContext<'_>) -> Vec<Finding> {
    scan(
        cx,
        "thread-local",
        LeafCategory::ThreadLocal,
        StateType::ThreadLocal,
        "thread-local field",
        "Thread-affine state breaks when requests hop threads or instances; pass context explicitly",
    )
}

pub(super) fn resilience_fields(cx: &ScanContext<'_>) -> Vec<Finding> {
    scan(
        cx,
        "resilience-state",
        LeafCategory::Resilience,
        StateType::Resilience,
        "resilience component field",
        "Circuit-breaker and rate-limiter state is per-instance; coordinate via shared storage if global behavior is expected",
    )
}

pub(super) fn file_state_fields(cx: &ScanContext<'_>) -> Vec<Finding> {
    scan(
        cx,
        "file-state",
        LeafCategory::FileState,
        StateType::File,
        "local file handle field",
        "Local files are invisible to other instances; use object storage or a shared volume",
    )
}

pub(super) fn client_fields(cx: &ScanContext<'_>) -> Vec<Finding> {
    let mut findings = scan(
        cx,
        "service-client",
        LeafCategory::ServiceClient,
        StateType::Client,
        "long-lived service client field",
        "Connection state is per-instance; ensure the client tolerates scale-out and rebalancing",
    );
    findings.extend(scan(
        cx,
        "service-client",
        LeafCategory::Grpc,
        StateType::Client,
        "long-lived gRPC channel field",
        "Channel state is per-instance; ensure load balancing handles scale-out",
    ));
    findings
}

fn scan(
    cx: &ScanContext<'_>,
    detector_id: &'static str,
    category: LeafCategory,
    state_type: StateType,
    pattern: &str,
    recommendation: &str,
) -> Vec<Finding> {
    let mut shapes: Vec<&ClassShape> = cx.graph.project_classes().collect();
    shapes.sort_by(|a, b| a.fqn.cmp(&b.fqn));

    let mut findings = Vec::new();
    for shape in shapes {
        for field in &shape.fields {
            if field.is_static {
                continue;
            }
            let Some(type_fqn) = field.object_type() else {
                continue;
            };
            if !cx.catalog.matches_category(category, &type_fqn) {
                continue;
            }
            if cx.catalog.is_safe_type(&type_fqn) || cx.catalog.is_excluded_type(&type_fqn) {
                continue;
            }

            let risk = assess(&RiskInput {
                state_type: Some(state_type),
                category: Some(category),
                is_static: false,
                is_final: field.is_final,
                field_type: Some(&type_fqn),
                ..RiskInput::default()
            });

            let mut finding = Finding::new(
                shape.fqn.clone(),
                detector_id,
                state_type,
                risk,
                pattern,
            );
            finding.field_name = Some(field.name.clone());
            finding.field_type = Some(field.type_display());
            finding.source_file = shape.source_file.clone();
            finding.description = format!(
                "{}.{} holds {} state inside the process",
                finding.simple_class_name,
                field.name,
                finding.field_type.as_deref().unwrap_or("stateful")
            );
            finding.recommendation = recommendation.to_string();
            findings.push(finding);
        }
    }
    findings
}
