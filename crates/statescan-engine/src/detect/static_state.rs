//! Static mutable state: the canonical horizontal-scaling hazard.

use statescan_graph::{ClassShape, FieldShape};

use super::ScanContext;
use crate::report::{Finding, StateType};
use crate::risk::{assess, RiskInput};

pub(super) fn run(cx: &ScanContext<'_>) -> Vec<Finding> {
    let mut shapes: Vec<&ClassShape> = cx.graph.project_classes().collect();
    shapes.sort_by(|a, b| a.fqn.cmp(&b.fqn));

    let mut findings = Vec::new();
    for shape in shapes {
        for field in &shape.fields {
            if !field.is_static_mutable() || field.is_logger() {
                continue;
            }
            if is_enum_machinery(shape, field) {
                continue;
            }

            let type_fqn = field.object_type();
            if let Some(type_fqn) = &type_fqn {
                if cx.catalog.is_safe_type(type_fqn) || cx.catalog.is_excluded_type(type_fqn) {
                    continue;
                }
            }

            let state_type = match type_fqn.as_deref() {
                Some(t) if cx.catalog.is_thread_local_type(t) => StateType::ThreadLocal,
                Some(t) if cx.catalog.is_cache_type(t) => StateType::Cache,
                _ => StateType::InMemory,
            };
            let risk = assess(&RiskInput {
                state_type: Some(state_type),
                is_static: true,
                is_final: field.is_final,
                is_mutable_collection: type_fqn
                    .as_deref()
                    .is_some_and(|t| cx.catalog.is_mutable_collection_type(t)),
                field_type: type_fqn.as_deref(),
                ..RiskInput::default()
            });

            let pattern = match (field.is_final, state_type) {
                (false, _) => "non-final static field",
                (true, StateType::Cache) => "static cache field",
                (true, StateType::ThreadLocal) => "static thread-local field",
                (true, _) => "mutable static field",
            };

            let mut finding = Finding::new(
                shape.fqn.clone(),
                "static-state",
                state_type,
                risk,
                pattern,
            );
            finding.field_name = Some(field.name.clone());
            finding.field_type = Some(field.type_display());
            finding.source_file = shape.source_file.clone();
            finding.description = format!(
                "{}.{} is process-wide mutable state; every instance of the service keeps its own copy",
                finding.simple_class_name, field.name
            );
            finding.recommendation = match state_type {
                StateType::Cache => {
                    "Move the cache to a shared store (e.g. Redis) or make entries derivable per request".to_string()
                }
                StateType::ThreadLocal => {
                    "Replace the thread-local slot with request-scoped context passing".to_string()
                }
                _ => "Externalize the state or scope it to a single request".to_string(),
            };
            findings.push(finding);
        }
    }
    findings
}

/// Compiler-generated enum plumbing: the `$VALUES` array and the enum
/// constants themselves are immutable-by-convention and never findings.
fn is_enum_machinery(shape: &ClassShape, field: &FieldShape) -> bool {
    if !shape.is_enum {
        return false;
    }
    if field.name == "$VALUES" || field.name == "ENUM$VALUES" {
        return true;
    }
    field
        .object_type()
        .is_some_and(|type_fqn| type_fqn == shape.fqn)
}
