//! Singleton-scoped classes holding mutable instance fields: one shared
//! instance per process means those fields are process-wide state.

use std::collections::BTreeSet;

use statescan_graph::ClassShape;

use super::ScanContext;
use crate::report::{Finding, RiskLevel, ScopeSource, StateType};

pub(super) fn run(cx: &ScanContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut reported: BTreeSet<(String, String)> = BTreeSet::new();

    let mut shapes: Vec<&ClassShape> = cx.graph.project_classes().collect();
    shapes.sort_by(|a, b| a.fqn.cmp(&b.fqn));

    // Annotation-scoped singletons take precedence over DI-scoped ones in
    // attribution; the dedup set keeps one finding per (class, field).
    for shape in &shapes {
        let Some(annotation) = shape
            .annotations
            .iter()
            .find(|ann| cx.catalog.is_singleton_annotation(ann))
        else {
            continue;
        };
        emit_for_class(
            cx,
            shape,
            ScopeSource::Annotation,
            Some(annotation.clone()),
            None,
            &mut reported,
            &mut findings,
        );
    }

    for (target, module) in cx.bindings.singleton_targets() {
        let Some(shape) = cx.graph.get(target) else {
            continue;
        };
        if !shape.is_project_local {
            continue;
        }
        emit_for_class(
            cx,
            shape,
            ScopeSource::DiBinding,
            None,
            module.map(str::to_string),
            &mut reported,
            &mut findings,
        );
    }

    findings
}

fn emit_for_class(
    cx: &ScanContext<'_>,
    shape: &ClassShape,
    scope_source: ScopeSource,
    scope_annotation: Option<String>,
    scope_module: Option<String>,
    reported: &mut BTreeSet<(String, String)>,
    findings: &mut Vec<Finding>,
) {
    for field in &shape.fields {
        if !field.is_potentially_mutable() || field.is_logger() {
            continue;
        }
        if let Some(type_fqn) = field.object_type() {
            if cx.catalog.is_safe_type(&type_fqn) || cx.catalog.is_excluded_type(&type_fqn) {
                continue;
            }
        }
        if !reported.insert((shape.fqn.clone(), field.name.clone())) {
            continue;
        }

        let mut finding = Finding::new(
            shape.fqn.clone(),
            "singleton-state",
            StateType::Singleton,
            RiskLevel::High,
            "singleton holding mutable field",
        );
        finding.field_name = Some(field.name.clone());
        finding.field_type = Some(field.type_display());
        finding.source_file = shape.source_file.clone();
        finding.scope_source = scope_source;
        finding.scope_annotation = scope_annotation.clone();
        finding.scope_module = scope_module.clone();
        finding.description = format!(
            "{} is singleton-scoped, so instance field {} lives for the whole process",
            finding.simple_class_name, field.name
        );
        finding.recommendation =
            "Make the field immutable, request-scoped, or backed by shared storage".to_string();
        findings.push(finding);
    }
}
