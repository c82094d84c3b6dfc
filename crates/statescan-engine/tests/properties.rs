//! Cross-cutting properties of the pipeline, checked on a representative
//! synthesized project rather than per-scenario expectations.

use std::path::Path;

use statescan_catalog::{Catalog, CatalogDocument};
use statescan_classfile::assembler::{ClassBuilder, MethodDef, Op};
use statescan_classfile::access;
use statescan_engine::{run_scan, EdgeKind, ScanOptions, ScanReport};
use statescan_graph::ResolvedClasspath;
use tempfile::TempDir;

/// A project with a few interlocking classes: static state, DI edges,
/// inheritance, and an invocation chain.
fn build_project(tmp: &TempDir) -> ResolvedClasspath {
    let classes_dir = tmp.path().join("classes");
    std::fs::create_dir_all(&classes_dir).unwrap();
    let write = |internal: &str, bytes: Vec<u8>| {
        let path = classes_dir.join(format!("{internal}.class"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    };

    write(
        "com/example/Registry",
        ClassBuilder::new("com/example/Registry")
            .field(
                access::PRIVATE | access::STATIC | access::FINAL,
                "ENTRIES",
                "Ljava/util/HashMap;",
            )
            .field(access::PRIVATE | access::STATIC, "counter", "I")
            .build(),
    );
    write(
        "com/example/BasePool",
        ClassBuilder::new("com/example/BasePool")
            .access_flags(access::PUBLIC | access::ABSTRACT)
            .build(),
    );
    write(
        "com/example/Pool",
        ClassBuilder::new("com/example/Pool")
            .super_class("com/example/BasePool")
            .build(),
    );
    write(
        "com/example/Service",
        ClassBuilder::new("com/example/Service")
            .method(
                MethodDef::new(access::PUBLIC, "<init>", "(Lcom/example/Pool;)V")
                    .annotated("Ljavax/inject/Inject;"),
            )
            .method(MethodDef::new(access::PUBLIC, "work", "()V").body(vec![
                Op::invoke_static("com/example/Registry", "touch", "()V"),
            ]))
            .build(),
    );

    ResolvedClasspath {
        project_classes_dirs: vec![classes_dir],
        dependency_archives: Vec::new(),
        detected_package_prefix: None,
    }
}

fn catalog_with_pool_leaf() -> Catalog {
    let mut catalog = Catalog::default();
    catalog.merge(CatalogDocument {
        external_state_types: vec!["com.example.BasePool".to_string()],
        ..CatalogDocument::default()
    });
    catalog
}

fn scan(classpath: &ResolvedClasspath, catalog: &Catalog) -> ScanReport {
    run_scan(
        Path::new("prop-project"),
        classpath,
        catalog,
        &ScanOptions::default(),
    )
    .unwrap()
}

#[test]
fn static_state_findings_reference_real_static_fields() {
    let tmp = TempDir::new().unwrap();
    let classpath = build_project(&tmp);
    let report = scan(&classpath, &catalog_with_pool_leaf());

    let built = statescan_graph::build_graph(&classpath).unwrap();
    for finding in report
        .findings
        .iter()
        .filter(|f| f.detector_id == "static-state")
    {
        let shape = built
            .graph
            .get(&finding.class_fqn)
            .expect("finding references a graph class");
        let field_name = finding.field_name.as_deref().expect("field name present");
        let field = shape
            .fields
            .iter()
            .find(|f| f.name == field_name)
            .expect("finding references an existing field");
        assert!(field.is_static);
    }
}

#[test]
fn paths_are_connected_and_end_at_leaf_subtypes() {
    let tmp = TempDir::new().unwrap();
    let classpath = build_project(&tmp);
    let catalog = catalog_with_pool_leaf();
    let report = scan(&classpath, &catalog);

    let built = statescan_graph::build_graph(&classpath).unwrap();
    let path_findings: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.reachability_path.is_some())
        .collect();
    assert!(!path_findings.is_empty(), "expected at least one path finding");

    for finding in path_findings {
        let steps = finding.reachability_path.as_ref().unwrap();
        assert!(steps.len() >= 2);

        // The root is project-local.
        let root = built.graph.get(&steps[0].class_fqn).unwrap();
        assert!(root.is_project_local);

        // Every non-final step names the member and edge kind that leads to
        // its successor.
        for window in steps.windows(2) {
            let (from, to) = (&window[0], &window[1]);
            let member = from.member.as_deref().expect("outgoing member");
            let edge = from.edge.expect("outgoing edge kind");
            let shape = built.graph.get(&from.class_fqn).unwrap();
            match edge {
                EdgeKind::Field => {
                    assert!(shape.fields.iter().any(|f| f.name == member));
                }
                EdgeKind::Inheritance => {
                    assert!(member == "extends" || member == "implements");
                }
                EdgeKind::Invocation => {
                    // The member is the invoked method, named on the callee.
                    assert!(!member.is_empty());
                }
                EdgeKind::DiBinding => {
                    assert!(shape.methods.iter().any(|m| m.name == member));
                }
            }
            assert!(built.graph.contains(&to.class_fqn));
        }

        // The last step carries no outgoing edge and is a (reflexive)
        // subtype of a configured leaf.
        let last = steps.last().unwrap();
        assert!(last.member.is_none() && last.edge.is_none());
        let leaf_matches = catalog.is_external_state_type(&last.class_fqn)
            || built
                .graph
                .supertype_names(&last.class_fqn)
                .iter()
                .any(|name| catalog.is_external_state_type(name));
        assert!(leaf_matches, "leaf {} not in category", last.class_fqn);
    }
}

#[test]
fn exclude_patterns_only_remove_matching_findings() {
    let tmp = TempDir::new().unwrap();
    let classpath = build_project(&tmp);

    let baseline = scan(&classpath, &catalog_with_pool_leaf());

    let mut excluding = catalog_with_pool_leaf();
    excluding.add_exclude_pattern(r"java\.util\.HashMap");
    let filtered = scan(&classpath, &excluding);

    // Excluding never adds findings.
    assert!(filtered.findings.len() <= baseline.findings.len());

    // Findings whose type does not match the exclusion survive unchanged.
    for finding in &baseline.findings {
        let matches_exclusion = finding.field_type.as_deref() == Some("java.util.HashMap");
        let survives = filtered.findings.iter().any(|f| {
            f.detector_id == finding.detector_id
                && f.class_fqn == finding.class_fqn
                && f.field_name == finding.field_name
        });
        if matches_exclusion {
            assert!(!survives, "excluded finding survived: {finding:#?}");
        } else {
            assert!(survives, "unrelated finding disappeared: {finding:#?}");
        }
    }
}
