//! End-to-end scans over synthesized class files.

use std::path::{Path, PathBuf};

use statescan_catalog::{Catalog, CatalogDocument};
use statescan_classfile::assembler::{ClassBuilder, MethodDef};
use statescan_classfile::access;
use statescan_engine::{run_scan, RiskLevel, ScanOptions, ScanReport, ScopeSource, StateType};
use statescan_graph::ResolvedClasspath;
use tempfile::TempDir;

struct Project {
    _tmp: TempDir,
    classes_dir: PathBuf,
}

impl Project {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let classes_dir = tmp.path().join("classes");
        std::fs::create_dir_all(&classes_dir).unwrap();
        Self {
            _tmp: tmp,
            classes_dir,
        }
    }

    fn add(&self, internal_name: &str, bytes: &[u8]) -> &Self {
        let path = self.classes_dir.join(format!("{internal_name}.class"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
        self
    }

    fn scan(&self, catalog: &Catalog) -> ScanReport {
        self.scan_with(catalog, &ScanOptions::default())
    }

    fn scan_with(&self, catalog: &Catalog, options: &ScanOptions) -> ScanReport {
        run_scan(
            Path::new("test-project"),
            &ResolvedClasspath {
                project_classes_dirs: vec![self.classes_dir.clone()],
                dependency_archives: Vec::new(),
                detected_package_prefix: None,
            },
            catalog,
            options,
        )
        .unwrap()
    }
}

const STATIC_FINAL: u16 = access::PRIVATE | access::STATIC | access::FINAL;

#[test]
fn s1_mutable_static_map() {
    let project = Project::new();
    project.add(
        "com/example/S",
        &ClassBuilder::new("com/example/S")
            .field(STATIC_FINAL, "CACHE", "Ljava/util/HashMap;")
            .build(),
    );

    let report = project.scan(&Catalog::default());
    assert_eq!(report.findings.len(), 1, "findings: {:#?}", report.findings);
    let finding = &report.findings[0];
    assert_eq!(finding.detector_id, "static-state");
    assert_eq!(finding.state_type, StateType::InMemory);
    assert_eq!(finding.risk_level, RiskLevel::High);
    assert_eq!(finding.field_name.as_deref(), Some("CACHE"));
    assert_eq!(finding.field_type.as_deref(), Some("java.util.HashMap"));
}

#[test]
fn s2_non_final_static_object() {
    let project = Project::new();
    project.add(
        "com/example/S",
        &ClassBuilder::new("com/example/S")
            .field(access::PRIVATE | access::STATIC, "X", "Ljava/lang/Object;")
            .build(),
    );

    let report = project.scan(&Catalog::default());
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].risk_level, RiskLevel::Critical);
}

#[test]
fn s3_logger_is_excluded() {
    let project = Project::new();
    project.add(
        "com/example/S",
        &ClassBuilder::new("com/example/S")
            .field(STATIC_FINAL, "LOG", "Lorg/slf4j/Logger;")
            .build(),
    );

    let report = project.scan(&Catalog::default());
    assert!(report.findings.is_empty(), "{:#?}", report.findings);
}

#[test]
fn s4_enum_values_are_ignored() {
    let project = Project::new();
    project.add(
        "com/example/E",
        &ClassBuilder::new("com/example/E")
            .super_class("java/lang/Enum")
            .access_flags(access::PUBLIC | access::ENUM | access::FINAL)
            .field(
                access::STATIC | access::FINAL | access::SYNTHETIC,
                "$VALUES",
                "[Lcom/example/E;",
            )
            .field(
                access::PUBLIC | access::STATIC | access::FINAL | access::ENUM,
                "RED",
                "Lcom/example/E;",
            )
            .build(),
    );

    let report = project.scan(&Catalog::default());
    assert!(report.findings.is_empty(), "{:#?}", report.findings);
}

#[test]
fn s5_di_path_to_database_pool() {
    let project = Project::new();
    project.add(
        "com/example/UserService",
        &ClassBuilder::new("com/example/UserService")
            .method(
                MethodDef::new(access::PUBLIC, "<init>", "(Lcom/example/DatabasePool;)V")
                    .annotated("Ljavax/inject/Inject;"),
            )
            .build(),
    );
    project.add(
        "com/example/DatabasePool",
        &ClassBuilder::new("com/example/DatabasePool")
            .field(
                STATIC_FINAL,
                "connections",
                "Ljava/util/concurrent/ConcurrentHashMap;",
            )
            .build(),
    );

    let mut catalog = Catalog::default();
    catalog.merge(CatalogDocument {
        external_state_types: vec!["com.example.DatabasePool".to_string()],
        ..CatalogDocument::default()
    });

    let report = project.scan(&catalog);

    let static_finding = report
        .findings
        .iter()
        .find(|f| f.detector_id == "static-state")
        .expect("static-state finding on DatabasePool.connections");
    assert_eq!(static_finding.class_fqn, "com.example.DatabasePool");
    assert_eq!(static_finding.field_name.as_deref(), Some("connections"));
    assert_eq!(static_finding.risk_level, RiskLevel::High);

    let path_finding = report
        .findings
        .iter()
        .find(|f| f.detector_id == "external-state")
        .expect("external-state path finding");
    assert_eq!(path_finding.class_fqn, "com.example.UserService");
    assert_eq!(path_finding.risk_level, RiskLevel::Critical);
    assert_eq!(path_finding.scope_source, ScopeSource::DiBinding);
    let steps = path_finding.reachability_path.as_ref().unwrap();
    let classes: Vec<&str> = steps.iter().map(|s| s.class_fqn.as_str()).collect();
    assert_eq!(classes, vec!["com.example.UserService", "com.example.DatabasePool"]);
}

#[test]
fn s6_shaded_fast_thread_local_via_prefix_listing() {
    let project = Project::new();
    project.add(
        "com/example/Holder",
        &ClassBuilder::new("com/example/Holder")
            .field(
                STATIC_FINAL,
                "T",
                "Lorg/vendor/shade/io/netty/util/concurrent/FastThreadLocal;",
            )
            .build(),
    );

    let mut catalog = Catalog::default();
    catalog.merge(CatalogDocument {
        thread_local_types: vec![
            "org.vendor.shade.io.netty.util.concurrent.FastThreadLocal".to_string(),
        ],
        ..CatalogDocument::default()
    });

    let report = project.scan(&catalog);
    assert_eq!(report.findings.len(), 1, "{:#?}", report.findings);
    let finding = &report.findings[0];
    assert_eq!(finding.state_type, StateType::ThreadLocal);
    assert_eq!(finding.risk_level, RiskLevel::High);
}

#[test]
fn s7_exclude_pattern_suppresses_prometheus() {
    let project = Project::new();
    project.add(
        "com/example/Metrics",
        &ClassBuilder::new("com/example/Metrics")
            .field(STATIC_FINAL, "C", "Lio/prometheus/client/Counter;")
            .build(),
    );

    let mut catalog = Catalog::default();
    catalog.merge(CatalogDocument {
        exclude_patterns: vec![r".*\.prometheus\..*".to_string()],
        ..CatalogDocument::default()
    });

    let report = project.scan(&catalog);
    assert!(report.findings.is_empty(), "{:#?}", report.findings);
}

#[test]
fn s8_fail_on_gate() {
    // Only a MEDIUM finding: a static final plain object.
    let medium_project = Project::new();
    medium_project.add(
        "com/example/M",
        &ClassBuilder::new("com/example/M")
            .field(STATIC_FINAL, "state", "Lcom/example/Widget;")
            .build(),
    );
    let report = medium_project.scan(&Catalog::default());
    assert_eq!(report.highest_risk(), Some(RiskLevel::Medium));
    assert!(!report.exceeds_gate(RiskLevel::High));

    // One HIGH finding trips the gate.
    let high_project = Project::new();
    high_project.add(
        "com/example/H",
        &ClassBuilder::new("com/example/H")
            .field(STATIC_FINAL, "CACHE", "Ljava/util/HashMap;")
            .build(),
    );
    let report = high_project.scan(&Catalog::default());
    assert_eq!(report.highest_risk(), Some(RiskLevel::High));
    assert!(report.exceeds_gate(RiskLevel::High));
    assert!(!report.exceeds_gate(RiskLevel::Critical));
}

#[test]
fn singleton_annotation_with_mutable_field() {
    let project = Project::new();
    project.add(
        "com/example/Session",
        &ClassBuilder::new("com/example/Session")
            .annotated("Ljavax/inject/Singleton;")
            .field(access::PRIVATE, "requests", "Ljava/util/ArrayList;")
            .field(access::PRIVATE | access::FINAL, "name", "Ljava/lang/String;")
            .build(),
    );

    let report = project.scan(&Catalog::default());
    let singleton: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.detector_id == "singleton-state")
        .collect();
    assert_eq!(singleton.len(), 1, "{:#?}", report.findings);
    assert_eq!(singleton[0].field_name.as_deref(), Some("requests"));
    assert_eq!(singleton[0].risk_level, RiskLevel::High);
    assert_eq!(singleton[0].scope_source, ScopeSource::Annotation);
    assert_eq!(
        singleton[0].scope_annotation.as_deref(),
        Some("javax.inject.Singleton")
    );
}

#[test]
fn endpoint_roots_are_attributed() {
    let project = Project::new();
    project.add(
        "com/example/Api",
        &ClassBuilder::new("com/example/Api")
            .annotated("Ljavax/ws/rs/Path;")
            .method(
                MethodDef::new(access::PUBLIC, "list", "()V")
                    .annotated("Ljavax/ws/rs/GET;"),
            )
            .method(
                MethodDef::new(access::PUBLIC, "<init>", "(Lcom/example/Pool;)V")
                    .annotated("Ljavax/inject/Inject;"),
            )
            .build(),
    );
    project.add(
        "com/example/Pool",
        &ClassBuilder::new("com/example/Pool").build(),
    );

    let mut catalog = Catalog::default();
    catalog.merge(CatalogDocument {
        external_state_types: vec!["com.example.Pool".to_string()],
        ..CatalogDocument::default()
    });

    let report = project.scan(&catalog);
    let path_finding = report
        .findings
        .iter()
        .find(|f| f.detector_id == "external-state")
        .unwrap();
    assert_eq!(
        path_finding.affected_endpoints,
        vec!["com.example.Api#list".to_string()]
    );
}

#[test]
fn risk_threshold_suppresses_low_severity() {
    let project = Project::new();
    project.add(
        "com/example/M",
        &ClassBuilder::new("com/example/M")
            .field(STATIC_FINAL, "state", "Lcom/example/Widget;")
            .build(),
    );

    let report = project.scan_with(
        &Catalog::default(),
        &ScanOptions {
            risk_threshold: Some(RiskLevel::High),
            ..ScanOptions::default()
        },
    );
    assert!(report.findings.is_empty());
    assert_eq!(report.summary.total, 0);
}

#[test]
fn report_serializes_to_schema_shape() {
    let project = Project::new();
    project.add(
        "com/example/S",
        &ClassBuilder::new("com/example/S")
            .source_file("S.java")
            .field(STATIC_FINAL, "CACHE", "Ljava/util/HashMap;")
            .build(),
    );

    let report = project.scan(&Catalog::default());
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["metadata"]["project_path"], "test-project");
    assert_eq!(json["metadata"]["classes_scanned"], 1);
    assert!(json["metadata"]["scan_date"].as_str().unwrap().contains('T'));
    assert_eq!(json["summary"]["high"], 1);
    assert_eq!(json["summary"]["total"], 1);
    let finding = &json["findings"][0];
    assert_eq!(finding["simple_class_name"], "S");
    assert_eq!(finding["source_file"], "S.java");
    assert_eq!(finding["risk_level"], "HIGH");
    assert!(finding.get("reachability_path").is_none());
}
