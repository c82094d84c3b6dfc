use std::io::Write;
use std::path::Path;

use statescan_classfile::assembler::{ClassBuilder, MethodDef, Op};
use statescan_classfile::access;
use statescan_graph::{build_graph, GraphError, ResolvedClasspath};
use tempfile::TempDir;

fn write_class(dir: &Path, internal_name: &str, bytes: &[u8]) {
    let path = dir.join(format!("{internal_name}.class"));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).unwrap();
    let mut jar = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    for (name, bytes) in entries {
        jar.start_file(name.to_string(), options).unwrap();
        jar.write_all(bytes).unwrap();
    }
    jar.finish().unwrap();
}

#[test]
fn builds_graph_with_shadowing_and_counts() {
    let tmp = TempDir::new().unwrap();
    let classes_dir = tmp.path().join("classes");
    std::fs::create_dir_all(&classes_dir).unwrap();

    let project_service = ClassBuilder::new("com/example/app/Service")
        .field(access::PRIVATE | access::STATIC, "shared", "Ljava/util/HashMap;")
        .method(MethodDef::new(access::PUBLIC, "run", "()V").body(vec![
            Op::invoke_virtual("com/example/app/Shadowed", "call", "()V"),
        ]))
        .build();
    write_class(&classes_dir, "com/example/app/Service", &project_service);

    // The project's own copy of a class that also exists in a dependency.
    let project_shadowed = ClassBuilder::new("com/example/app/Shadowed")
        .field(access::PRIVATE, "projectEdition", "I")
        .build();
    write_class(&classes_dir, "com/example/app/Shadowed", &project_shadowed);

    let dep_shadowed = ClassBuilder::new("com/example/app/Shadowed")
        .field(access::PRIVATE, "dependencyEdition", "I")
        .build();
    let dep_pool = ClassBuilder::new("org/vendor/pool/ConnectionPool")
        .super_class("java/lang/Object")
        .build();
    let module_info = ClassBuilder::new("module-info").build();

    let jar_path = tmp.path().join("dep.jar");
    write_jar(
        &jar_path,
        &[
            ("com/example/app/Shadowed.class", dep_shadowed.as_slice()),
            ("org/vendor/pool/ConnectionPool.class", dep_pool.as_slice()),
            ("module-info.class", module_info.as_slice()),
            ("META-INF/garbage.class", b"not a classfile".as_slice()),
            ("README.txt", b"ignored".as_slice()),
        ],
    );

    let built = build_graph(&ResolvedClasspath {
        project_classes_dirs: vec![classes_dir],
        dependency_archives: vec![jar_path],
        detected_package_prefix: None,
    })
    .unwrap();

    // Project classes shadow coincident dependency classes.
    let shadowed = built.graph.get("com.example.app.Shadowed").unwrap();
    assert!(shadowed.is_project_local);
    assert!(shadowed.fields.iter().any(|f| f.name == "projectEdition"));

    let pool = built.graph.get("org.vendor.pool.ConnectionPool").unwrap();
    assert!(!pool.is_project_local);

    // module-info and the malformed entry are dropped without failing.
    assert!(!built.graph.contains("module-info"));
    assert_eq!(built.archives_scanned, 1);
    assert_eq!(built.graph.len(), 3);

    assert_eq!(built.package_prefix.as_deref(), Some("com.example.app"));

    // Invocation edges survive shape conversion in dotted form.
    let service = built.graph.get("com.example.app.Service").unwrap();
    let run = service.method("run").unwrap();
    assert!(run
        .invocations
        .iter()
        .any(|inv| inv.owner == "com.example.app.Shadowed" && inv.name == "call"));
}

#[test]
fn empty_project_scans_to_an_empty_graph() {
    let tmp = TempDir::new().unwrap();
    let classes_dir = tmp.path().join("classes");
    std::fs::create_dir_all(&classes_dir).unwrap();

    let built = build_graph(&ResolvedClasspath {
        project_classes_dirs: vec![classes_dir],
        dependency_archives: Vec::new(),
        detected_package_prefix: None,
    })
    .unwrap();
    assert!(built.graph.is_empty());
    assert_eq!(built.classes_scanned, 0);
}

#[test]
fn missing_project_directory_is_a_discovery_error() {
    let tmp = TempDir::new().unwrap();
    let result = build_graph(&ResolvedClasspath {
        project_classes_dirs: vec![tmp.path().join("does-not-exist")],
        dependency_archives: Vec::new(),
        detected_package_prefix: None,
    });
    assert!(matches!(result, Err(GraphError::ProjectDiscovery(_))));
}

#[test]
fn unreadable_archive_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let classes_dir = tmp.path().join("classes");
    std::fs::create_dir_all(&classes_dir).unwrap();
    write_class(
        &classes_dir,
        "com/example/Only",
        &ClassBuilder::new("com/example/Only").build(),
    );

    let bogus = tmp.path().join("broken.jar");
    std::fs::write(&bogus, b"definitely not a zip").unwrap();

    let built = build_graph(&ResolvedClasspath {
        project_classes_dirs: vec![classes_dir],
        dependency_archives: vec![bogus],
        detected_package_prefix: None,
    })
    .unwrap();

    assert_eq!(built.archives_scanned, 0);
    assert!(built.graph.contains("com.example.Only"));
}

#[test]
fn package_prefix_hint_overrides_detection() {
    let tmp = TempDir::new().unwrap();
    let classes_dir = tmp.path().join("classes");
    std::fs::create_dir_all(&classes_dir).unwrap();
    write_class(
        &classes_dir,
        "com/example/Only",
        &ClassBuilder::new("com/example/Only").build(),
    );

    let built = build_graph(&ResolvedClasspath {
        project_classes_dirs: vec![classes_dir],
        dependency_archives: Vec::new(),
        detected_package_prefix: Some("com.pinned".to_string()),
    })
    .unwrap();
    assert_eq!(built.package_prefix.as_deref(), Some("com.pinned"));
}
