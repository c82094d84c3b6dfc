//! Build-layout discovery: turn a target path into a `ResolvedClasspath`.
//!
//! This is deliberately thin: it knows the conventional Maven/Gradle
//! output locations and the usual vendored-jar directories, nothing more.
//! Projects with exotic layouts can point the scanner straight at a class
//! directory.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use statescan_graph::ResolvedClasspath;
use tracing::debug;

/// Conventional compiled-output directories, relative to the project root.
const CLASS_DIR_CANDIDATES: &[&str] = &[
    "target/classes",
    "build/classes/java/main",
    "build/classes",
];

/// Conventional dependency-archive directories.
const ARCHIVE_DIR_CANDIDATES: &[&str] = &["lib", "libs", "vendor", "target/dependency"];

pub fn discover_classpath(target: &Path, package_prefix: Option<String>) -> ResolvedClasspath {
    let mut project_classes_dirs: Vec<PathBuf> = CLASS_DIR_CANDIDATES
        .iter()
        .map(|candidate| target.join(candidate))
        .filter(|dir| dir.is_dir())
        .collect();

    // No recognized build layout: treat the target itself as the class
    // directory (covers pointing the tool straight at `target/classes`).
    if project_classes_dirs.is_empty() {
        project_classes_dirs.push(target.to_path_buf());
    }

    let mut dependency_archives = Vec::new();
    for candidate in ARCHIVE_DIR_CANDIDATES {
        let dir = target.join(candidate);
        if !dir.is_dir() {
            continue;
        }
        for entry in walkdir::WalkDir::new(&dir)
            .max_depth(2)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            if entry.file_type().is_file()
                && entry.path().extension() == Some(OsStr::new("jar"))
            {
                dependency_archives.push(entry.into_path());
            }
        }
    }

    debug!(
        class_dirs = project_classes_dirs.len(),
        archives = dependency_archives.len(),
        "classpath discovered"
    );

    ResolvedClasspath {
        project_classes_dirs,
        dependency_archives,
        detected_package_prefix: package_prefix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn finds_maven_layout_and_jars() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("target/classes")).unwrap();
        std::fs::create_dir_all(tmp.path().join("lib")).unwrap();
        std::fs::write(tmp.path().join("lib/dep.jar"), b"zip").unwrap();
        std::fs::write(tmp.path().join("lib/notes.txt"), b"x").unwrap();

        let classpath = discover_classpath(tmp.path(), None);
        assert_eq!(
            classpath.project_classes_dirs,
            vec![tmp.path().join("target/classes")]
        );
        assert_eq!(classpath.dependency_archives, vec![tmp.path().join("lib/dep.jar")]);
    }

    #[test]
    fn falls_back_to_the_target_itself() {
        let tmp = TempDir::new().unwrap();
        let classpath = discover_classpath(tmp.path(), Some("com.x".to_string()));
        assert_eq!(classpath.project_classes_dirs, vec![tmp.path().to_path_buf()]);
        assert_eq!(classpath.detected_package_prefix.as_deref(), Some("com.x"));
    }
}
