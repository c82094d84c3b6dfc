//! Classpath ingest: walk project class directories and dependency archives,
//! decode each classfile, and assemble the unified [`ClassGraph`].
//!
//! Decoding of distinct blobs is independent and runs on the rayon pool;
//! insertion is sequential in enumeration order so that first-insert-wins
//! shadowing stays deterministic.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use statescan_classfile::ClassFile;
use tracing::{debug, info, warn};

use crate::error::GraphError;
use crate::graph::ClassGraph;
use crate::model::ClassShape;

/// The input contract handed over by the build-descriptor collaborator.
#[derive(Debug, Clone, Default)]
pub struct ResolvedClasspath {
    /// Directories containing the project's own `.class` output.
    pub project_classes_dirs: Vec<PathBuf>,
    /// Compile-time dependency archives, in classpath order.
    pub dependency_archives: Vec<PathBuf>,
    /// Optional package-prefix hint; auto-detected when absent.
    pub detected_package_prefix: Option<String>,
}

/// The assembled graph plus scan counters for the report.
#[derive(Debug)]
pub struct BuiltGraph {
    pub graph: ClassGraph,
    pub package_prefix: Option<String>,
    pub classes_scanned: usize,
    pub archives_scanned: usize,
}

/// Fraction of project classes that must share a package prefix for it to be
/// auto-detected as the project prefix.
const PREFIX_DETECTION_QUORUM: f64 = 0.8;

pub fn build_graph(classpath: &ResolvedClasspath) -> Result<BuiltGraph, GraphError> {
    let mut graph = ClassGraph::new();
    let mut classes_scanned = 0usize;

    // Phase 1: project class directories. An unreadable path is fatal; an
    // existing but empty project scans cleanly to zero findings.
    if classpath.project_classes_dirs.is_empty() {
        return Err(GraphError::ProjectDiscovery(
            "no project class directories given".to_string(),
        ));
    }
    let mut project_files = Vec::new();
    for dir in &classpath.project_classes_dirs {
        if !dir.is_dir() {
            return Err(GraphError::ProjectDiscovery(format!(
                "not a directory: {}",
                dir.display()
            )));
        }
        collect_class_files(dir, &mut project_files);
    }
    if project_files.is_empty() {
        warn!("no .class files found in project directories");
    }

    let decoded: Vec<Option<ClassShape>> = project_files
        .par_iter()
        .map(|path| decode_file(path))
        .collect();
    for shape in decoded.into_iter().flatten() {
        classes_scanned += 1;
        graph.insert(shape);
    }
    info!(classes = graph.len(), "decoded project class directories");

    // Phase 2: dependency archives, in order. A broken archive is skipped;
    // the scan continues with what it has.
    let mut archives_scanned = 0usize;
    for archive in &classpath.dependency_archives {
        match read_archive_classes(archive) {
            Ok(entries) => {
                archives_scanned += 1;
                let decoded: Vec<Option<ClassShape>> = entries
                    .par_iter()
                    .map(|(name, bytes)| decode_archive_entry(archive, name, bytes))
                    .collect();
                for shape in decoded.into_iter().flatten() {
                    classes_scanned += 1;
                    graph.insert(shape);
                }
            }
            Err(err) => {
                warn!(archive = %archive.display(), error = %err, "skipping unreadable archive");
            }
        }
    }

    // Phase 3: the subtype index, strictly after all inserts.
    graph.build_subtype_index();

    let package_prefix = classpath
        .detected_package_prefix
        .clone()
        .or_else(|| detect_package_prefix(&graph));
    if let Some(prefix) = &package_prefix {
        debug!(%prefix, "using project package prefix");
    }

    info!(
        classes = graph.len(),
        archives = archives_scanned,
        "class graph assembled"
    );

    Ok(BuiltGraph {
        graph,
        package_prefix,
        classes_scanned,
        archives_scanned,
    })
}

fn collect_class_files(dir: &Path, out: &mut Vec<PathBuf>) {
    for entry in walkdir::WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension() != Some(OsStr::new("class")) {
            continue;
        }
        out.push(entry.into_path());
    }
}

fn is_ignored_class(internal_name: &str) -> bool {
    internal_name == "module-info"
        || internal_name == "package-info"
        || internal_name.ends_with("/package-info")
}

fn decode_file(path: &Path) -> Option<ClassShape> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read classfile");
            return None;
        }
    };
    decode_bytes(&bytes, true).map_err(|err| {
        warn!(path = %path.display(), error = %err, "discarding malformed classfile");
    }).ok()?
}

fn decode_archive_entry(archive: &Path, name: &str, bytes: &[u8]) -> Option<ClassShape> {
    decode_bytes(bytes, false)
        .map_err(|err| {
            warn!(
                archive = %archive.display(),
                entry = name,
                error = %err,
                "discarding malformed archive entry"
            );
        })
        .ok()?
}

fn decode_bytes(
    bytes: &[u8],
    is_project_local: bool,
) -> Result<Option<ClassShape>, statescan_classfile::Error> {
    let class = ClassFile::parse(bytes)?;
    if is_ignored_class(&class.this_class) {
        return Ok(None);
    }
    Ok(Some(ClassShape::from_classfile(&class, is_project_local)))
}

fn read_archive_classes(path: &Path) -> Result<Vec<(String, Vec<u8>)>, GraphError> {
    let file = std::fs::File::open(path)?;
    let mut zip = zip::ZipArchive::new(file)?;
    let mut entries = Vec::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        if !entry.name().ends_with(".class") {
            continue;
        }
        let name = entry.name().to_string();
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        entries.push((name, bytes));
    }
    Ok(entries)
}

/// Longest dotted prefix shared by at least 80% of project-local classes.
fn detect_package_prefix(graph: &ClassGraph) -> Option<String> {
    let packages: Vec<&str> = graph
        .project_classes()
        .filter_map(|shape| shape.fqn.rsplit_once('.').map(|(package, _)| package))
        .collect();
    if packages.is_empty() {
        return None;
    }
    let quorum = (packages.len() as f64 * PREFIX_DETECTION_QUORUM).ceil() as usize;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for package in &packages {
        let mut end = package.len();
        loop {
            let prefix = &package[..end];
            *counts.entry(prefix).or_default() += 1;
            match prefix.rfind('.') {
                Some(dot) => end = dot,
                None => break,
            }
        }
    }

    counts
        .into_iter()
        .filter(|&(_, count)| count >= quorum)
        .max_by_key(|&(prefix, count)| (prefix.len(), count))
        .map(|(prefix, _)| prefix.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassShape;
    use std::collections::BTreeSet;

    fn project_shape(fqn: &str) -> ClassShape {
        ClassShape {
            fqn: fqn.to_string(),
            superclass: None,
            interfaces: Vec::new(),
            annotations: BTreeSet::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            is_interface: false,
            is_abstract: false,
            is_enum: false,
            is_project_local: true,
            source_file: None,
        }
    }

    #[test]
    fn prefix_detection_finds_dominant_prefix() {
        let mut graph = ClassGraph::new();
        graph.insert(project_shape("com.example.app.Main"));
        graph.insert(project_shape("com.example.app.service.UserService"));
        graph.insert(project_shape("com.example.app.repo.UserRepo"));
        graph.insert(project_shape("com.example.app.web.Api"));
        graph.insert(project_shape("org.outlier.Generated"));

        assert_eq!(
            detect_package_prefix(&graph).as_deref(),
            Some("com.example.app")
        );
    }

    #[test]
    fn prefix_detection_handles_split_projects() {
        let mut graph = ClassGraph::new();
        graph.insert(project_shape("com.a.One"));
        graph.insert(project_shape("com.b.Two"));
        graph.insert(project_shape("com.c.Three"));

        assert_eq!(detect_package_prefix(&graph).as_deref(), Some("com"));
    }
}
