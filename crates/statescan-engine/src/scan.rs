//! The scan driver: decode ∥ → index → bindings → detectors ∥ → aggregate.
//! The graph and binding table are immutable once built; detectors and the
//! aggregator only read.

use std::path::Path;
use std::time::Instant;

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::info;

use statescan_catalog::Catalog;
use statescan_di::resolve_bindings;
use statescan_graph::{build_graph, GraphError, ResolvedClasspath};

use crate::aggregate::{aggregate, AggregateOptions};
use crate::detect::{run_detectors, ScanContext};
use crate::reach::{compute_reachability, DEFAULT_MAX_DEPTH};
use crate::report::{RiskLevel, ScanMetadata, ScanReport};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Graph(#[from] GraphError),
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Reachability search bound.
    pub max_depth: usize,
    /// Suppress findings below this severity.
    pub risk_threshold: Option<RiskLevel>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            risk_threshold: None,
        }
    }
}

pub fn run_scan(
    project_path: &Path,
    classpath: &ResolvedClasspath,
    catalog: &Catalog,
    options: &ScanOptions,
) -> Result<ScanReport, ScanError> {
    let started = Instant::now();
    let scan_date = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();

    let built = build_graph(classpath)?;
    let bindings = resolve_bindings(&built.graph, catalog);
    let paths = compute_reachability(&built.graph, &bindings, catalog, options.max_depth);

    let cx = ScanContext {
        graph: &built.graph,
        catalog,
        bindings: &bindings,
        paths: &paths,
    };
    let findings = run_detectors(&cx);

    let aggregated = aggregate(
        findings,
        catalog,
        &AggregateOptions {
            risk_threshold: options.risk_threshold,
        },
    );

    let report = ScanReport {
        metadata: ScanMetadata {
            project_path: project_path.display().to_string(),
            scan_date,
            classes_scanned: built.classes_scanned,
            archives_scanned: built.archives_scanned,
            duration_ms: started.elapsed().as_millis() as u64,
        },
        summary: aggregated.summary,
        findings: aggregated.findings,
        class_summaries: aggregated.class_summaries,
    };

    info!(
        findings = report.summary.total,
        classes = report.metadata.classes_scanned,
        duration_ms = report.metadata.duration_ms,
        "scan complete"
    );
    Ok(report)
}
