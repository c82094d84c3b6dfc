//! The detector pipeline: a fixed, ordered set of pure rules over the
//! immutable scan context. Detectors share no state and run on the rayon
//! pool; their outputs are concatenated in pipeline order so results stay
//! deterministic.

mod field_leaves;
mod paths;
mod singleton;
mod static_state;

use rayon::prelude::*;
use statescan_catalog::Catalog;
use statescan_di::BindingTable;
use statescan_graph::ClassGraph;
use tracing::debug;

use crate::reach::ReachablePath;
use crate::report::Finding;

/// Everything a detector may consult. Immutable for the whole phase.
pub struct ScanContext<'a> {
    pub graph: &'a ClassGraph,
    pub catalog: &'a Catalog,
    pub bindings: &'a BindingTable,
    pub paths: &'a [ReachablePath],
}

/// The detectors, as tagged variants with a pure dispatch function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detector {
    StaticState,
    Singleton,
    ExternalState,
    Cache,
    ThreadLocal,
    Resilience,
    FileState,
    ServiceClient,
}

/// Pipeline execution order.
pub const DETECTORS: [Detector; 8] = [
    Detector::StaticState,
    Detector::Singleton,
    Detector::ExternalState,
    Detector::Cache,
    Detector::ThreadLocal,
    Detector::Resilience,
    Detector::FileState,
    Detector::ServiceClient,
];

impl Detector {
    pub fn id(&self) -> &'static str {
        match self {
            Detector::StaticState => "static-state",
            Detector::Singleton => "singleton-state",
            Detector::ExternalState => "external-state",
            Detector::Cache => "cache-state",
            Detector::ThreadLocal => "thread-local",
            Detector::Resilience => "resilience-state",
            Detector::FileState => "file-state",
            Detector::ServiceClient => "service-client",
        }
    }

    pub fn run(&self, cx: &ScanContext<'_>) -> Vec<Finding> {
        match self {
            Detector::StaticState => static_state::run(cx),
            Detector::Singleton => singleton::run(cx),
            Detector::ExternalState => paths::external_state(cx),
            Detector::Cache => {
                let mut findings = field_leaves::cache_fields(cx);
                findings.extend(paths::cache_paths(cx));
                findings
            }
            Detector::ThreadLocal => field_leaves::thread_local_fields(cx),
            Detector::Resilience => {
                let mut findings = field_leaves::resilience_fields(cx);
                findings.extend(paths::resilience_paths(cx));
                findings
            }
            Detector::FileState => {
                let mut findings = field_leaves::file_state_fields(cx);
                findings.extend(paths::file_state_paths(cx));
                findings
            }
            Detector::ServiceClient => {
                let mut findings = field_leaves::client_fields(cx);
                findings.extend(paths::client_paths(cx));
                findings
            }
        }
    }
}

/// Run the whole pipeline and merge outputs in pipeline order.
pub fn run_detectors(cx: &ScanContext<'_>) -> Vec<Finding> {
    let outputs: Vec<Vec<Finding>> = DETECTORS
        .par_iter()
        .map(|detector| {
            let findings = detector.run(cx);
            debug!(detector = detector.id(), findings = findings.len(), "detector finished");
            findings
        })
        .collect();
    outputs.into_iter().flatten().collect()
}
