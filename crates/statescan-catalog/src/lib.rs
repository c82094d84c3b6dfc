//! The leaf-type catalogue: a configuration-driven oracle answering which
//! annotations and types indicate singleton scope, caches, external state,
//! thread affinity, resilience machinery, clients, files, or safety.
//!
//! A shipped default catalogue is always present; user YAML adds to it.

mod config;
mod defaults;
mod pattern;

use std::collections::BTreeSet;

use regex::Regex;
use tracing::warn;

pub use crate::config::{glob_to_regex, CatalogDocument, ConfigError, CONFIG_FILE_NAME};
pub use crate::pattern::TypePatternSet;

/// The leaf categories the reachability engine walks toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafCategory {
    ExternalState,
    Cache,
    ThreadLocal,
    FileState,
    Resilience,
    ServiceClient,
    Grpc,
}

impl LeafCategory {
    pub const ALL: [LeafCategory; 7] = [
        LeafCategory::ExternalState,
        LeafCategory::Cache,
        LeafCategory::ThreadLocal,
        LeafCategory::FileState,
        LeafCategory::Resilience,
        LeafCategory::ServiceClient,
        LeafCategory::Grpc,
    ];
}

#[derive(Debug, Clone)]
pub struct Catalog {
    singleton_annotations: BTreeSet<String>,
    session_annotations: BTreeSet<String>,
    request_annotations: BTreeSet<String>,
    endpoint_annotations: BTreeSet<String>,
    external_state_types: TypePatternSet,
    service_client_types: TypePatternSet,
    grpc_types: TypePatternSet,
    resilience_types: TypePatternSet,
    cache_types: TypePatternSet,
    mutable_collection_types: TypePatternSet,
    module_types: TypePatternSet,
    thread_local_types: TypePatternSet,
    file_state_types: TypePatternSet,
    safe_types: TypePatternSet,
    exclude_patterns: Vec<Regex>,
}

impl Default for Catalog {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            singleton_annotations: strings(defaults::SINGLETON_ANNOTATIONS),
            session_annotations: strings(defaults::SESSION_ANNOTATIONS),
            request_annotations: strings(defaults::REQUEST_ANNOTATIONS),
            endpoint_annotations: strings(defaults::ENDPOINT_ANNOTATIONS),
            external_state_types: TypePatternSet::from_patterns(
                defaults::EXTERNAL_STATE_TYPES.iter().copied(),
            ),
            service_client_types: TypePatternSet::from_patterns(
                defaults::SERVICE_CLIENT_TYPES.iter().copied(),
            ),
            grpc_types: TypePatternSet::from_patterns(defaults::GRPC_TYPES.iter().copied()),
            resilience_types: TypePatternSet::from_patterns(
                defaults::RESILIENCE_TYPES.iter().copied(),
            ),
            cache_types: TypePatternSet::from_patterns(defaults::CACHE_TYPES.iter().copied()),
            mutable_collection_types: TypePatternSet::from_patterns(
                defaults::MUTABLE_COLLECTION_TYPES.iter().copied(),
            ),
            module_types: TypePatternSet::from_patterns(defaults::MODULE_TYPES.iter().copied()),
            thread_local_types: TypePatternSet::from_patterns(
                defaults::THREAD_LOCAL_TYPES.iter().copied(),
            ),
            file_state_types: TypePatternSet::from_patterns(
                defaults::FILE_STATE_TYPES.iter().copied(),
            ),
            safe_types: TypePatternSet::from_patterns(defaults::SAFE_TYPES.iter().copied()),
            exclude_patterns: Vec::new(),
        }
    }
}

impl Catalog {
    /// Merge a user overlay: set elements are added, never replaced.
    /// Invalid exclude regexes are warned and dropped.
    pub fn merge(&mut self, doc: CatalogDocument) {
        self.singleton_annotations.extend(doc.singleton_annotations);
        self.session_annotations.extend(doc.session_annotations);
        self.request_annotations.extend(doc.request_annotations);
        self.endpoint_annotations.extend(doc.endpoint_annotations);
        self.external_state_types.extend(doc.external_state_types);
        self.service_client_types.extend(doc.service_client_types);
        self.grpc_types.extend(doc.grpc_types);
        self.resilience_types.extend(doc.resilience_types);
        self.cache_types.extend(doc.cache_types);
        self.mutable_collection_types
            .extend(doc.mutable_collection_types);
        self.module_types.extend(doc.module_types);
        self.thread_local_types.extend(doc.thread_local_types);
        self.file_state_types.extend(doc.file_state_types);
        self.safe_types.extend(doc.safe_types);
        for pattern in doc.exclude_patterns {
            self.add_exclude_pattern(&pattern);
        }
    }

    /// Compile and register an exclude regex; invalid syntax warns and drops.
    pub fn add_exclude_pattern(&mut self, pattern: &str) {
        match Regex::new(pattern) {
            Ok(regex) => self.exclude_patterns.push(regex),
            Err(err) => warn!(pattern, error = %err, "dropping invalid exclude pattern"),
        }
    }

    /// Register a CLI-style class glob as an exclude pattern.
    pub fn add_exclude_glob(&mut self, glob: &str) {
        self.add_exclude_pattern(&glob_to_regex(glob));
    }

    pub fn is_singleton_annotation(&self, fqn: &str) -> bool {
        self.singleton_annotations.contains(fqn)
    }

    pub fn is_session_annotation(&self, fqn: &str) -> bool {
        self.session_annotations.contains(fqn)
    }

    pub fn is_request_annotation(&self, fqn: &str) -> bool {
        self.request_annotations.contains(fqn)
    }

    pub fn is_endpoint_annotation(&self, fqn: &str) -> bool {
        self.endpoint_annotations.contains(fqn)
    }

    pub fn is_module_type(&self, fqn: &str) -> bool {
        self.module_types.matches(fqn)
    }

    pub fn is_mutable_collection_type(&self, fqn: &str) -> bool {
        self.mutable_collection_types.matches(fqn)
    }

    pub fn is_cache_type(&self, fqn: &str) -> bool {
        self.cache_types.matches(fqn)
    }

    pub fn is_thread_local_type(&self, fqn: &str) -> bool {
        self.thread_local_types.matches(fqn)
    }

    pub fn is_file_state_type(&self, fqn: &str) -> bool {
        self.file_state_types.matches(fqn)
    }

    pub fn is_resilience_type(&self, fqn: &str) -> bool {
        self.resilience_types.matches(fqn)
    }

    pub fn is_service_client_type(&self, fqn: &str) -> bool {
        self.service_client_types.matches(fqn)
    }

    pub fn is_grpc_type(&self, fqn: &str) -> bool {
        self.grpc_types.matches(fqn)
    }

    pub fn is_external_state_type(&self, fqn: &str) -> bool {
        self.external_state_types.matches(fqn)
    }

    pub fn is_safe_type(&self, fqn: &str) -> bool {
        self.safe_types.matches(fqn)
    }

    /// Does any user exclude regex match this type FQN?
    pub fn is_excluded_type(&self, fqn: &str) -> bool {
        self.exclude_patterns.iter().any(|regex| regex.is_match(fqn))
    }

    pub fn matches_category(&self, category: LeafCategory, fqn: &str) -> bool {
        match category {
            LeafCategory::ExternalState => self.is_external_state_type(fqn),
            LeafCategory::Cache => self.is_cache_type(fqn),
            LeafCategory::ThreadLocal => self.is_thread_local_type(fqn),
            LeafCategory::FileState => self.is_file_state_type(fqn),
            LeafCategory::Resilience => self.is_resilience_type(fqn),
            LeafCategory::ServiceClient => self.is_service_client_type(fqn),
            LeafCategory::Grpc => self.is_grpc_type(fqn),
        }
    }
}
