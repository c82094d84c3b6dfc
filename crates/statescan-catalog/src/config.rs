//! The user-facing YAML configuration document.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// The on-disk configuration file picked up from the project root.
pub const CONFIG_FILE_NAME: &str = "state-scan.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Raw deserialized form of a catalogue overlay. Every key is optional;
/// absent keys leave the shipped defaults untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogDocument {
    #[serde(default, alias = "singletonAnnotations")]
    pub singleton_annotations: Vec<String>,
    #[serde(default, alias = "sessionAnnotations")]
    pub session_annotations: Vec<String>,
    #[serde(default, alias = "requestAnnotations")]
    pub request_annotations: Vec<String>,
    #[serde(default, alias = "endpointAnnotations")]
    pub endpoint_annotations: Vec<String>,
    #[serde(default, alias = "externalStateTypes")]
    pub external_state_types: Vec<String>,
    #[serde(default, alias = "serviceClientTypes")]
    pub service_client_types: Vec<String>,
    #[serde(default, alias = "grpcTypes")]
    pub grpc_types: Vec<String>,
    #[serde(default, alias = "resilienceTypes")]
    pub resilience_types: Vec<String>,
    #[serde(default, alias = "cacheTypes")]
    pub cache_types: Vec<String>,
    #[serde(default, alias = "mutableCollectionTypes")]
    pub mutable_collection_types: Vec<String>,
    #[serde(default, alias = "moduleTypes")]
    pub module_types: Vec<String>,
    #[serde(default, alias = "threadLocalTypes")]
    pub thread_local_types: Vec<String>,
    #[serde(default, alias = "fileStateTypes")]
    pub file_state_types: Vec<String>,
    #[serde(default, alias = "safeTypes")]
    pub safe_types: Vec<String>,
    #[serde(default, alias = "excludePatterns")]
    pub exclude_patterns: Vec<String>,
}

impl CatalogDocument {
    /// Parse a YAML document, warning about unknown top-level keys instead
    /// of failing on them.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let deserializer = serde_yaml::Deserializer::from_str(text);
        let mut unknown = BTreeSet::new();
        let doc = serde_ignored::deserialize(deserializer, |path| {
            unknown.insert(path.to_string());
        })?;
        for key in unknown {
            warn!(%key, "ignoring unknown configuration key");
        }
        Ok(doc)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }
}

/// Convert a class-FQN glob (`com.example.*`, `*Metrics`) into an anchored
/// regex source string.
pub fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 8);
    out.push('^');
    for ch in glob.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => {
                if regex_syntax_char(other) {
                    out.push('\\');
                }
                out.push(other);
            }
        }
    }
    out.push('$');
    out
}

fn regex_syntax_char(ch: char) -> bool {
    matches!(
        ch,
        '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '\\'
    )
}
