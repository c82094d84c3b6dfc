//! Finding and report records, serialized to the machine JSON schema.

use serde::Serialize;
use statescan_classfile::simple_name;

/// What kind of state a finding attributes to a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateType {
    InMemory,
    External,
    Cache,
    ThreadLocal,
    Session,
    File,
    Resilience,
    Client,
    Singleton,
}

/// Ordinal severity, 1 (CRITICAL) through 5 (INFO). The derived order puts
/// CRITICAL first, which is the report sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl RiskLevel {
    pub fn ordinal(self) -> u8 {
        match self {
            RiskLevel::Critical => 1,
            RiskLevel::High => 2,
            RiskLevel::Medium => 3,
            RiskLevel::Low => 4,
            RiskLevel::Info => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RiskLevel::Critical => "CRITICAL",
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
            RiskLevel::Info => "INFO",
        }
    }

    /// Is this finding at least as severe as `gate`?
    pub fn at_least(self, gate: RiskLevel) -> bool {
        self <= gate
    }
}

/// Where the scope attribution of a finding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScopeSource {
    None,
    Annotation,
    DiBinding,
    Inferred,
}

impl ScopeSource {
    pub fn is_none(&self) -> bool {
        matches!(self, ScopeSource::None)
    }
}

/// The edge kinds a reachability path may traverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    Field,
    Invocation,
    Inheritance,
    DiBinding,
}

/// One step of a reachability path. `member` and `edge` describe the edge
/// leaving this class toward the next step; the final step carries neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathStep {
    pub class_fqn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge: Option<EdgeKind>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub class_fqn: String,
    pub simple_class_name: String,
    pub state_type: StateType,
    pub risk_level: RiskLevel,
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    /// Human-readable type, e.g. `java.util.HashMap`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(skip_serializing_if = "ScopeSource::is_none")]
    pub scope_source: ScopeSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_annotation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reachability_path: Option<Vec<PathStep>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affected_endpoints: Vec<String>,
    pub description: String,
    pub recommendation: String,
    pub detector_id: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

impl Finding {
    pub fn new(
        class_fqn: impl Into<String>,
        detector_id: &'static str,
        state_type: StateType,
        risk_level: RiskLevel,
        pattern: impl Into<String>,
    ) -> Self {
        let class_fqn = class_fqn.into();
        let simple_class_name = simple_name(&class_fqn).to_string();
        Self {
            class_fqn,
            simple_class_name,
            state_type,
            risk_level,
            pattern: pattern.into(),
            field_name: None,
            field_type: None,
            scope_source: ScopeSource::None,
            scope_annotation: None,
            scope_module: None,
            reachability_path: None,
            affected_endpoints: Vec::new(),
            description: String::new(),
            recommendation: String::new(),
            detector_id,
            source_file: None,
        }
    }

    /// FQN of the path leaf, when this finding carries a path.
    pub fn leaf_fqn(&self) -> Option<&str> {
        self.reachability_path
            .as_ref()
            .and_then(|steps| steps.last())
            .map(|step| step.class_fqn.as_str())
    }
}

/// Per-class roll-up for grouped display.
#[derive(Debug, Clone)]
pub struct ClassSummary {
    pub class_fqn: String,
    pub highest_risk: RiskLevel,
    pub finding_count: usize,
    /// Unique affected fields with the highest severity among their findings.
    pub fields: Vec<(String, RiskLevel)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanMetadata {
    pub project_path: String,
    /// RFC 3339 / ISO-8601 timestamp.
    pub scan_date: String,
    pub classes_scanned: usize,
    pub archives_scanned: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
    pub total: usize,
}

impl ScanSummary {
    pub fn count(&mut self, risk: RiskLevel) {
        match risk {
            RiskLevel::Critical => self.critical += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
            RiskLevel::Info => self.info += 1,
        }
        self.total += 1;
    }
}

#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub metadata: ScanMetadata,
    pub summary: ScanSummary,
    pub findings: Vec<Finding>,
    #[serde(skip)]
    pub class_summaries: Vec<ClassSummary>,
}

impl ScanReport {
    /// Most severe finding in the report, if any.
    pub fn highest_risk(&self) -> Option<RiskLevel> {
        self.findings.iter().map(|f| f.risk_level).min()
    }

    /// Does any finding reach the `fail_on` gate?
    pub fn exceeds_gate(&self, gate: RiskLevel) -> bool {
        self.highest_risk()
            .is_some_and(|risk| risk.at_least(gate))
    }
}
