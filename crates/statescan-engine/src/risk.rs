//! Risk grading: a total, deterministic function of the finding's inputs.

use statescan_catalog::LeafCategory;

use crate::report::{RiskLevel, StateType};

#[derive(Debug, Clone, Copy, Default)]
pub struct RiskInput<'a> {
    pub state_type: Option<StateType>,
    pub category: Option<LeafCategory>,
    pub is_static: bool,
    pub is_final: bool,
    pub is_mutable_collection: bool,
    pub field_type: Option<&'a str>,
    /// The evidence rests solely on a single-implementation inference.
    pub inferred: bool,
}

/// The severity table. Row order is significance order; the first matching
/// row wins.
pub fn assess(input: &RiskInput<'_>) -> RiskLevel {
    if input.inferred {
        return RiskLevel::Low;
    }
    if input.state_type == Some(StateType::External)
        || input.category == Some(LeafCategory::ExternalState)
    {
        return RiskLevel::Critical;
    }
    if input.is_static && !input.is_final {
        return RiskLevel::Critical;
    }
    if input.field_type.is_some_and(is_metric_type) {
        return RiskLevel::Medium;
    }
    if input.state_type == Some(StateType::ThreadLocal)
        || input.category == Some(LeafCategory::ThreadLocal)
    {
        return RiskLevel::High;
    }
    if input.state_type == Some(StateType::Cache) || input.category == Some(LeafCategory::Cache) {
        return RiskLevel::High;
    }
    if input.state_type == Some(StateType::Singleton) {
        return RiskLevel::High;
    }
    if input.is_static && input.is_final && input.is_mutable_collection {
        return RiskLevel::High;
    }
    if matches!(
        input.category,
        Some(LeafCategory::Resilience)
            | Some(LeafCategory::FileState)
            | Some(LeafCategory::ServiceClient)
            | Some(LeafCategory::Grpc)
    ) || matches!(
        input.state_type,
        Some(StateType::Resilience) | Some(StateType::File) | Some(StateType::Client)
    ) {
        return RiskLevel::Medium;
    }
    // Static final objects outside the collection/cache sets still pin
    // shared state, graded conservatively.
    RiskLevel::Medium
}

/// Metric instruments (counters, gauges, histograms) are process-local by
/// design and grade MEDIUM rather than CRITICAL/HIGH.
fn is_metric_type(fqn: &str) -> bool {
    if fqn.starts_with("io.micrometer.")
        || fqn.starts_with("io.prometheus.")
        || fqn.starts_with("com.codahale.metrics.")
    {
        return true;
    }
    let simple = fqn.rsplit('.').next().unwrap_or(fqn);
    ["Counter", "Gauge", "Histogram", "Meter", "Timer"]
        .iter()
        .any(|word| simple.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_non_final_is_critical() {
        let risk = assess(&RiskInput {
            state_type: Some(StateType::InMemory),
            is_static: true,
            is_final: false,
            ..RiskInput::default()
        });
        assert_eq!(risk, RiskLevel::Critical);
    }

    #[test]
    fn static_final_collection_is_high() {
        let risk = assess(&RiskInput {
            state_type: Some(StateType::InMemory),
            is_static: true,
            is_final: true,
            is_mutable_collection: true,
            field_type: Some("java.util.HashMap"),
            ..RiskInput::default()
        });
        assert_eq!(risk, RiskLevel::High);
    }

    #[test]
    fn external_state_dominates() {
        let risk = assess(&RiskInput {
            category: Some(LeafCategory::ExternalState),
            inferred: false,
            ..RiskInput::default()
        });
        assert_eq!(risk, RiskLevel::Critical);
    }

    #[test]
    fn metric_instruments_grade_medium() {
        let risk = assess(&RiskInput {
            state_type: Some(StateType::InMemory),
            is_static: true,
            is_final: true,
            field_type: Some("io.prometheus.client.Counter"),
            ..RiskInput::default()
        });
        assert_eq!(risk, RiskLevel::Medium);
    }

    #[test]
    fn inference_only_evidence_is_low() {
        let risk = assess(&RiskInput {
            category: Some(LeafCategory::ExternalState),
            inferred: true,
            ..RiskInput::default()
        });
        assert_eq!(risk, RiskLevel::Low);
    }

    #[test]
    fn assessment_is_deterministic() {
        let input = RiskInput {
            state_type: Some(StateType::Cache),
            category: Some(LeafCategory::Cache),
            is_static: true,
            is_final: true,
            is_mutable_collection: false,
            field_type: Some("com.github.benmanes.caffeine.cache.Cache"),
            inferred: false,
        };
        let first = assess(&input);
        for _ in 0..8 {
            assert_eq!(assess(&input), first);
        }
    }
}
