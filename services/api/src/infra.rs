use metrics_exporter_prometheus::PrometheusHandle;
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use underwriter_ai::config::AppConfig;
use underwriter_ai::error::AppError;
use underwriter_ai::workflows::validation::{
    DataBag, DecisionResult, DecisionSource, DecisionSourceError, EvaluatorConfig, Outcome,
    RuleNode, TreeEvaluator,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Replays a fixed decision; used for demos and offline test runs where no
/// rule engine is reachable.
pub(crate) struct StaticDecisionSource {
    decision: DecisionResult,
}

impl StaticDecisionSource {
    pub(crate) fn new(decision: DecisionResult) -> Self {
        Self { decision }
    }
}

impl DecisionSource for StaticDecisionSource {
    fn decide(
        &self,
        _applicant: &DataBag,
        _policy: &DataBag,
    ) -> Result<DecisionResult, DecisionSourceError> {
        Ok(self.decision.clone())
    }
}

pub(crate) fn evaluator_from_config(config: &AppConfig) -> TreeEvaluator {
    TreeEvaluator::new(EvaluatorConfig {
        max_tree_depth: config.evaluator.max_tree_depth,
        ..EvaluatorConfig::default()
    })
}

pub(crate) fn load_rules(path: &Path) -> Result<Vec<RuleNode>, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn load_data(path: &Path) -> Result<DataBag, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn parse_outcome(raw: &str) -> Result<Outcome, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "approved" | "approve" => Ok(Outcome::Approved),
        "rejected" | "reject" => Ok(Outcome::Rejected),
        other => Err(format!("unknown outcome '{other}', expected approved or rejected")),
    }
}
