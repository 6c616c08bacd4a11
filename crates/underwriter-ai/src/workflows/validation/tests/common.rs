use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::workflows::validation::domain::{DataBag, DecisionResult, RuleNode, Verdict};
use crate::workflows::validation::evaluation::{EvaluatorConfig, TreeEvaluator};
use crate::workflows::validation::service::{DecisionSource, DecisionSourceError};

pub(super) fn node(id: &str, name: &str, expected: &str, children: Vec<RuleNode>) -> RuleNode {
    RuleNode {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        expected: expected.to_string(),
        actual: String::new(),
        passed: Verdict::Unknown,
        confidence: 0.95,
        children,
    }
}

/// Two-root requirement forest mirroring a typical extracted policy:
/// eligibility with nested income checks, plus a standalone credit gate.
pub(super) fn sample_forest() -> Vec<RuleNode> {
    vec![
        node(
            "1",
            "Eligibility Check",
            "All criteria met",
            vec![
                node("1.1", "Age Verification", "Age >= 18", vec![]),
                node(
                    "1.2",
                    "Income Verification",
                    "Income >= $50,000",
                    vec![node(
                        "1.2.1",
                        "Employment Status",
                        "Employment Status is employed",
                        vec![],
                    )],
                ),
            ],
        ),
        node("2", "Credit Check", "Credit Score >= 650", vec![]),
    ]
}

pub(super) fn applicant_data() -> DataBag {
    let mut bag = DataBag::new();
    bag.insert("age", 25);
    bag.insert("income", 60_000);
    bag.insert("employmentStatus", "employed");
    bag
}

pub(super) fn policy_data() -> DataBag {
    let mut bag = DataBag::new();
    bag.insert("creditScore", 700);
    bag
}

pub(super) fn evaluator() -> TreeEvaluator {
    TreeEvaluator::new(EvaluatorConfig::default())
}

pub(super) fn find<'a>(forest: &'a [RuleNode], id: &str) -> &'a RuleNode {
    fn search<'a>(nodes: &'a [RuleNode], id: &str) -> Option<&'a RuleNode> {
        for node in nodes {
            if node.id == id {
                return Some(node);
            }
            if let Some(found) = search(&node.children, id) {
                return Some(found);
            }
        }
        None
    }
    search(forest, id).unwrap_or_else(|| panic!("rule {id} present"))
}

pub(super) fn rejection(reason: &str) -> DecisionResult {
    DecisionResult {
        approved: false,
        reasons: vec![reason.to_string()],
        risk_category: Some(4),
    }
}

/// Replays a canned decision; stands in for the remote rule engine.
pub(super) struct CannedDecisions {
    decision: DecisionResult,
}

impl CannedDecisions {
    pub(super) fn new(decision: DecisionResult) -> Arc<Self> {
        Arc::new(Self { decision })
    }
}

impl DecisionSource for CannedDecisions {
    fn decide(
        &self,
        _applicant: &DataBag,
        _policy: &DataBag,
    ) -> Result<DecisionResult, DecisionSourceError> {
        Ok(self.decision.clone())
    }
}

pub(super) struct UnavailableEngine;

impl DecisionSource for UnavailableEngine {
    fn decide(
        &self,
        _applicant: &DataBag,
        _policy: &DataBag,
    ) -> Result<DecisionResult, DecisionSourceError> {
        Err(DecisionSourceError::Unavailable(
            "engine offline".to_string(),
        ))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
