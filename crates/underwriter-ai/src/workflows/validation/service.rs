//! Orchestrates test-case execution: obtain a decision, map it onto the
//! requirement tree, and compare the outcome against expectations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{DataBag, DecisionResult, Outcome, RuleNode};
use super::evaluation::TreeEvaluator;
use super::summary::EvaluationSummary;
use super::validate::ValidationError;

/// Supplies underwriting decisions for a given applicant and policy payload.
///
/// Implementations may call a remote decision engine or replay canned
/// results; the service does not care which.
pub trait DecisionSource: Send + Sync {
    fn decide(
        &self,
        applicant: &DataBag,
        policy: &DataBag,
    ) -> Result<DecisionResult, DecisionSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DecisionSourceError {
    #[error("decision source unavailable: {0}")]
    Unavailable(String),
    #[error("decision payload malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TestRunError {
    #[error(transparent)]
    Decision(#[from] DecisionSourceError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub applicant_data: DataBag,
    #[serde(default)]
    pub policy_data: DataBag,
    pub expected: ExpectedResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedResult {
    pub decision: Outcome,
    #[serde(default)]
    pub risk_category: Option<i64>,
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// Outcome of running a single test case against the decision source.
#[derive(Debug, Clone, Serialize)]
pub struct TestRunRecord {
    pub case_name: String,
    pub executed_at: DateTime<Utc>,
    pub decision: DecisionResult,
    pub test_passed: bool,
    pub failure_reason: Option<String>,
    pub rules: Vec<RuleNode>,
    pub summary: EvaluationSummary,
}

pub struct ValidationService<D: DecisionSource> {
    source: Arc<D>,
    evaluator: TreeEvaluator,
}

impl<D: DecisionSource> ValidationService<D> {
    pub fn new(source: Arc<D>, evaluator: TreeEvaluator) -> Self {
        Self { source, evaluator }
    }

    /// Execute one test case: fetch the decision, map it onto the rule
    /// forest, and compare against the case's expectations.
    pub fn run(&self, case: &TestCase, rules: &[RuleNode]) -> Result<TestRunRecord, TestRunError> {
        let decision = self
            .source
            .decide(&case.applicant_data, &case.policy_data)?;
        tracing::info!(
            case = %case.name,
            outcome = %if decision.approved { "approved" } else { "rejected" },
            "decision received"
        );

        let evaluated = self.evaluator.map_decision(
            rules,
            &decision,
            &case.applicant_data,
            &case.policy_data,
            Some(case.expected.decision),
        )?;
        let summary = EvaluationSummary::from_forest(&evaluated);

        let failures = compare_expectations(&case.expected, &decision);
        let test_passed = failures.is_empty();
        let failure_reason = if test_passed {
            None
        } else {
            Some(failures.join("; "))
        };

        Ok(TestRunRecord {
            case_name: case.name.clone(),
            executed_at: Utc::now(),
            decision,
            test_passed,
            failure_reason,
            rules: evaluated,
            summary,
        })
    }
}

fn compare_expectations(expected: &ExpectedResult, decision: &DecisionResult) -> Vec<String> {
    let mut failures = Vec::new();

    let actual_outcome = decision.outcome();
    if actual_outcome != expected.decision {
        failures.push(format!(
            "Decision mismatch: expected '{expected}', got '{actual}'",
            expected = expected.decision,
            actual = actual_outcome,
        ));
    }

    if let Some(expected_risk) = expected.risk_category {
        match decision.risk_category {
            Some(actual_risk) if actual_risk == expected_risk => {}
            actual => failures.push(format!(
                "Risk category mismatch: expected {expected_risk}, got {}",
                actual.map_or_else(|| "none".to_string(), |value| value.to_string()),
            )),
        }
    }

    let missing: Vec<&str> = expected
        .reasons
        .iter()
        .filter(|wanted| {
            let wanted = wanted.to_lowercase();
            !decision
                .reasons
                .iter()
                .any(|reason| reason.to_lowercase().contains(&wanted))
        })
        .map(|wanted| wanted.as_str())
        .collect();
    if !missing.is_empty() {
        failures.push(format!("Missing expected reasons: {}", missing.join(", ")));
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_decision_produces_no_failures() {
        let expected = ExpectedResult {
            decision: Outcome::Approved,
            risk_category: Some(2),
            reasons: vec!["all criteria met".to_string()],
        };
        let decision = DecisionResult {
            approved: true,
            reasons: vec!["All criteria met for approval".to_string()],
            risk_category: Some(2),
        };
        assert!(compare_expectations(&expected, &decision).is_empty());
    }

    #[test]
    fn mismatches_are_reported_individually() {
        let expected = ExpectedResult {
            decision: Outcome::Approved,
            risk_category: Some(1),
            reasons: vec!["income verified".to_string()],
        };
        let decision = DecisionResult {
            approved: false,
            reasons: vec!["Credit score below threshold".to_string()],
            risk_category: Some(4),
        };

        let failures = compare_expectations(&expected, &decision);
        assert_eq!(failures.len(), 3);
        assert!(failures[0].contains("Decision mismatch"));
        assert!(failures[1].contains("expected 1, got 4"));
        assert!(failures[2].contains("income verified"));
    }

    #[test]
    fn absent_risk_category_reported_as_none() {
        let expected = ExpectedResult {
            decision: Outcome::Rejected,
            risk_category: Some(3),
            reasons: vec![],
        };
        let decision = DecisionResult {
            approved: false,
            reasons: vec![],
            risk_category: None,
        };

        let failures = compare_expectations(&expected, &decision);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("got none"));
    }
}
