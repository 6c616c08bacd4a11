mod decision;
mod direct;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{DataBag, DecisionResult, Outcome, RuleNode, Verdict};
use super::fields::FieldAliases;
use super::validate::{self, ValidationError};

/// Settings injected into the tree evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Synonym table used by field resolution.
    #[serde(default)]
    pub aliases: FieldAliases,
    /// Hard bound on tree depth; deeper input is rejected before traversal.
    #[serde(default = "EvaluatorConfig::default_max_tree_depth")]
    pub max_tree_depth: usize,
}

impl EvaluatorConfig {
    pub fn default_max_tree_depth() -> usize {
        32
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            aliases: FieldAliases::default(),
            max_tree_depth: Self::default_max_tree_depth(),
        }
    }
}

/// Stateless evaluator annotating a requirement forest with verdicts.
///
/// Both entry points validate the forest, work on a deep copy, and apply the
/// same post-order aggregation: a failing child always forces its parent to
/// fail, and a parent left `Unknown` by its own condition inherits success
/// from all-passing children. The caller's forest is never mutated.
pub struct TreeEvaluator {
    config: EvaluatorConfig,
}

impl TreeEvaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Re-evaluate every leaf condition directly against applicant and policy
    /// data. Used when no engine decision is available.
    pub fn evaluate_direct(
        &self,
        rules: &[RuleNode],
        applicant: &DataBag,
        policy: &DataBag,
    ) -> Result<Vec<RuleNode>, ValidationError> {
        validate::check_forest(rules, self.config.max_tree_depth)?;
        let data = DataBag::combined(applicant, policy, None);

        let mut evaluated = rules.to_vec();
        for rule in &mut evaluated {
            self.walk(rule, &|node| {
                direct::evaluate_leaf(&node.expected, &data, &self.config.aliases)
            });
        }
        Ok(evaluated)
    }

    /// Infer per-node verdicts from an engine decision without re-running
    /// business logic. `expected_outcome` is the test case's intent and
    /// disambiguates whether a mentioned rule fired correctly.
    pub fn map_decision(
        &self,
        rules: &[RuleNode],
        decision: &DecisionResult,
        applicant: &DataBag,
        policy: &DataBag,
        expected_outcome: Option<Outcome>,
    ) -> Result<Vec<RuleNode>, ValidationError> {
        validate::check_forest(rules, self.config.max_tree_depth)?;
        let data = DataBag::combined(applicant, policy, Some(decision));

        let mut evaluated = rules.to_vec();
        for rule in &mut evaluated {
            self.walk(rule, &|node| {
                decision::map_leaf(node, &data, decision, expected_outcome, &self.config.aliases)
            });
        }
        Ok(evaluated)
    }

    fn walk(&self, node: &mut RuleNode, leaf: &dyn Fn(&RuleNode) -> (String, Verdict)) {
        let (actual, own_verdict) = leaf(node);
        node.actual = actual;
        node.passed = own_verdict;

        if node.children.is_empty() {
            return;
        }

        for child in &mut node.children {
            self.walk(child, leaf);
        }

        let all_children_passed = node.children.iter().all(|child| child.passed.is_passed());
        if !all_children_passed {
            // Hierarchical integrity: a failing child always fails the parent,
            // regardless of the parent's own leaf verdict.
            node.passed = Verdict::Failed;
            let failing: Vec<&str> = node
                .children
                .iter()
                .filter(|child| child.passed.is_failed())
                .map(|child| {
                    if child.name.is_empty() {
                        child.id.as_str()
                    } else {
                        child.name.as_str()
                    }
                })
                .collect();
            if !failing.is_empty() {
                node.actual = format!("Failed sub-requirements: {}", failing.join(", "));
            }
            debug!(rule_id = %node.id, "child failure propagated to parent");
        } else if own_verdict == Verdict::Unknown {
            node.passed = Verdict::Passed;
            node.actual = "All sub-requirements passed".to_string();
        }
    }
}

impl Default for TreeEvaluator {
    fn default() -> Self {
        Self::new(EvaluatorConfig::default())
    }
}
