use serde::{Deserialize, Serialize};

use super::domain::{RuleNode, Verdict};

/// Failed requirement surfaced in the evaluation summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedRule {
    pub id: String,
    pub name: String,
    pub expected: String,
    pub actual: String,
}

/// Flattened pass/fail statistics over an evaluated forest.
///
/// Every node is counted, not just leaves. `pass_rate` is a percentage
/// rounded to two decimals and defined as `0.0` for an empty forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub unevaluated: usize,
    pub pass_rate: f64,
    pub failed_rules: Vec<FailedRule>,
}

impl EvaluationSummary {
    pub fn from_forest(rules: &[RuleNode]) -> Self {
        let mut summary = Self {
            total: 0,
            passed: 0,
            failed: 0,
            unevaluated: 0,
            pass_rate: 0.0,
            failed_rules: Vec::new(),
        };

        for rule in rules {
            summary.count(rule);
        }

        if summary.total > 0 {
            let rate = summary.passed as f64 / summary.total as f64 * 100.0;
            summary.pass_rate = (rate * 100.0).round() / 100.0;
        }

        summary
    }

    fn count(&mut self, rule: &RuleNode) {
        self.total += 1;
        match rule.passed {
            Verdict::Passed => self.passed += 1,
            Verdict::Failed => {
                self.failed += 1;
                self.failed_rules.push(FailedRule {
                    id: rule.id.clone(),
                    name: rule.name.clone(),
                    expected: rule.expected.clone(),
                    actual: rule.actual.clone(),
                });
            }
            Verdict::Unknown => self.unevaluated += 1,
        }

        for child in &rule.children {
            self.count(child);
        }
    }
}
