use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Three-valued verdict for a single requirement.
///
/// `Unknown` means the verdict cannot be determined from the available data,
/// which is distinct from a determined failure. On the wire the verdict keeps
/// the producer's shape: `true`, `false`, or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Verdict {
    Passed,
    Failed,
    #[default]
    Unknown,
}

impl Verdict {
    pub fn is_passed(self) -> bool {
        self == Verdict::Passed
    }

    pub fn is_failed(self) -> bool {
        self == Verdict::Failed
    }

    pub const fn label(self) -> &'static str {
        match self {
            Verdict::Passed => "passed",
            Verdict::Failed => "failed",
            Verdict::Unknown => "unevaluated",
        }
    }
}

impl From<Option<bool>> for Verdict {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Verdict::Passed,
            Some(false) => Verdict::Failed,
            None => Verdict::Unknown,
        }
    }
}

impl From<bool> for Verdict {
    fn from(value: bool) -> Self {
        if value {
            Verdict::Passed
        } else {
            Verdict::Failed
        }
    }
}

impl From<Verdict> for Option<bool> {
    fn from(value: Verdict) -> Self {
        match value {
            Verdict::Passed => Some(true),
            Verdict::Failed => Some(false),
            Verdict::Unknown => None,
        }
    }
}

/// One node of the hierarchical requirement tree extracted from a policy
/// document.
///
/// Children are serialized as `dependencies` to match the extraction
/// pipeline's JSON. A node without children is a leaf carrying a directly
/// checkable condition in `expected`; a node with children is an aggregate
/// whose verdict is derived by AND-ing its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleNode {
    /// Dotted-path identifier such as `1.2.1`; encodes depth and parent.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Free-text condition this node checks, e.g. `Age >= 18`.
    #[serde(default)]
    pub expected: String,
    /// Observed-value description, populated by evaluation.
    #[serde(default)]
    pub actual: String,
    #[serde(default)]
    pub passed: Verdict,
    /// Extraction confidence in `[0, 1]`; never touched by evaluation.
    #[serde(default)]
    pub confidence: f64,
    #[serde(rename = "dependencies", default)]
    pub children: Vec<RuleNode>,
}

impl RuleNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Scalar value carried in a [`DataBag`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value; text is parsed when it holds a plain number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            FieldValue::Text(text) => text.trim().parse().ok(),
            FieldValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            FieldValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" => Some(true),
                "false" | "no" => Some(false),
                _ => None,
            },
            FieldValue::Number(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(value) => write!(f, "{value}"),
            FieldValue::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    write!(f, "{}", *value as i64)
                } else {
                    write!(f, "{value}")
                }
            }
            FieldValue::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// Flat field-name to scalar mapping assembled per evaluation call.
///
/// Keys are arbitrary producer spellings (camelCase, snake_case, or human
/// readable); lookup normalization lives in the field resolver. The backing
/// map is ordered so resolution never depends on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataBag(BTreeMap<String, FieldValue>);

impl DataBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Copy every entry of `other` into `self`, overwriting on key collision.
    pub fn extend_from(&mut self, other: &DataBag) {
        for (key, value) in other.entries() {
            self.0.insert(key.to_string(), value.clone());
        }
    }

    /// Merge applicant, policy, and decision-derived fields. Later sources win
    /// on key collision.
    pub fn combined(
        applicant: &DataBag,
        policy: &DataBag,
        decision: Option<&DecisionResult>,
    ) -> DataBag {
        let mut merged = applicant.clone();
        merged.extend_from(policy);
        if let Some(decision) = decision {
            merged.extend_from(&decision.data_fields());
        }
        merged
    }
}

impl FromIterator<(String, FieldValue)> for DataBag {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Overall application outcome as reported by the decision engine or expected
/// by a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Approved,
    Rejected,
}

impl Outcome {
    pub const fn label(self) -> &'static str {
        match self {
            Outcome::Approved => "approved",
            Outcome::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decision returned by the external rule engine. Read-only ground truth for
/// decision-sourced evaluation; never recomputed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub approved: bool,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default, rename = "riskCategory")]
    pub risk_category: Option<i64>,
}

impl DecisionResult {
    pub fn approved(risk_category: Option<i64>) -> Self {
        Self {
            approved: true,
            reasons: Vec::new(),
            risk_category,
        }
    }

    pub fn rejected(reasons: Vec<String>) -> Self {
        Self {
            approved: false,
            reasons,
            risk_category: None,
        }
    }

    pub fn outcome(&self) -> Outcome {
        if self.approved {
            Outcome::Approved
        } else {
            Outcome::Rejected
        }
    }

    /// Scalar fields contributed to the merged [`DataBag`].
    pub fn data_fields(&self) -> DataBag {
        let mut bag = DataBag::new();
        bag.insert("approved", self.approved);
        if let Some(category) = self.risk_category {
            bag.insert("riskCategory", category);
        }
        bag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verdict_round_trips_as_nullable_bool() {
        let node: RuleNode = serde_json::from_value(json!({
            "id": "1",
            "name": "Credit Check",
            "expected": "Credit Score >= 650",
            "passed": null,
            "dependencies": []
        }))
        .expect("node deserializes");

        assert_eq!(node.passed, Verdict::Unknown);

        let value = serde_json::to_value(&node).expect("node serializes");
        assert_eq!(value["passed"], json!(null));
        assert!(value["dependencies"].is_array());
    }

    #[test]
    fn combined_bag_prefers_later_sources() {
        let mut applicant = DataBag::new();
        applicant.insert("age", 25);
        applicant.insert("coverage", 100_000);

        let mut policy = DataBag::new();
        policy.insert("coverage", 250_000);

        let decision = DecisionResult::approved(Some(2));
        let merged = DataBag::combined(&applicant, &policy, Some(&decision));

        assert_eq!(merged.get("coverage"), Some(&FieldValue::Number(250_000.0)));
        assert_eq!(merged.get("riskCategory"), Some(&FieldValue::Number(2.0)));
        assert_eq!(merged.get("approved"), Some(&FieldValue::Bool(true)));
    }

    #[test]
    fn number_display_drops_integral_fraction() {
        assert_eq!(FieldValue::Number(25.0).to_string(), "25");
        assert_eq!(FieldValue::Number(0.35).to_string(), "0.35");
    }
}
