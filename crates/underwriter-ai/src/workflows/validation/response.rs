//! Extraction of a [`DecisionResult`] from a rule-execution server response.
//!
//! The engine returns an `execution-results` envelope whose `all-facts` entry
//! lists every object left in working memory. The decision may appear as a
//! class-name-wrapped object, as a bare object with `decision`/`approved`
//! fields, or alongside a separate risk-category fact; all three shapes are
//! handled.

use serde_json::Value;

use super::domain::DecisionResult;

/// Pull the decision out of an engine response payload, if one is present.
pub fn decision_from_response(payload: &Value) -> Option<DecisionResult> {
    let results = payload
        .get("result")?
        .get("execution-results")?
        .get("results")?
        .as_array()?;

    let facts = results
        .iter()
        .find(|entry| entry.get("key").and_then(Value::as_str) == Some("all-facts"))
        .and_then(|entry| entry.get("value"))
        .and_then(Value::as_array)?;

    let mut approved: Option<bool> = None;
    let mut reasons: Vec<String> = Vec::new();
    let mut risk_category: Option<i64> = None;

    for fact in facts {
        let Some(object) = fact.as_object() else {
            continue;
        };

        for (key, value) in object {
            let Some(inner) = value.as_object() else {
                continue;
            };
            if key.contains("Decision") {
                if approved.is_none() {
                    approved = read_approved(inner);
                    reasons = read_reasons(inner);
                }
                if risk_category.is_none() {
                    risk_category = read_risk(inner, &["riskCategory"]);
                }
            } else if key.contains("RiskCategory") && risk_category.is_none() {
                risk_category = read_risk(inner, &["category", "riskCategory"]);
            }
        }

        // Bare decision objects carry the fields without a class-name wrapper.
        if approved.is_none() && (object.contains_key("decision") || object.contains_key("approved"))
        {
            approved = read_approved(object);
            reasons = read_reasons(object);
            if risk_category.is_none() {
                risk_category = read_risk(object, &["riskCategory"]);
            }
        }

        if risk_category.is_none()
            && (object.contains_key("category") || object.contains_key("riskCategory"))
        {
            risk_category = read_risk(object, &["category", "riskCategory"]);
        }
    }

    approved.map(|approved| DecisionResult {
        approved,
        reasons,
        risk_category,
    })
}

fn read_approved(object: &serde_json::Map<String, Value>) -> Option<bool> {
    match object.get("decision") {
        Some(Value::String(text)) => Some(text.eq_ignore_ascii_case("approved")),
        Some(Value::Bool(flag)) => Some(*flag),
        _ => object.get("approved").and_then(Value::as_bool),
    }
}

fn read_reasons(object: &serde_json::Map<String, Value>) -> Vec<String> {
    object
        .get("reasons")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn read_risk(object: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(Value::as_i64)
}
