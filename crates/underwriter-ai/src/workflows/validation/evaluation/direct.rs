//! Direct re-evaluation of a leaf condition against the merged data bag.

use crate::workflows::validation::condition::{self, ComparisonOp, Operand, ParsedCondition};
use crate::workflows::validation::domain::{DataBag, FieldValue, Verdict};
use crate::workflows::validation::fields::{title_case, FieldAliases};

pub(crate) const PLACEHOLDER: &str = "To be evaluated";

const AGGREGATE_PHRASES: [&str; 3] = ["all checks pass", "all criteria met", "all requirements met"];

/// Evaluate one node's expected condition, returning the actual-value
/// description and verdict.
///
/// Missing fields fail the node rather than raising; unparseable conditions
/// stay `Unknown` so child aggregation or human review can settle them.
pub(crate) fn evaluate_leaf(
    expected: &str,
    data: &DataBag,
    aliases: &FieldAliases,
) -> (String, Verdict) {
    let trimmed = expected.trim();
    if trimmed.is_empty() || trimmed == PLACEHOLDER {
        return ("Not evaluated".to_string(), Verdict::Unknown);
    }

    if let Some(parsed) = condition::parse(trimmed) {
        return apply_condition(&parsed, data, aliases);
    }

    let lower = trimmed.to_lowercase();
    if AGGREGATE_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        return (
            "Evaluated based on sub-requirements".to_string(),
            Verdict::Unknown,
        );
    }

    (format!("Condition: {trimmed}"), Verdict::Unknown)
}

fn apply_condition(
    parsed: &ParsedCondition,
    data: &DataBag,
    aliases: &FieldAliases,
) -> (String, Verdict) {
    let title = title_case(&parsed.field);
    let Some(value) = aliases.resolve(&parsed.field, data) else {
        return (format!("{title} not provided"), Verdict::Failed);
    };

    let actual = format!("{title} = {value}");
    let verdict = match parsed.op {
        ComparisonOp::Between => between_verdict(parsed, value),
        op => Verdict::from(compare(value, op, &parsed.operand)),
    };

    (actual, verdict)
}

fn between_verdict(parsed: &ParsedCondition, value: &FieldValue) -> Verdict {
    let (Operand::Number(low), Some(high)) = (&parsed.operand, parsed.operand2) else {
        return Verdict::Unknown;
    };
    match value.as_number() {
        Some(actual) => Verdict::from(*low <= actual && actual <= high),
        // Coercion failure is contained: the node stays undetermined.
        None => Verdict::Unknown,
    }
}

/// Compare an observed value against an expected operand.
///
/// Numeric comparison is attempted first; text falls back to lowercase
/// lexicographic order. `None` means the pair is not comparable at all
/// (e.g. a boolean against a number).
pub(crate) fn compare(actual: &FieldValue, op: ComparisonOp, expected: &Operand) -> Option<bool> {
    match expected {
        Operand::Number(target) => match actual.as_number() {
            Some(number) => Some(op.holds(&number, target)),
            None => match actual {
                FieldValue::Text(text) => Some(op.holds(
                    &text.to_lowercase(),
                    &FieldValue::Number(*target).to_string(),
                )),
                _ => None,
            },
        },
        Operand::Text(target) => {
            Some(op.holds(&actual.to_string().to_lowercase(), &target.to_lowercase()))
        }
        Operand::Bool(target) => actual.as_bool().map(|value| value == *target),
    }
}
