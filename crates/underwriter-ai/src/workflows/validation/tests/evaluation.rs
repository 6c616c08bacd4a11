use super::common::*;

use crate::workflows::validation::domain::{DataBag, Verdict};
use crate::workflows::validation::summary::EvaluationSummary;

#[test]
fn qualified_applicant_passes_every_rule() {
    let evaluated = evaluator()
        .evaluate_direct(&sample_forest(), &applicant_data(), &policy_data())
        .expect("forest is valid");

    assert_eq!(find(&evaluated, "1.1").actual, "Age = 25");
    assert_eq!(find(&evaluated, "1.1").passed, Verdict::Passed);
    assert_eq!(find(&evaluated, "1.2").actual, "Income = 60000");
    assert_eq!(find(&evaluated, "1.2.1").passed, Verdict::Passed);
    assert_eq!(find(&evaluated, "2").actual, "Credit Score = 700");
    assert_eq!(find(&evaluated, "2").passed, Verdict::Passed);

    // Aggregate root has no checkable condition of its own; it inherits
    // success from its children.
    let root = find(&evaluated, "1");
    assert_eq!(root.passed, Verdict::Passed);
    assert_eq!(root.actual, "All sub-requirements passed");

    let summary = EvaluationSummary::from_forest(&evaluated);
    assert_eq!(summary.total, 5);
    assert_eq!(summary.passed, 5);
    assert_eq!(summary.pass_rate, 100.0);
    assert!(summary.failed_rules.is_empty());
}

#[test]
fn underage_applicant_fails_age_and_eligibility() {
    let mut applicant = applicant_data();
    applicant.insert("age", 16);

    let evaluated = evaluator()
        .evaluate_direct(&sample_forest(), &applicant, &policy_data())
        .expect("forest is valid");

    let age = find(&evaluated, "1.1");
    assert_eq!(age.actual, "Age = 16");
    assert_eq!(age.passed, Verdict::Failed);

    let root = find(&evaluated, "1");
    assert_eq!(root.passed, Verdict::Failed);
    assert_eq!(root.actual, "Failed sub-requirements: Age Verification");

    // The sibling credit root is unaffected.
    assert_eq!(find(&evaluated, "2").passed, Verdict::Passed);

    let summary = EvaluationSummary::from_forest(&evaluated);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.pass_rate, 60.0);
    let failed_ids: Vec<&str> = summary
        .failed_rules
        .iter()
        .map(|failure| failure.id.as_str())
        .collect();
    assert_eq!(failed_ids, ["1", "1.1"]);
}

#[test]
fn missing_field_fails_rather_than_erroring() {
    let evaluated = evaluator()
        .evaluate_direct(&sample_forest(), &applicant_data(), &DataBag::new())
        .expect("forest is valid");

    let credit = find(&evaluated, "2");
    assert_eq!(credit.actual, "Credit Score not provided");
    assert_eq!(credit.passed, Verdict::Failed);
}

#[test]
fn unparseable_condition_stays_unevaluated() {
    let forest = vec![node(
        "1",
        "Manual Review",
        "Underwriter signs off on file",
        vec![],
    )];

    let evaluated = evaluator()
        .evaluate_direct(&forest, &applicant_data(), &policy_data())
        .expect("forest is valid");

    let rule = find(&evaluated, "1");
    assert_eq!(rule.actual, "Condition: Underwriter signs off on file");
    assert_eq!(rule.passed, Verdict::Unknown);

    let summary = EvaluationSummary::from_forest(&evaluated);
    assert_eq!(summary.unevaluated, 1);
    assert_eq!(summary.pass_rate, 0.0);
}

#[test]
fn placeholder_condition_is_skipped() {
    let forest = vec![node("1", "Pending Rule", "To be evaluated", vec![])];

    let evaluated = evaluator()
        .evaluate_direct(&forest, &DataBag::new(), &DataBag::new())
        .expect("forest is valid");

    assert_eq!(find(&evaluated, "1").actual, "Not evaluated");
    assert_eq!(find(&evaluated, "1").passed, Verdict::Unknown);
}

#[test]
fn applicant_data_wins_over_policy_on_collision() {
    let mut applicant = DataBag::new();
    applicant.insert("age", 17);
    let mut policy = DataBag::new();
    policy.insert("age", 40);

    let forest = vec![node("1", "Age Verification", "Age >= 18", vec![])];
    let evaluated = evaluator()
        .evaluate_direct(&forest, &applicant, &policy)
        .expect("forest is valid");

    // Policy fields are merged after applicant fields.
    assert_eq!(find(&evaluated, "1").actual, "Age = 40");
    assert_eq!(find(&evaluated, "1").passed, Verdict::Passed);
}

#[test]
fn evaluation_is_idempotent_and_leaves_input_untouched() {
    let forest = sample_forest();
    let snapshot = forest.clone();
    let evaluator = evaluator();

    let first = evaluator
        .evaluate_direct(&forest, &applicant_data(), &policy_data())
        .expect("forest is valid");
    let second = evaluator
        .evaluate_direct(&forest, &applicant_data(), &policy_data())
        .expect("forest is valid");

    assert_eq!(first, second);
    assert_eq!(forest, snapshot);
}
