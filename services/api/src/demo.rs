use crate::infra::{load_data, load_rules, parse_outcome, StaticDecisionSource};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use underwriter_ai::error::AppError;
use underwriter_ai::workflows::validation::{
    render_csv, DataBag, DecisionResult, EvaluationSummary, ExpectedResult, Outcome, RuleNode,
    TestCase, TreeEvaluator, ValidationService, Verdict,
};

#[derive(Args, Debug)]
pub(crate) struct ValidationReportArgs {
    /// JSON file holding the requirement tree to evaluate
    #[arg(long)]
    pub(crate) rules: PathBuf,
    /// JSON file with applicant fields (flat object)
    #[arg(long)]
    pub(crate) applicant: Option<PathBuf>,
    /// JSON file with policy fields (flat object)
    #[arg(long)]
    pub(crate) policy: Option<PathBuf>,
    /// Write the CSV report to this path instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Expected outcome for the decision-mapping portion of the demo
    #[arg(long, value_parser = parse_outcome)]
    pub(crate) expected: Option<Outcome>,
    /// Write the demo's CSV report to this path
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Skip the decision-mapping portion of the demo
    #[arg(long)]
    pub(crate) skip_decision: bool,
}

pub(crate) fn run_validation_report(args: ValidationReportArgs) -> Result<(), AppError> {
    let ValidationReportArgs {
        rules,
        applicant,
        policy,
        output,
    } = args;

    let rules = load_rules(&rules)?;
    let applicant = applicant.as_deref().map(load_data).transpose()?.unwrap_or_default();
    let policy = policy.as_deref().map(load_data).transpose()?.unwrap_or_default();

    let evaluator = TreeEvaluator::default();
    let evaluated = evaluator.evaluate_direct(&rules, &applicant, &policy)?;
    let summary = EvaluationSummary::from_forest(&evaluated);
    let report = render_csv(&evaluated, &summary)?;

    match output {
        Some(path) => {
            fs::write(&path, report)?;
            println!("Report written to {}", path.display());
        }
        None => print!("{report}"),
    }

    render_forest(&evaluated);
    render_summary(&summary);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        expected,
        output,
        skip_decision,
    } = args;

    println!("Underwriting validation demo");

    let rules = sample_rules();
    let applicant = sample_applicant();
    let evaluator = TreeEvaluator::default();

    println!("\nDirect evaluation against applicant data");
    let evaluated = evaluator.evaluate_direct(&rules, &applicant, &DataBag::new())?;
    render_forest(&evaluated);
    let summary = EvaluationSummary::from_forest(&evaluated);
    render_summary(&summary);

    if let Some(path) = &output {
        fs::write(path, render_csv(&evaluated, &summary)?)?;
        println!("Report written to {}", path.display());
    }

    if skip_decision {
        return Ok(());
    }

    println!("\nDecision-sourced mapping (canned engine rejection)");
    let decision = DecisionResult {
        approved: false,
        reasons: vec!["Credit score below minimum threshold".to_string()],
        risk_category: Some(4),
    };
    let expected = expected.unwrap_or(Outcome::Rejected);
    let service = ValidationService::new(
        Arc::new(StaticDecisionSource::new(decision)),
        TreeEvaluator::default(),
    );
    let case = TestCase {
        name: "demo applicant".to_string(),
        description: "Applicant below the credit threshold".to_string(),
        applicant_data: applicant,
        policy_data: DataBag::new(),
        expected: ExpectedResult {
            decision: expected,
            risk_category: Some(4),
            reasons: vec!["credit score".to_string()],
        },
    };

    let record = match service.run(&case, &rules) {
        Ok(record) => record,
        Err(err) => {
            println!("  Case execution failed: {err}");
            return Ok(());
        }
    };

    println!(
        "- Case '{}' executed at {}",
        record.case_name,
        record.executed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "- Engine outcome: {} (risk category {})",
        record.decision.outcome(),
        record
            .decision
            .risk_category
            .map_or_else(|| "none".to_string(), |value| value.to_string())
    );
    match &record.failure_reason {
        None => println!("- Expectations met"),
        Some(reason) => println!("- Expectations missed: {reason}"),
    }
    render_forest(&record.rules);
    render_summary(&record.summary);

    Ok(())
}

fn sample_rules() -> Vec<RuleNode> {
    let leaf = |id: &str, name: &str, expected: &str| RuleNode {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        expected: expected.to_string(),
        actual: String::new(),
        passed: Verdict::Unknown,
        confidence: 0.9,
        children: Vec::new(),
    };

    vec![
        RuleNode {
            children: vec![
                leaf("1.1", "Age Verification", "Age >= 18"),
                leaf("1.2", "Income Verification", "Income >= $50,000"),
            ],
            ..leaf("1", "Eligibility Check", "All criteria met")
        },
        leaf("2", "Credit Check", "Credit Score >= 650"),
    ]
}

fn sample_applicant() -> DataBag {
    let mut bag = DataBag::new();
    bag.insert("age", 25);
    bag.insert("income", 60_000);
    bag.insert("creditScore", 600);
    bag
}

fn render_forest(rules: &[RuleNode]) {
    for rule in rules {
        render_rule(rule, 0);
    }
}

fn render_rule(rule: &RuleNode, depth: usize) {
    let marker = match rule.passed {
        Verdict::Passed => "PASS",
        Verdict::Failed => "FAIL",
        Verdict::Unknown => "????",
    };
    println!(
        "{indent}[{marker}] {id} {name}: expected '{expected}', actual '{actual}'",
        indent = "  ".repeat(depth),
        id = rule.id,
        name = rule.name,
        expected = rule.expected,
        actual = rule.actual,
    );
    for child in &rule.children {
        render_rule(child, depth + 1);
    }
}

fn render_summary(summary: &EvaluationSummary) {
    println!(
        "Summary: {}/{} passed ({}%), {} failed, {} unevaluated",
        summary.passed, summary.total, summary.pass_rate, summary.failed, summary.unevaluated
    );
    for failure in &summary.failed_rules {
        println!(
            "  - {} {}: expected '{}', actual '{}'",
            failure.id, failure.name, failure.expected, failure.actual
        );
    }
}
