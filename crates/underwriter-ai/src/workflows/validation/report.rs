//! CSV rendering of an evaluated requirement forest for reporting consumers.

use std::io::Write;

use super::domain::RuleNode;
use super::summary::EvaluationSummary;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Csv(#[from] csv::Error),
    #[error("report is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Write one row per rule in traversal order, followed by a summary block.
pub fn write_csv<W: Write>(
    writer: W,
    rules: &[RuleNode],
    summary: &EvaluationSummary,
) -> Result<(), ReportError> {
    let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    csv_writer.write_record(["id", "name", "expected", "actual", "status", "confidence"])?;
    for rule in rules {
        write_rule(&mut csv_writer, rule)?;
    }

    csv_writer.write_record([""])?;
    csv_writer.write_record(["total", &summary.total.to_string()])?;
    csv_writer.write_record(["passed", &summary.passed.to_string()])?;
    csv_writer.write_record(["failed", &summary.failed.to_string()])?;
    csv_writer.write_record(["unevaluated", &summary.unevaluated.to_string()])?;
    csv_writer.write_record(["pass_rate", &format!("{:.2}", summary.pass_rate)])?;

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Render the report into a string, for HTTP responses and CLI output.
pub fn render_csv(rules: &[RuleNode], summary: &EvaluationSummary) -> Result<String, ReportError> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, rules, summary)?;
    Ok(String::from_utf8(buffer)?)
}

fn write_rule<W: Write>(writer: &mut csv::Writer<W>, rule: &RuleNode) -> Result<(), ReportError> {
    writer.write_record([
        rule.id.as_str(),
        rule.name.as_str(),
        rule.expected.as_str(),
        rule.actual.as_str(),
        rule.passed.label(),
        &format!("{:.2}", rule.confidence),
    ])?;
    for child in &rule.children {
        write_rule(writer, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::validation::domain::Verdict;

    fn rule(id: &str, passed: Verdict, children: Vec<RuleNode>) -> RuleNode {
        RuleNode {
            id: id.to_string(),
            name: format!("Rule {id}"),
            description: String::new(),
            expected: "Age >= 18".to_string(),
            actual: "Age = 25".to_string(),
            passed,
            confidence: 0.9,
            children,
        }
    }

    #[test]
    fn renders_rows_in_traversal_order_with_summary_block() {
        let forest = vec![rule(
            "1",
            Verdict::Failed,
            vec![
                rule("1.1", Verdict::Passed, vec![]),
                rule("1.2", Verdict::Failed, vec![]),
            ],
        )];
        let summary = EvaluationSummary::from_forest(&forest);

        let rendered = render_csv(&forest, &summary).expect("report renders");
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "id,name,expected,actual,status,confidence");
        assert!(lines[1].starts_with("1,Rule 1"));
        assert!(lines[2].starts_with("1.1,"));
        assert!(lines[3].starts_with("1.2,"));
        assert!(rendered.contains("pass_rate,33.33"));
        assert!(rendered.contains("failed,2"));
    }

    #[test]
    fn empty_forest_still_produces_summary() {
        let summary = EvaluationSummary::from_forest(&[]);
        let rendered = render_csv(&[], &summary).expect("report renders");
        assert!(rendered.contains("total,0"));
        assert!(rendered.contains("pass_rate,0.00"));
    }
}
