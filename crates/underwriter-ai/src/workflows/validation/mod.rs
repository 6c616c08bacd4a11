//! Hierarchical underwriting-rule validation.
//!
//! A policy's requirement tree is evaluated either directly against applicant
//! and policy data, or by reconciling it with a decision returned by the rule
//! engine. Both paths share the same aggregation: a parent passes only when
//! every child does.

pub mod condition;
pub mod domain;
pub mod evaluation;
pub mod fields;
pub mod report;
pub mod response;
pub mod router;
pub mod service;
pub mod summary;
pub mod validate;

pub use domain::{DataBag, DecisionResult, FieldValue, Outcome, RuleNode, Verdict};
pub use evaluation::{EvaluatorConfig, TreeEvaluator};
pub use fields::FieldAliases;
pub use report::{render_csv, write_csv, ReportError};
pub use response::decision_from_response;
pub use router::{validation_router, EvaluateRequest, EvaluateResponse};
pub use service::{
    DecisionSource, DecisionSourceError, ExpectedResult, TestCase, TestRunError, TestRunRecord,
    ValidationService,
};
pub use summary::{EvaluationSummary, FailedRule};
pub use validate::ValidationError;

#[cfg(test)]
mod tests;
