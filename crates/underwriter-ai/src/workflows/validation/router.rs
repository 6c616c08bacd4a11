//! HTTP surface for rule evaluation.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{DataBag, DecisionResult, Outcome, RuleNode};
use super::evaluation::TreeEvaluator;
use super::report;
use super::summary::EvaluationSummary;
use super::validate::ValidationError;

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub rules: Vec<RuleNode>,
    #[serde(default)]
    pub applicant_data: DataBag,
    #[serde(default)]
    pub policy_data: DataBag,
    #[serde(default)]
    pub decision: Option<DecisionResult>,
    #[serde(default)]
    pub expected_outcome: Option<Outcome>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub rules: Vec<RuleNode>,
    pub summary: EvaluationSummary,
}

pub fn validation_router(evaluator: Arc<TreeEvaluator>) -> Router {
    Router::new()
        .route("/api/v1/validation/evaluate", post(evaluate_handler))
        .route("/api/v1/validation/report", post(report_handler))
        .with_state(evaluator)
}

fn run_evaluation(
    evaluator: &TreeEvaluator,
    request: &EvaluateRequest,
) -> Result<EvaluateResponse, ValidationError> {
    let rules = match &request.decision {
        Some(decision) => evaluator.map_decision(
            &request.rules,
            decision,
            &request.applicant_data,
            &request.policy_data,
            request.expected_outcome,
        )?,
        None => evaluator.evaluate_direct(
            &request.rules,
            &request.applicant_data,
            &request.policy_data,
        )?,
    };
    let summary = EvaluationSummary::from_forest(&rules);
    Ok(EvaluateResponse { rules, summary })
}

fn rejection(error: &ValidationError) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": error.to_string() })),
    )
        .into_response()
}

pub(crate) async fn evaluate_handler(
    State(evaluator): State<Arc<TreeEvaluator>>,
    Json(request): Json<EvaluateRequest>,
) -> Response {
    match run_evaluation(&evaluator, &request) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(error) => {
            tracing::warn!(%error, "evaluation request rejected");
            rejection(&error)
        }
    }
}

pub(crate) async fn report_handler(
    State(evaluator): State<Arc<TreeEvaluator>>,
    Json(request): Json<EvaluateRequest>,
) -> Response {
    let evaluated = match run_evaluation(&evaluator, &request) {
        Ok(response) => response,
        Err(error) => {
            tracing::warn!(%error, "report request rejected");
            return rejection(&error);
        }
    };

    match report::render_csv(&evaluated.rules, &evaluated.summary) {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"validation-report.csv\"",
                ),
            ],
            body,
        )
            .into_response(),
        Err(error) => {
            tracing::error!(%error, "report rendering failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response()
        }
    }
}
