//! Questionnaire handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{caller_identity, AppError, AppState, MAX_BODY_SIZE};
use covermap_core::models::{AuditSubject, Questionnaire, QuestionnaireWithAnswers, Report};

/// Request body carrying a batch of answers
#[derive(Debug, Deserialize)]
pub struct AnswersRequest {
    pub answers: BTreeMap<String, Value>,
}

/// Query parameters for completing a questionnaire
#[derive(Debug, Deserialize)]
pub struct CompleteQuery {
    /// Include generated advice in the report (default: true)
    #[serde(default = "default_true")]
    pub advice: bool,
}

fn default_true() -> bool {
    true
}

/// Read and decode an `{"answers": {...}}` body
pub(crate) async fn read_answers(request: Request) -> Result<AnswersRequest, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;

    serde_json::from_slice(&bytes)
        .map_err(|_| AppError::bad_request("Expected a JSON object with an \"answers\" object"))
}

/// POST /api/questionnaires - Start a questionnaire for the caller
pub async fn create_questionnaire(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Questionnaire>, AppError> {
    let caller = caller_identity(request.headers());

    let questionnaire = state.db.create_questionnaire(&caller)?;

    state.db.log_audit(
        &caller,
        "create",
        AuditSubject::Questionnaire(questionnaire.id),
        None,
    )?;

    Ok(Json(questionnaire))
}

/// GET /api/questionnaires - List the caller's questionnaires
pub async fn list_questionnaires(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Questionnaire>>, AppError> {
    let caller = caller_identity(request.headers());

    let questionnaires = state.db.list_questionnaires(&caller)?;

    state.db.log_audit(
        &caller,
        "list",
        AuditSubject::Questionnaires,
        Some(&format!("count={}", questionnaires.len())),
    )?;

    Ok(Json(questionnaires))
}

/// GET /api/questionnaires/:id - Questionnaire with its decoded answers
pub async fn get_questionnaire(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<QuestionnaireWithAnswers>, AppError> {
    let caller = caller_identity(request.headers());

    let questionnaire = state
        .db
        .get_questionnaire(id, &caller)
        .map_err(AppError::from_core)?;
    let answers = state.db.get_answer_values(id)?;

    state
        .db
        .log_audit(&caller, "get", AuditSubject::Questionnaire(id), None)?;

    Ok(Json(QuestionnaireWithAnswers::new(&questionnaire, answers)))
}

/// PUT /api/questionnaires/:id/answers - Upsert a batch of answers
pub async fn update_answers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<QuestionnaireWithAnswers>, AppError> {
    let caller = caller_identity(request.headers());
    let req = read_answers(request).await?;

    // Ownership check before writing
    state
        .db
        .get_questionnaire(id, &caller)
        .map_err(AppError::from_core)?;

    state
        .db
        .upsert_answers(id, &req.answers)
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &caller,
        "update_answers",
        AuditSubject::Questionnaire(id),
        Some(&format!("keys={}", req.answers.len())),
    )?;

    let questionnaire = state
        .db
        .get_questionnaire(id, &caller)
        .map_err(AppError::from_core)?;
    let answers = state.db.get_answer_values(id)?;

    Ok(Json(QuestionnaireWithAnswers::new(&questionnaire, answers)))
}

/// POST /api/questionnaires/:id/complete - Evaluate, mark completed, return the report
pub async fn complete_questionnaire(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<CompleteQuery>,
    request: Request,
) -> Result<Json<Report>, AppError> {
    let caller = caller_identity(request.headers());

    let report = covermap_core::complete_questionnaire(
        &state.db,
        state.ai.as_ref(),
        id,
        &caller,
        params.advice,
    )
    .await
    .map_err(AppError::from_core)?;

    state.db.log_audit(
        &caller,
        "complete",
        AuditSubject::Questionnaire(id),
        Some(&format!(
            "overall={}",
            report.assessment.overall_risk_score
        )),
    )?;

    Ok(Json(report))
}
