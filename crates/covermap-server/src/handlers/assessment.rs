//! Stateless assessment handler

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};

use super::questionnaires::read_answers;
use crate::{caller_identity, AppError, AppState};
use covermap_core::{evaluate, AssessmentResult, AuditSubject, Context};

/// POST /api/assess - Evaluate answers without storing them
pub async fn assess_answers(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<AssessmentResult>, AppError> {
    let caller = caller_identity(request.headers());
    let req = read_answers(request).await?;

    let assessment = evaluate(&Context::from_values(&req.answers));

    state.db.log_audit(
        &caller,
        "assess",
        AuditSubject::Assessment,
        Some(&format!(
            "keys={}, overall={}",
            req.answers.len(),
            assessment.overall_risk_score
        )),
    )?;

    Ok(Json(assessment))
}
