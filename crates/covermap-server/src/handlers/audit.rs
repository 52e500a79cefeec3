//! Audit trail handler

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use serde::Deserialize;

use crate::{caller_identity, AppError, AppState, MAX_PAGE_LIMIT};
use covermap_core::{AuditEntry, AuditSubject};

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    /// Entries to return, clamped to 1..=MAX_PAGE_LIMIT (default 100)
    pub limit: Option<i64>,
}

/// GET /api/audit - Most recent audit entries
pub async fn list_audit_log(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuditQuery>,
    request: Request,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let caller = caller_identity(request.headers());
    let limit = query.limit.unwrap_or(100).clamp(1, MAX_PAGE_LIMIT);

    let entries = state.db.list_audit_log(limit)?;

    // Reading the trail is recorded too
    state.db.log_audit(
        &caller,
        "list",
        AuditSubject::AuditLog,
        Some(&format!("limit={}", limit)),
    )?;

    Ok(Json(entries))
}
