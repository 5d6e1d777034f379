//! 审计日志查询 Handlers

use axum::{
    Json,
    extract::{Query, State},
};

use crate::audit::{AuditListResponse, AuditQuery};
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// GET /api/audit-log - 查询审计日志 (分页，可过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<AuditListResponse>> {
    let response = state
        .audit
        .query(&query)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(response))
}
