//! AcademicPeriod API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use validator::Validate;

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{AcademicPeriod, AcademicPeriodCreate};
use crate::db::repository::AcademicPeriodRepository;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "academic_period";

/// GET /api/periods - 获取所有学期
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<AcademicPeriod>>> {
    let repo = AcademicPeriodRepository::new(state.db.clone());
    let periods = repo.find_all().await?;
    Ok(Json(periods))
}

/// GET /api/periods/active - 获取当前激活学期
pub async fn get_active(State(state): State<ServerState>) -> AppResult<Json<AcademicPeriod>> {
    let repo = AcademicPeriodRepository::new(state.db.clone());
    let period = repo
        .find_active()
        .await?
        .ok_or_else(|| AppError::not_found("No active academic period"))?;
    Ok(Json(period))
}

/// POST /api/periods - 创建学期 (初始为未激活)
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<AcademicPeriodCreate>,
) -> AppResult<Json<AcademicPeriod>> {
    payload.validate()?;

    let repo = AcademicPeriodRepository::new(state.db.clone());
    let period = repo.create(payload).await?;

    let id = period
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();

    state.audit.log(
        AuditAction::PeriodCreated,
        RESOURCE,
        &id,
        Some(&current_user),
        serde_json::json!({"period_key": &period.period_key}),
    );

    state.broadcast_sync(RESOURCE, "created", &id, Some(&period));

    Ok(Json(period))
}

/// POST /api/periods/:id/activate - 激活学期
///
/// 单事务滚动：旧学期取消激活，其分配全部归档，寝室入住计数清零
pub async fn activate(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<AcademicPeriod>> {
    let repo = AcademicPeriodRepository::new(state.db.clone());
    let period = repo.activate(&id).await?;

    state.audit.log(
        AuditAction::PeriodActivated,
        RESOURCE,
        &id,
        Some(&current_user),
        serde_json::json!({"period_key": &period.period_key}),
    );

    state.broadcast_sync(RESOURCE, "activated", &id, Some(&period));
    // 所有看板在滚动后都要重载
    state.broadcast_sync::<()>("board", "changed", "all", None);

    Ok(Json(period))
}
