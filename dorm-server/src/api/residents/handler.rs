//! Resident API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Resident, ResidentCreate, ResidentUpdate};
use crate::db::repository::{AcademicPeriodRepository, ResidentRepository};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "resident";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// 按楼栋组过滤 (如 "building_group:md4-5")
    pub group: Option<String>,
}

/// GET /api/residents - 获取住宿生列表
///
/// 宿管账号只能看到自己楼栋组的住宿生
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Resident>>> {
    let repo = ResidentRepository::new(state.db.clone());

    // 宿管限定在自己的组；管理员可用 ?group= 过滤或查看全部
    let scope = match (&current_user.building_group, &query.group) {
        (Some(own), _) if !current_user.is_admin() => Some(own.clone()),
        (_, Some(requested)) => Some(requested.clone()),
        _ => None,
    };

    let residents = match scope {
        Some(group_id) => repo.find_by_group(&group_id).await?,
        None => repo.find_all().await?,
    };
    Ok(Json(residents))
}

/// GET /api/residents/:id - 获取单个住宿生
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Resident>> {
    let repo = ResidentRepository::new(state.db.clone());
    let resident = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Resident {} not found", id)))?;
    Ok(Json(resident))
}

/// POST /api/residents - 登记住宿生
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ResidentCreate>,
) -> AppResult<Json<Resident>> {
    payload.validate()?;

    if !current_user.can_manage_group(&payload.group.to_string()) {
        return Err(AppError::forbidden(
            "Cannot register residents outside your building group",
        ));
    }

    let repo = ResidentRepository::new(state.db.clone());
    let resident = repo.create(payload).await?;

    let id = resident
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();

    state.audit.log(
        AuditAction::ResidentCreated,
        RESOURCE,
        &id,
        Some(&current_user),
        serde_json::json!({
            "student_id": &resident.student_id,
            "name": resident.full_name(),
        }),
    );

    state.broadcast_sync(RESOURCE, "created", &id, Some(&resident));

    Ok(Json(resident))
}

/// PUT /api/residents/:id - 更新住宿生资料
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<ResidentUpdate>,
) -> AppResult<Json<Resident>> {
    payload.validate()?;

    let repo = ResidentRepository::new(state.db.clone());

    let existing = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Resident {} not found", id)))?;
    if !current_user.can_manage_group(&existing.group.to_string()) {
        return Err(AppError::forbidden(
            "Cannot modify residents outside your building group",
        ));
    }

    let resident = repo.update(&id, payload).await?;

    state.audit.log(
        AuditAction::ResidentUpdated,
        RESOURCE,
        &id,
        Some(&current_user),
        serde_json::json!({"student_id": &resident.student_id}),
    );

    state.broadcast_sync(RESOURCE, "updated", &id, Some(&resident));

    Ok(Json(resident))
}

/// POST /api/residents/:id/archive - 归档住宿生 (退宿)
///
/// 同一事务内删除其当期分配并释放床位
pub async fn archive(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = ResidentRepository::new(state.db.clone());

    let existing = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Resident {} not found", id)))?;
    if !current_user.can_manage_group(&existing.group.to_string()) {
        return Err(AppError::forbidden(
            "Cannot archive residents outside your building group",
        ));
    }

    let period = AcademicPeriodRepository::new(state.db.clone())
        .require_active()
        .await?;
    let result = repo.archive(&id, &period.period_key).await?;

    if result {
        state.audit.log(
            AuditAction::ResidentArchived,
            RESOURCE,
            &id,
            Some(&current_user),
            serde_json::json!({
                "student_id": &existing.student_id,
                "period": &period.period_key,
            }),
        );

        state.broadcast_sync::<()>(RESOURCE, "archived", &id, None);
        // 归档可能释放床位，看板需要刷新
        state.broadcast_sync::<()>("board", "changed", &existing.group.to_string(), None);
    }

    Ok(Json(result))
}
