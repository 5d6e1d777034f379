//! Staff API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use validator::Validate;

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Staff, StaffCreate, StaffUpdate};
use crate::db::repository::StaffRepository;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "staff";

/// GET /api/staff - 获取所有账号
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Staff>>> {
    let repo = StaffRepository::new(state.db.clone());
    let staff = repo.find_all().await?;
    Ok(Json(staff))
}

/// GET /api/staff/:id - 获取单个账号
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Staff>> {
    let repo = StaffRepository::new(state.db.clone());
    let staff = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Staff {} not found", id)))?;
    Ok(Json(staff))
}

/// POST /api/staff - 创建账号
///
/// 宿管账号必须绑定一个楼栋组
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<StaffCreate>,
) -> AppResult<Json<Staff>> {
    payload.validate()?;

    let repo = StaffRepository::new(state.db.clone());
    let staff = repo.create(payload).await?;

    let id = staff.id.as_ref().map(|id| id.to_string()).unwrap_or_default();

    state.audit.log(
        AuditAction::StaffCreated,
        RESOURCE,
        &id,
        Some(&current_user),
        serde_json::json!({
            "username": &staff.username,
            "role": staff.role.as_str(),
        }),
    );

    state.broadcast_sync(RESOURCE, "created", &id, Some(&staff));

    Ok(Json(staff))
}

/// PUT /api/staff/:id - 更新账号
///
/// 系统账号只允许修改密码
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<StaffUpdate>,
) -> AppResult<Json<Staff>> {
    payload.validate()?;

    let repo = StaffRepository::new(state.db.clone());
    let staff = repo.update(&id, payload).await?;

    state.audit.log(
        AuditAction::StaffUpdated,
        RESOURCE,
        &id,
        Some(&current_user),
        serde_json::json!({"username": &staff.username}),
    );

    state.broadcast_sync(RESOURCE, "updated", &id, Some(&staff));

    Ok(Json(staff))
}

/// DELETE /api/staff/:id - 停用账号
///
/// 系统账号受保护，不可停用
pub async fn deactivate(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = StaffRepository::new(state.db.clone());
    let username_for_audit = repo
        .find_by_id(&id)
        .await
        .ok()
        .flatten()
        .map(|s| s.username)
        .unwrap_or_default();
    let result = repo.deactivate(&id).await?;

    if result {
        state.audit.log(
            AuditAction::StaffDeactivated,
            RESOURCE,
            &id,
            Some(&current_user),
            serde_json::json!({"username": username_for_audit}),
        );

        state.broadcast_sync::<()>(RESOURCE, "deactivated", &id, None);
    }

    Ok(Json(result))
}
