//! BuildingGroup API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use validator::Validate;

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{BuildingGroup, BuildingGroupCreate, BuildingGroupUpdate, Room};
use crate::db::repository::{BuildingGroupRepository, RoomRepository};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "building_group";

/// GET /api/building-groups - 获取所有楼栋组
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<BuildingGroup>>> {
    let repo = BuildingGroupRepository::new(state.db.clone());
    let groups = repo.find_all().await?;
    Ok(Json(groups))
}

/// GET /api/building-groups/:id - 获取单个楼栋组
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<BuildingGroup>> {
    let repo = BuildingGroupRepository::new(state.db.clone());
    let group = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Building group {} not found", id)))?;
    Ok(Json(group))
}

/// POST /api/building-groups - 创建楼栋组
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<BuildingGroupCreate>,
) -> AppResult<Json<BuildingGroup>> {
    payload.validate()?;

    let repo = BuildingGroupRepository::new(state.db.clone());
    let group = repo.create(payload).await?;

    let id = group.id.as_ref().map(|id| id.to_string()).unwrap_or_default();

    state.audit.log(
        AuditAction::BuildingGroupCreated,
        RESOURCE,
        &id,
        Some(&current_user),
        serde_json::json!({"title": &group.title, "group_key": &group.group_key}),
    );

    state.broadcast_sync(RESOURCE, "created", &id, Some(&group));

    Ok(Json(group))
}

/// PUT /api/building-groups/:id - 更新楼栋组
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<BuildingGroupUpdate>,
) -> AppResult<Json<BuildingGroup>> {
    payload.validate()?;

    let repo = BuildingGroupRepository::new(state.db.clone());
    let group = repo.update(&id, payload).await?;

    state.audit.log(
        AuditAction::BuildingGroupUpdated,
        RESOURCE,
        &id,
        Some(&current_user),
        serde_json::json!({"title": &group.title}),
    );

    state.broadcast_sync(RESOURCE, "updated", &id, Some(&group));

    Ok(Json(group))
}

/// DELETE /api/building-groups/:id - 删除楼栋组
///
/// 组内仍有启用中的寝室时拒绝删除
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = BuildingGroupRepository::new(state.db.clone());
    let title_for_audit = repo
        .find_by_id(&id)
        .await
        .ok()
        .flatten()
        .map(|g| g.title)
        .unwrap_or_default();
    let result = repo.delete(&id).await?;

    if result {
        state.audit.log(
            AuditAction::BuildingGroupDeleted,
            RESOURCE,
            &id,
            Some(&current_user),
            serde_json::json!({"title": title_for_audit}),
        );

        state.broadcast_sync::<()>(RESOURCE, "deleted", &id, None);
    }

    Ok(Json(result))
}

/// GET /api/building-groups/:id/rooms - 获取组内的所有寝室
pub async fn list_rooms(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> AppResult<Json<Vec<Room>>> {
    let repo = RoomRepository::new(state.db.clone());
    let rooms = repo.find_by_group(&group_id).await?;
    Ok(Json(rooms))
}
