//! Room API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use validator::Validate;

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Room, RoomCreate, RoomUpdate};
use crate::db::repository::RoomRepository;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "room";

/// GET /api/rooms - 获取所有寝室
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Room>>> {
    let repo = RoomRepository::new(state.db.clone());
    let rooms = repo.find_all().await?;
    Ok(Json(rooms))
}

/// GET /api/rooms/:id - 获取单个寝室
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Room>> {
    let repo = RoomRepository::new(state.db.clone());
    let room = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Room {} not found", id)))?;
    Ok(Json(room))
}

/// POST /api/rooms - 创建寝室
///
/// 容量必填且为正数
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<RoomCreate>,
) -> AppResult<Json<Room>> {
    payload.validate()?;

    let repo = RoomRepository::new(state.db.clone());
    let room = repo.create(payload).await?;

    let id = room.id.as_ref().map(|id| id.to_string()).unwrap_or_default();

    state.audit.log(
        AuditAction::RoomCreated,
        RESOURCE,
        &id,
        Some(&current_user),
        serde_json::json!({"label": room.label(), "capacity": room.capacity}),
    );

    state.broadcast_sync(RESOURCE, "created", &id, Some(&room));

    Ok(Json(room))
}

/// PUT /api/rooms/:id - 更新寝室
///
/// 容量不可降到当前入住人数以下
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<RoomUpdate>,
) -> AppResult<Json<Room>> {
    payload.validate()?;

    let repo = RoomRepository::new(state.db.clone());
    let room = repo.update(&id, payload).await?;

    state.audit.log(
        AuditAction::RoomUpdated,
        RESOURCE,
        &id,
        Some(&current_user),
        serde_json::json!({"label": room.label(), "capacity": room.capacity}),
    );

    state.broadcast_sync(RESOURCE, "updated", &id, Some(&room));

    Ok(Json(room))
}

/// DELETE /api/rooms/:id - 删除寝室
///
/// 仍有住宿生的寝室拒绝删除
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = RoomRepository::new(state.db.clone());
    let label_for_audit = repo
        .find_by_id(&id)
        .await
        .ok()
        .flatten()
        .map(|r| r.label())
        .unwrap_or_default();
    let result = repo.delete(&id).await?;

    if result {
        state.audit.log(
            AuditAction::RoomDeleted,
            RESOURCE,
            &id,
            Some(&current_user),
            serde_json::json!({"label": label_for_audit}),
        );

        state.broadcast_sync::<()>(RESOURCE, "deleted", &id, None);
    }

    Ok(Json(result))
}
