//! Board API Handlers
//!
//! 看板读取重建自持久化记录；提交通过占用核心的会话校验后，
//! 由 [`CommitService`] 以单事务写入。

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::serde_helpers;
use crate::db::repository::{
    AcademicPeriodRepository, AssignmentRepository, ResidentRepository, RoomRepository,
};
use crate::occupancy::{
    BoardSnapshot, CommitService, PlacementError, PlacementSession, TransferRequest, VersionCheck,
};
use crate::utils::{AppError, AppResult};

/// GET /api/board/:group_id 响应
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    /// 当前激活学期 key (如 "2025-2026_1st")
    pub period_key: String,
    #[serde(flatten)]
    pub snapshot: BoardSnapshot,
}

/// 一条待写入的分配
#[derive(Debug, Clone, Deserialize)]
pub struct PlacementEntry {
    pub student_id: String,
    #[serde(with = "serde_helpers::record_id")]
    pub room: RecordId,
}

/// 客户端读取看板时记下的寝室版本，提交时回传
#[derive(Debug, Clone, Deserialize)]
pub struct RoomVersionEntry {
    #[serde(with = "serde_helpers::record_id")]
    pub room: RecordId,
    pub version: i64,
}

/// POST /api/board/:group_id/commit 请求体
#[derive(Debug, Deserialize)]
pub struct BoardCommitRequest {
    /// 新增或移动的分配
    #[serde(default)]
    pub upserts: Vec<PlacementEntry>,
    /// 退回待分配队列的住宿生
    #[serde(default)]
    pub removals: Vec<String>,
    /// 读取看板时的寝室版本
    #[serde(default)]
    pub versions: Vec<RoomVersionEntry>,
}

/// POST /api/board/:group_id/commit 响应
#[derive(Debug, Serialize)]
pub struct BoardCommitResponse {
    pub period_key: String,
    pub applied_upserts: usize,
    pub applied_removals: usize,
    /// 提交后的最新看板
    pub board: BoardResponse,
}

/// POST /api/board/:group_id/transfer 请求体
#[derive(Debug, Deserialize)]
pub struct TransferBody {
    pub student_id: String,
    #[serde(with = "serde_helpers::record_id")]
    pub source_room: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub dest_room: RecordId,
    pub source_version: i64,
    pub dest_version: i64,
}

/// GET /api/board/:group_id - 重建某楼栋组的分配看板
pub async fn get_board(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(group_id): Path<String>,
) -> AppResult<Json<BoardResponse>> {
    ensure_group_access(&current_user, &group_id)?;
    let board = load_board(&state, &group_id).await?;
    Ok(Json(board))
}

/// POST /api/board/:group_id/commit - 批量提交看板编辑
///
/// 服务器端重放编辑会话（容量与成员校验），然后在单个数据库事务中
/// 写入全部分配、删除和寝室计数。任何容量或版本冲突使整批回滚。
pub async fn commit(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(group_id): Path<String>,
    Json(req): Json<BoardCommitRequest>,
) -> AppResult<Json<BoardCommitResponse>> {
    ensure_group_access(&current_user, &group_id)?;

    if req.upserts.is_empty() && req.removals.is_empty() {
        return Err(AppError::validation("Nothing to commit"));
    }

    // 基于当前持久化状态重放编辑，拒绝超员和未知成员
    let current = load_board(&state, &group_id).await?;
    let mut session = PlacementSession::new(current.snapshot.clone());
    for entry in &req.upserts {
        match session.place(&entry.student_id, &entry.room) {
            // 已在目标寝室 — 与持久化状态一致，重复提交是幂等的
            Err(PlacementError::AlreadyPlaced(_)) => continue,
            other => other.map_err(map_placement_error)?,
        }
    }
    for student_id in &req.removals {
        match session.unplace(student_id) {
            // 已不在看板上（例如已被归档），无需再退回
            Err(PlacementError::UnknownResident(_)) => continue,
            other => other.map_err(map_placement_error)?,
        }
    }

    let diff = match session.begin_commit() {
        Ok(diff) => diff,
        Err(PlacementError::NothingToCommit) => {
            // 重复提交同一快照：持久化状态已经一致
            let board = load_board(&state, &group_id).await?;
            return Ok(Json(BoardCommitResponse {
                period_key: board.period_key.clone(),
                applied_upserts: 0,
                applied_removals: 0,
                board,
            }));
        }
        Err(e) => return Err(map_placement_error(e)),
    };

    let group: RecordId = parse_group_id(&group_id)?;
    let versions: Vec<VersionCheck> = req
        .versions
        .iter()
        .map(|v| VersionCheck {
            room: v.room.clone(),
            version: v.version,
        })
        .collect();

    let commit_service = CommitService::new(state.db.clone());
    let outcome = commit_service.commit_board(&group, &diff, versions).await;

    let period = match outcome {
        Ok(period) => {
            session.commit_succeeded();
            period
        }
        Err(e) => {
            session.commit_failed();
            state.audit.log(
                AuditAction::BoardCommitRejected,
                "board",
                &group_id,
                Some(&current_user),
                serde_json::json!({"reason": e.to_string()}),
            );
            return Err(e.into());
        }
    };

    state.audit.log(
        AuditAction::BoardCommitted,
        "board",
        &group_id,
        Some(&current_user),
        serde_json::json!({
            "period": &period.period_key,
            "upserts": diff.upserts.len(),
            "removals": diff.removals.len(),
        }),
    );

    let board = load_board(&state, &group_id).await?;
    state.broadcast_sync("board", "committed", &group_id, Some(&board.snapshot));

    Ok(Json(BoardCommitResponse {
        period_key: period.period_key,
        applied_upserts: diff.upserts.len(),
        applied_removals: diff.removals.len(),
        board,
    }))
}

/// POST /api/board/:group_id/transfer - 单人调寝
///
/// 分配改写、源寝室减员、目标寝室加员作为一个原子单元提交
pub async fn transfer(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(group_id): Path<String>,
    Json(req): Json<TransferBody>,
) -> AppResult<Json<BoardResponse>> {
    ensure_group_access(&current_user, &group_id)?;

    let commit_service = CommitService::new(state.db.clone());
    let outcome = commit_service
        .commit_transfer(TransferRequest {
            student_id: req.student_id.clone(),
            source_room: req.source_room.clone(),
            dest_room: req.dest_room.clone(),
            source_version: req.source_version,
            dest_version: req.dest_version,
        })
        .await;

    let period = match outcome {
        Ok(period) => period,
        Err(e) => {
            state.audit.log(
                AuditAction::BoardCommitRejected,
                "board",
                &group_id,
                Some(&current_user),
                serde_json::json!({
                    "reason": e.to_string(),
                    "student_id": &req.student_id,
                }),
            );
            return Err(e.into());
        }
    };

    state.audit.log(
        AuditAction::ResidentTransferred,
        "board",
        &group_id,
        Some(&current_user),
        serde_json::json!({
            "student_id": &req.student_id,
            "from": req.source_room.to_string(),
            "to": req.dest_room.to_string(),
            "period": &period.period_key,
        }),
    );

    let board = load_board(&state, &group_id).await?;
    state.broadcast_sync("board", "committed", &group_id, Some(&board.snapshot));

    Ok(Json(board))
}

/// 从持久化记录重建一个组的看板
async fn load_board(state: &ServerState, group_id: &str) -> Result<BoardResponse, AppError> {
    let period = AcademicPeriodRepository::new(state.db.clone())
        .require_active()
        .await?;

    let rooms = RoomRepository::new(state.db.clone())
        .find_by_group(group_id)
        .await?;
    let residents = ResidentRepository::new(state.db.clone())
        .find_by_group(group_id)
        .await?;
    let assignments = AssignmentRepository::new(state.db.clone())
        .find_by_group_and_period(group_id, &period.period_key)
        .await?;

    let snapshot = BoardSnapshot::reconstruct(&rooms, &residents, &assignments);
    Ok(BoardResponse {
        period_key: period.period_key,
        snapshot,
    })
}

fn ensure_group_access(user: &CurrentUser, group_id: &str) -> Result<(), AppError> {
    if !user.can_manage_group(group_id) {
        return Err(AppError::forbidden(
            "This account does not manage the requested building group",
        ));
    }
    Ok(())
}

fn parse_group_id(group_id: &str) -> Result<RecordId, AppError> {
    group_id
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid group ID: {}", group_id)))
}

fn map_placement_error(err: PlacementError) -> AppError {
    match err {
        PlacementError::RoomFull(label) => {
            AppError::business_rule(format!("Room {} is at capacity", label))
        }
        PlacementError::UnknownRoom(room) => {
            AppError::not_found(format!("Room {} is not on this board", room))
        }
        PlacementError::UnknownResident(student_id) => AppError::not_found(format!(
            "Resident {} is not on this board",
            student_id
        )),
        PlacementError::AlreadyPlaced(student_id) => AppError::validation(format!(
            "Resident {} is already in that room",
            student_id
        )),
        PlacementError::CommitInFlight => {
            AppError::conflict("A commit is already in flight for this board")
        }
        PlacementError::NothingToCommit => AppError::validation("Nothing to commit"),
    }
}
