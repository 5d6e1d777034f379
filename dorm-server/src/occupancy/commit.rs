//! Commit protocol (提交协议)
//!
//! Translates an editing session's placement diff into a single atomic
//! SurrealDB transaction. Partial application is never observed: capacity
//! and version guards `THROW` inside the transaction and roll the whole
//! write back.
//!
//! Assignment records are keyed deterministically
//! (`assignment:⟨student_id⟩_⟨period_key⟩`) under the *active* academic
//! period resolved at commit time, so re-committing the same snapshot
//! upserts the same records.

use serde::Serialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::session::PlacementDiff;
use crate::db::models::{AcademicPeriod, Assignment};
use crate::db::repository::{
    AcademicPeriodRepository, RepoError, RepoResult, ResidentRepository,
};

/// Room version observed when the board was read, echoed back at commit
#[derive(Debug, Clone, Serialize)]
pub struct VersionCheck {
    pub room: RecordId,
    pub version: i64,
}

/// One assignment upsert inside the bulk transaction
#[derive(Debug, Clone, Serialize)]
struct AssignmentWrite {
    id: RecordId,
    resident: RecordId,
    room: RecordId,
    period: RecordId,
    student_id: String,
    period_key: String,
}

/// A single-resident room transfer
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub student_id: String,
    pub source_room: RecordId,
    pub dest_room: RecordId,
    /// Versions read alongside the rooms; stale versions abort the commit
    pub source_version: i64,
    pub dest_version: i64,
}

/// Commit service — the only write path into the assignment table
#[derive(Clone)]
pub struct CommitService {
    db: Surreal<Db>,
}

const BOARD_COMMIT: &str = r#"
    BEGIN TRANSACTION;
    FOR $check IN $versions {
        LET $cur = (SELECT VALUE version FROM ONLY $check.room);
        IF $cur == NONE { THROW "unknown_room" };
        IF $cur != $check.version { THROW "version_conflict" };
    };
    FOR $w IN $writes {
        UPSERT $w.id SET
            resident = $w.resident,
            room = $w.room,
            period = $w.period,
            student_id = $w.student_id,
            period_key = $w.period_key,
            is_archived = false,
            version += 1;
    };
    FOR $r IN $removals {
        DELETE $r;
    };
    FOR $room IN (SELECT id, capacity FROM room WHERE group = $group AND is_active = true) {
        LET $n = (SELECT VALUE count() FROM assignment
            WHERE room = $room.id AND period_key = $period_key AND is_archived = false
            GROUP ALL)[0] ?? 0;
        IF $n > $room.capacity { THROW "room_full" };
        UPDATE $room.id SET occupied = $n, version += 1;
    };
    COMMIT TRANSACTION;
"#;

const TRANSFER_COMMIT: &str = r#"
    BEGIN TRANSACTION;
    LET $a = (SELECT * FROM ONLY $assignment);
    IF $a == NONE { THROW "assignment_missing" };
    IF $a.is_archived { THROW "assignment_missing" };
    IF $a.room != $src { THROW "assignment_moved" };
    LET $src_room = (SELECT * FROM ONLY $src);
    LET $dst_room = (SELECT * FROM ONLY $dst);
    IF $src_room == NONE OR $dst_room == NONE { THROW "unknown_room" };
    IF $src_room.version != $src_version { THROW "version_conflict" };
    IF $dst_room.version != $dst_version { THROW "version_conflict" };
    IF $dst_room.occupied >= $dst_room.capacity { THROW "room_full" };
    UPDATE $src SET occupied -= 1, version += 1;
    UPDATE $dst SET occupied += 1, version += 1;
    UPDATE $assignment SET room = $dst, version += 1;
    COMMIT TRANSACTION;
"#;

impl CommitService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Persist a bulk board diff for a building group.
    ///
    /// All assignment upserts, removals and room counter updates apply
    /// atomically; any capacity or version violation aborts the whole
    /// write and the previously committed state stays intact.
    pub async fn commit_board(
        &self,
        group: &RecordId,
        diff: &PlacementDiff,
        versions: Vec<VersionCheck>,
    ) -> RepoResult<AcademicPeriod> {
        if diff.is_empty() {
            return Err(RepoError::Validation("Nothing to commit".into()));
        }

        // The active period is resolved here, at commit time, never from a
        // constant baked into the caller.
        let period = AcademicPeriodRepository::new(self.db.clone())
            .require_active()
            .await?;
        let period_id = period
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Active period has no id".into()))?;

        let residents = ResidentRepository::new(self.db.clone());
        let mut writes: Vec<AssignmentWrite> = Vec::with_capacity(diff.upserts.len());
        for (student_id, room) in &diff.upserts {
            let resident = residents
                .find_by_student_id(student_id)
                .await?
                .ok_or_else(|| {
                    RepoError::NotFound(format!("Resident '{}' not found", student_id))
                })?;
            if resident.is_archived {
                return Err(RepoError::Validation(format!(
                    "Resident '{}' is archived and cannot be assigned",
                    student_id
                )));
            }
            writes.push(AssignmentWrite {
                id: Assignment::record_id(student_id, &period.period_key),
                resident: resident
                    .id
                    .ok_or_else(|| RepoError::Database("Resident record has no id".into()))?,
                room: room.clone(),
                period: period_id.clone(),
                student_id: student_id.clone(),
                period_key: period.period_key.clone(),
            });
        }

        let removals: Vec<RecordId> = diff
            .removals
            .iter()
            .map(|student_id| Assignment::record_id(student_id, &period.period_key))
            .collect();

        self.db
            .query(BOARD_COMMIT)
            .bind(("versions", versions))
            .bind(("writes", writes))
            .bind(("removals", removals))
            .bind(("group", group.clone()))
            .bind(("period_key", period.period_key.clone()))
            .await
            .map_err(map_commit_error)?
            .check()
            .map_err(map_commit_error)?;

        tracing::info!(
            group = %group,
            period = %period.period_key,
            upserts = diff.upserts.len(),
            removals = diff.removals.len(),
            "Board commit applied"
        );
        Ok(period)
    }

    /// Move one resident between two rooms as a single atomic unit:
    /// assignment retarget, source decrement, destination increment.
    pub async fn commit_transfer(&self, req: TransferRequest) -> RepoResult<AcademicPeriod> {
        if req.source_room == req.dest_room {
            return Err(RepoError::Validation(
                "Source and destination room are the same".into(),
            ));
        }

        let period = AcademicPeriodRepository::new(self.db.clone())
            .require_active()
            .await?;
        let assignment = Assignment::record_id(&req.student_id, &period.period_key);

        self.db
            .query(TRANSFER_COMMIT)
            .bind(("assignment", assignment))
            .bind(("src", req.source_room.clone()))
            .bind(("dst", req.dest_room.clone()))
            .bind(("src_version", req.source_version))
            .bind(("dst_version", req.dest_version))
            .await
            .map_err(map_commit_error)?
            .check()
            .map_err(map_commit_error)?;

        tracing::info!(
            student_id = %req.student_id,
            from = %req.source_room,
            to = %req.dest_room,
            "Transfer commit applied"
        );
        Ok(period)
    }
}

/// Map `THROW`n guard names out of the database error text
fn map_commit_error(err: surrealdb::Error) -> RepoError {
    let msg = err.to_string();
    if msg.contains("version_conflict") {
        RepoError::Conflict(
            "The board changed since it was loaded; refresh and retry".to_string(),
        )
    } else if msg.contains("room_full") {
        RepoError::CapacityExceeded("A destination room is at capacity".to_string())
    } else if msg.contains("assignment_missing") {
        RepoError::NotFound("The resident has no assignment in the active period".to_string())
    } else if msg.contains("assignment_moved") {
        RepoError::Conflict(
            "The resident is no longer in the expected source room".to_string(),
        )
    } else if msg.contains("unknown_room") {
        RepoError::NotFound("A referenced room does not exist".to_string())
    } else {
        RepoError::Database(msg)
    }
}
