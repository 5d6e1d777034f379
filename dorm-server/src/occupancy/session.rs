//! Placement session (分配编辑会话)
//!
//! In-memory editing over a [`BoardSnapshot`] baseline. Placement decisions
//! mutate the working snapshot optimistically; nothing touches the database
//! until the accumulated diff is committed in one transaction.
//!
//! State machine:
//!
//! ```text
//! Idle ──edit──► Editing(dirty) ──begin_commit──► Committing
//!   ▲                 ▲                               │
//!   │                 └────────── commit_failed ──────┤
//!   └──────────────── commit_succeeded / discard ─────┘
//! ```

use std::collections::HashMap;

use surrealdb::RecordId;
use thiserror::Error;

use super::ledger::BoardSnapshot;

/// Editing session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Snapshot equals the last-committed state
    Idle,
    /// At least one placement differs from the baseline
    Editing,
    /// A commit is in flight; no second commit may start
    Committing,
}

/// Placement operation errors — all rejected before any write is attempted
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("Room {0} is at capacity")]
    RoomFull(String),

    #[error("Room {0} is not on this board")]
    UnknownRoom(String),

    #[error("Resident {0} is not on this board")]
    UnknownResident(String),

    #[error("Resident {0} is already an occupant of that room")]
    AlreadyPlaced(String),

    #[error("A commit is already in flight")]
    CommitInFlight,

    #[error("Nothing to commit")]
    NothingToCommit,
}

/// The accumulated placement diff of a session, relative to its baseline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementDiff {
    /// Residents whose assignment must be written (placed or moved)
    pub upserts: Vec<(String, RecordId)>,
    /// Residents returned to the unassigned queue
    pub removals: Vec<String>,
}

impl PlacementDiff {
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.removals.is_empty()
    }
}

/// One operator's editing session over a building group's board
#[derive(Debug, Clone)]
pub struct PlacementSession {
    baseline: BoardSnapshot,
    working: BoardSnapshot,
    state: SessionState,
}

impl PlacementSession {
    /// Start a session from a freshly reconstructed board
    pub fn new(baseline: BoardSnapshot) -> Self {
        Self {
            working: baseline.clone(),
            baseline,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the working snapshot differs from the last-committed state
    pub fn is_dirty(&self) -> bool {
        !self.diff().is_empty()
    }

    /// The current working snapshot (what the operator sees)
    pub fn snapshot(&self) -> &BoardSnapshot {
        &self.working
    }

    /// Place a resident into a room (from the queue or from another room).
    ///
    /// Selecting a full room is rejected; the snapshot is left untouched on
    /// any error.
    pub fn place(&mut self, student_id: &str, room: &RecordId) -> Result<(), PlacementError> {
        if self.state == SessionState::Committing {
            return Err(PlacementError::CommitInFlight);
        }
        if !self.working.contains(student_id) {
            return Err(PlacementError::UnknownResident(student_id.to_string()));
        }

        let view = self
            .working
            .room(room)
            .ok_or_else(|| PlacementError::UnknownRoom(room.to_string()))?;
        if view.occupants.iter().any(|o| o.student_id == student_id) {
            return Err(PlacementError::AlreadyPlaced(student_id.to_string()));
        }
        if view.is_full() {
            return Err(PlacementError::RoomFull(view.label.clone()));
        }

        // Checks passed; now mutate
        let occupant = self
            .working
            .take_occupant(student_id)
            .expect("occupant presence checked above");
        self.working
            .room_mut(room)
            .expect("room presence checked above")
            .occupants
            .push(occupant);

        self.refresh_state();
        Ok(())
    }

    /// Return a resident to the unassigned queue
    pub fn unplace(&mut self, student_id: &str) -> Result<(), PlacementError> {
        if self.state == SessionState::Committing {
            return Err(PlacementError::CommitInFlight);
        }
        if self.working.location_of(student_id).is_none() {
            return Err(PlacementError::UnknownResident(student_id.to_string()));
        }

        let occupant = self
            .working
            .take_occupant(student_id)
            .expect("occupant presence checked above");
        self.working.unassigned.push(occupant);
        self.working
            .unassigned
            .sort_by(|a, b| a.student_id.cmp(&b.student_id));

        self.refresh_state();
        Ok(())
    }

    /// Move a resident from their current room into another
    pub fn move_resident(
        &mut self,
        student_id: &str,
        dest: &RecordId,
    ) -> Result<(), PlacementError> {
        if self.working.location_of(student_id).is_none() {
            return Err(PlacementError::UnknownResident(student_id.to_string()));
        }
        self.place(student_id, dest)
    }

    /// The placement diff relative to the baseline
    pub fn diff(&self) -> PlacementDiff {
        let baseline_loc: HashMap<String, RecordId> = locations(&self.baseline);
        let working_loc: HashMap<String, RecordId> = locations(&self.working);

        let mut diff = PlacementDiff::default();
        for (student_id, room) in &working_loc {
            if baseline_loc.get(student_id) != Some(room) {
                diff.upserts.push((student_id.clone(), room.clone()));
            }
        }
        for student_id in baseline_loc.keys() {
            if !working_loc.contains_key(student_id) {
                diff.removals.push(student_id.clone());
            }
        }
        diff.upserts.sort_by(|a, b| a.0.cmp(&b.0));
        diff.removals.sort();
        diff
    }

    /// Enter `Committing` and hand back the diff to persist.
    ///
    /// Rejected when a commit is already in flight or nothing changed.
    pub fn begin_commit(&mut self) -> Result<PlacementDiff, PlacementError> {
        if self.state == SessionState::Committing {
            return Err(PlacementError::CommitInFlight);
        }
        let diff = self.diff();
        if diff.is_empty() {
            return Err(PlacementError::NothingToCommit);
        }
        self.state = SessionState::Committing;
        Ok(diff)
    }

    /// The commit applied: the working snapshot becomes the new baseline
    pub fn commit_succeeded(&mut self) {
        self.baseline = self.working.clone();
        self.state = SessionState::Idle;
    }

    /// The commit was rejected: keep the unsaved placements for retry
    pub fn commit_failed(&mut self) {
        self.state = SessionState::Editing;
    }

    /// Throw the working snapshot away and fall back to the baseline
    pub fn discard(&mut self) {
        self.working = self.baseline.clone();
        self.state = SessionState::Idle;
    }

    /// Replace the baseline after an external refresh (e.g. discard + reload)
    pub fn rebase(&mut self, fresh: BoardSnapshot) {
        self.working = fresh.clone();
        self.baseline = fresh;
        self.state = SessionState::Idle;
    }

    fn refresh_state(&mut self) {
        self.state = if self.is_dirty() {
            SessionState::Editing
        } else {
            SessionState::Idle
        };
    }
}

fn locations(snapshot: &BoardSnapshot) -> HashMap<String, RecordId> {
    let mut map = HashMap::new();
    for view in &snapshot.rooms {
        for occupant in &view.occupants {
            map.insert(occupant.student_id.clone(), view.room.clone());
        }
    }
    map
}
