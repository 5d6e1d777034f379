use surrealdb::RecordId;

use super::ledger::BoardSnapshot;
use super::session::{PlacementError, PlacementSession, SessionState};
use crate::db::models::{Assignment, Resident, Room};

fn room_id(key: &str) -> RecordId {
    RecordId::from_table_key("room", key)
}

fn make_room(key: &str, building: &str, number: &str, capacity: i64) -> Room {
    Room {
        id: Some(room_id(key)),
        number: number.to_string(),
        building: building.to_string(),
        group: RecordId::from_table_key("building_group", "md4-5"),
        capacity,
        occupied: 0,
        version: 0,
        is_active: true,
    }
}

fn make_resident(student_id: &str, last_name: &str) -> Resident {
    Resident {
        id: Some(RecordId::from_table_key("resident", student_id)),
        student_id: student_id.to_string(),
        first_name: "Juan".to_string(),
        last_name: last_name.to_string(),
        course: "BSIT".to_string(),
        year_level: 2,
        contact_number: "09170000000".to_string(),
        email: None,
        home_address: "Somewhere".to_string(),
        emergency_contact_name: "Maria".to_string(),
        emergency_contact_number: "09170000001".to_string(),
        group: RecordId::from_table_key("building_group", "md4-5"),
        school_year: "2025-2026".to_string(),
        term: "1st".to_string(),
        is_archived: false,
    }
}

fn make_assignment(student_id: &str, room_key: &str) -> Assignment {
    Assignment {
        id: Some(Assignment::record_id(student_id, "2025-2026_1st")),
        resident: RecordId::from_table_key("resident", student_id),
        room: room_id(room_key),
        period: RecordId::from_table_key("academic_period", "2025-2026_1st"),
        student_id: student_id.to_string(),
        period_key: "2025-2026_1st".to_string(),
        is_archived: false,
        version: 0,
    }
}

fn md4_board() -> BoardSnapshot {
    let rooms = vec![
        make_room("md4rm1", "MD4", "RM1", 8),
        make_room("md4rm2", "MD4", "RM2", 8),
    ];
    let residents = vec![
        make_resident("21-0001", "Cruz"),
        make_resident("21-0002", "Reyes"),
        make_resident("21-0003", "Santos"),
    ];
    BoardSnapshot::reconstruct(&rooms, &residents, &[])
}

// ========== Reconstruction (ledger) ==========

#[test]
fn reconstruct_counts_occupants_per_room() {
    let rooms = vec![make_room("md4rm1", "MD4", "RM1", 8)];
    let residents = vec![
        make_resident("21-0001", "Cruz"),
        make_resident("21-0002", "Reyes"),
    ];
    let assignments = vec![make_assignment("21-0001", "md4rm1")];

    let board = BoardSnapshot::reconstruct(&rooms, &residents, &assignments);

    let view = board.room(&room_id("md4rm1")).unwrap();
    assert_eq!(view.occupied(), 1);
    assert_eq!(view.occupants[0].student_id, "21-0001");
    // Queue consistency: exactly the residents without a live assignment
    assert_eq!(board.unassigned.len(), 1);
    assert_eq!(board.unassigned[0].student_id, "21-0002");
}

#[test]
fn reconstruct_excludes_dangling_room_reference() {
    let rooms = vec![make_room("md4rm1", "MD4", "RM1", 8)];
    let residents = vec![make_resident("21-0001", "Cruz")];
    // Assignment points at a room that was deleted
    let assignments = vec![make_assignment("21-0001", "md4rm_gone")];

    let board = BoardSnapshot::reconstruct(&rooms, &residents, &assignments);

    assert_eq!(board.room(&room_id("md4rm1")).unwrap().occupied(), 0);
    // The resident falls back to the queue rather than vanishing
    assert_eq!(board.unassigned.len(), 1);
}

#[test]
fn reconstruct_excludes_archived_assignments() {
    let rooms = vec![make_room("md4rm1", "MD4", "RM1", 8)];
    let residents = vec![make_resident("21-0001", "Cruz")];
    let mut assignment = make_assignment("21-0001", "md4rm1");
    assignment.is_archived = true;

    let board = BoardSnapshot::reconstruct(&rooms, &residents, &[assignment]);

    assert_eq!(board.room(&room_id("md4rm1")).unwrap().occupied(), 0);
    assert_eq!(board.unassigned[0].student_id, "21-0001");
}

#[test]
fn round_trip_reproduces_session_placements() {
    let rooms = vec![
        make_room("md4rm1", "MD4", "RM1", 8),
        make_room("md4rm2", "MD4", "RM2", 8),
    ];
    let residents = vec![
        make_resident("21-0001", "Cruz"),
        make_resident("21-0002", "Reyes"),
    ];

    let mut session =
        PlacementSession::new(BoardSnapshot::reconstruct(&rooms, &residents, &[]));
    session.place("21-0001", &room_id("md4rm1")).unwrap();
    session.place("21-0002", &room_id("md4rm2")).unwrap();
    let diff = session.begin_commit().unwrap();

    // Persisting the diff produces exactly these assignments...
    let assignments: Vec<Assignment> = diff
        .upserts
        .iter()
        .map(|(student_id, room)| {
            let mut a = make_assignment(student_id, "ignored");
            a.room = room.clone();
            a
        })
        .collect();

    // ...and reconstructing from them reproduces the edited board
    let board = BoardSnapshot::reconstruct(&rooms, &residents, &assignments);
    assert_eq!(board.room(&room_id("md4rm1")).unwrap().occupants[0].student_id, "21-0001");
    assert_eq!(board.room(&room_id("md4rm2")).unwrap().occupants[0].student_id, "21-0002");
    assert!(board.unassigned.is_empty());
}

// ========== Placement session ==========

#[test]
fn place_moves_resident_out_of_queue() {
    let mut session = PlacementSession::new(md4_board());
    assert_eq!(session.state(), SessionState::Idle);

    session.place("21-0001", &room_id("md4rm1")).unwrap();

    assert_eq!(session.state(), SessionState::Editing);
    assert!(session.is_dirty());
    let snapshot = session.snapshot();
    assert_eq!(snapshot.room(&room_id("md4rm1")).unwrap().occupied(), 1);
    assert!(!snapshot.unassigned.iter().any(|o| o.student_id == "21-0001"));
}

#[test]
fn full_room_rejects_further_placement() {
    let rooms = vec![make_room("md4rm1", "MD4", "RM1", 2)];
    let residents = vec![
        make_resident("21-0001", "Cruz"),
        make_resident("21-0002", "Reyes"),
        make_resident("21-0003", "Santos"),
    ];
    let mut session =
        PlacementSession::new(BoardSnapshot::reconstruct(&rooms, &residents, &[]));

    session.place("21-0001", &room_id("md4rm1")).unwrap();
    session.place("21-0002", &room_id("md4rm1")).unwrap();
    let err = session.place("21-0003", &room_id("md4rm1")).unwrap_err();

    assert_eq!(err, PlacementError::RoomFull("MD4-RM1".to_string()));
    // Rejection is a no-op: occupancy unchanged, resident still queued
    let snapshot = session.snapshot();
    assert_eq!(snapshot.room(&room_id("md4rm1")).unwrap().occupied(), 2);
    assert!(snapshot.unassigned.iter().any(|o| o.student_id == "21-0003"));
}

#[test]
fn capacity_invariant_holds_after_any_sequence() {
    let rooms = vec![
        make_room("md4rm1", "MD4", "RM1", 2),
        make_room("md4rm2", "MD4", "RM2", 1),
    ];
    let residents: Vec<Resident> = (1..=5)
        .map(|i| make_resident(&format!("21-000{}", i), "Cruz"))
        .collect();
    let mut session =
        PlacementSession::new(BoardSnapshot::reconstruct(&rooms, &residents, &[]));

    for resident in &residents {
        for key in ["md4rm1", "md4rm2"] {
            let _ = session.place(&resident.student_id, &room_id(key));
        }
    }

    for view in &session.snapshot().rooms {
        assert!(view.occupied() as i64 <= view.capacity);
    }
}

#[test]
fn move_between_rooms_updates_both() {
    let mut session = PlacementSession::new(md4_board());
    session.place("21-0001", &room_id("md4rm1")).unwrap();
    session.commit_like_rebase();

    session.move_resident("21-0001", &room_id("md4rm2")).unwrap();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.room(&room_id("md4rm1")).unwrap().occupied(), 0);
    assert_eq!(snapshot.room(&room_id("md4rm2")).unwrap().occupied(), 1);
    let diff = session.diff();
    assert_eq!(diff.upserts, vec![("21-0001".to_string(), room_id("md4rm2"))]);
    assert!(diff.removals.is_empty());
}

#[test]
fn unplace_returns_resident_to_queue_as_removal() {
    let rooms = vec![make_room("md4rm1", "MD4", "RM1", 8)];
    let residents = vec![make_resident("21-0001", "Cruz")];
    let assignments = vec![make_assignment("21-0001", "md4rm1")];
    let mut session = PlacementSession::new(BoardSnapshot::reconstruct(
        &rooms,
        &residents,
        &assignments,
    ));

    session.unplace("21-0001").unwrap();

    let diff = session.diff();
    assert!(diff.upserts.is_empty());
    assert_eq!(diff.removals, vec!["21-0001".to_string()]);
}

#[test]
fn diff_is_stable_across_recomputation() {
    let mut session = PlacementSession::new(md4_board());
    session.place("21-0001", &room_id("md4rm1")).unwrap();
    session.place("21-0002", &room_id("md4rm1")).unwrap();

    // Same snapshot, same diff — the basis of idempotent bulk commits
    assert_eq!(session.diff(), session.diff());
}

// ========== State machine ==========

#[test]
fn commit_failure_keeps_session_dirty_for_retry() {
    let mut session = PlacementSession::new(md4_board());
    session.place("21-0001", &room_id("md4rm1")).unwrap();

    let diff = session.begin_commit().unwrap();
    assert_eq!(session.state(), SessionState::Committing);
    assert!(!diff.is_empty());

    // No concurrent commit while one is in flight
    assert_eq!(
        session.place("21-0002", &room_id("md4rm2")).unwrap_err(),
        PlacementError::CommitInFlight
    );
    assert_eq!(session.begin_commit().unwrap_err(), PlacementError::CommitInFlight);

    session.commit_failed();
    assert_eq!(session.state(), SessionState::Editing);
    // The unsaved placement survives for retry
    assert!(session.is_dirty());
    assert_eq!(session.begin_commit().unwrap(), diff);
}

#[test]
fn successful_commit_rebases_the_session() {
    let mut session = PlacementSession::new(md4_board());
    session.place("21-0001", &room_id("md4rm1")).unwrap();

    session.begin_commit().unwrap();
    session.commit_succeeded();

    assert_eq!(session.state(), SessionState::Idle);
    assert!(!session.is_dirty());
    assert_eq!(session.begin_commit().unwrap_err(), PlacementError::NothingToCommit);
}

#[test]
fn discard_restores_the_baseline() {
    let mut session = PlacementSession::new(md4_board());
    session.place("21-0001", &room_id("md4rm1")).unwrap();
    session.discard();

    assert_eq!(session.state(), SessionState::Idle);
    assert!(!session.is_dirty());
    assert_eq!(session.snapshot().room(&room_id("md4rm1")).unwrap().occupied(), 0);
}

impl PlacementSession {
    /// Test helper: pretend the current placements were committed
    fn commit_like_rebase(&mut self) {
        let fresh = self.snapshot().clone();
        self.rebase(fresh);
    }
}
