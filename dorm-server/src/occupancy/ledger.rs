//! Occupancy reconstruction (占用台账)
//!
//! Pure projection from the persisted record sets to the room board view:
//! per-room ordered occupant lists plus the unassigned queue. No side
//! effects; the board is rebuilt from scratch on every underlying data
//! change instead of keeping a separately-mutated duplicate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use crate::db::models::serde_helpers;
use crate::db::models::{Assignment, Resident, Room};

/// One occupant (or queued resident) on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub student_id: String,
    pub name: String,
}

impl Occupant {
    fn from_resident(resident: &Resident) -> Self {
        Self {
            student_id: resident.student_id.clone(),
            name: resident.full_name(),
        }
    }
}

/// A room with its current occupants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomView {
    #[serde(with = "serde_helpers::record_id")]
    pub room: RecordId,
    /// e.g. "MD4-RM1"
    pub label: String,
    pub capacity: i64,
    /// Optimistic-concurrency revision carried through to commit
    pub version: i64,
    pub occupants: Vec<Occupant>,
}

impl RoomView {
    pub fn occupied(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() as i64 >= self.capacity
    }
}

/// The reconstructed board for one building group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub rooms: Vec<RoomView>,
    /// Residents of the group with no assignment in the active period
    pub unassigned: Vec<Occupant>,
}

impl BoardSnapshot {
    /// Rebuild the board from the three record sets.
    ///
    /// Assignments pointing at a room or resident that no longer exists are
    /// data-integrity errors: they are logged and excluded from all counts,
    /// never fatal. `occupied ≤ capacity` is validated (logged on
    /// violation) here; enforcement happens at commit time.
    pub fn reconstruct(
        rooms: &[Room],
        residents: &[Resident],
        assignments: &[Assignment],
    ) -> Self {
        let resident_by_student: HashMap<&str, &Resident> = residents
            .iter()
            .filter(|r| !r.is_archived)
            .map(|r| (r.student_id.as_str(), r))
            .collect();

        let mut views: Vec<RoomView> = rooms
            .iter()
            .filter(|r| r.is_active)
            .map(|r| RoomView {
                room: r.id.clone().unwrap_or_else(|| {
                    RecordId::from_table_key("room", format!("{}-{}", r.building, r.number))
                }),
                label: r.label(),
                capacity: r.capacity,
                version: r.version,
                occupants: Vec::new(),
            })
            .collect();
        let index_by_room: HashMap<RecordId, usize> = views
            .iter()
            .enumerate()
            .map(|(i, v)| (v.room.clone(), i))
            .collect();

        // Deterministic occupant order regardless of query order
        let mut sorted: Vec<&Assignment> = assignments.iter().filter(|a| !a.is_archived).collect();
        let mut placed: Vec<bool> = vec![false; residents.len()];
        sorted.sort_by(|a, b| a.student_id.cmp(&b.student_id));

        for assignment in sorted {
            let Some(resident) = resident_by_student.get(assignment.student_id.as_str()) else {
                tracing::warn!(
                    student_id = %assignment.student_id,
                    "Assignment references unknown or archived resident, excluded from board"
                );
                continue;
            };
            let Some(&idx) = index_by_room.get(&assignment.room) else {
                tracing::warn!(
                    student_id = %assignment.student_id,
                    room = %assignment.room,
                    "Assignment references unknown room, excluded from occupancy"
                );
                continue;
            };

            views[idx].occupants.push(Occupant::from_resident(resident));
            if let Some(pos) = residents
                .iter()
                .position(|r| r.student_id == assignment.student_id)
            {
                placed[pos] = true;
            }
        }

        for view in &views {
            if view.occupants.len() as i64 > view.capacity {
                tracing::warn!(
                    room = %view.label,
                    occupied = view.occupants.len(),
                    capacity = view.capacity,
                    "Room over capacity in persisted data"
                );
            }
        }

        let mut unassigned: Vec<Occupant> = residents
            .iter()
            .enumerate()
            .filter(|(i, r)| !placed[*i] && !r.is_archived)
            .map(|(_, r)| Occupant::from_resident(r))
            .collect();
        unassigned.sort_by(|a, b| a.student_id.cmp(&b.student_id));

        Self {
            rooms: views,
            unassigned,
        }
    }

    /// Where a resident currently sits: `Some(room)` or `None` for the queue
    pub fn location_of(&self, student_id: &str) -> Option<&RecordId> {
        self.rooms
            .iter()
            .find(|v| v.occupants.iter().any(|o| o.student_id == student_id))
            .map(|v| &v.room)
    }

    /// Whether the resident appears anywhere on the board (room or queue)
    pub fn contains(&self, student_id: &str) -> bool {
        self.location_of(student_id).is_some()
            || self.unassigned.iter().any(|o| o.student_id == student_id)
    }

    pub fn room(&self, room: &RecordId) -> Option<&RoomView> {
        self.rooms.iter().find(|v| &v.room == room)
    }

    pub(crate) fn room_mut(&mut self, room: &RecordId) -> Option<&mut RoomView> {
        self.rooms.iter_mut().find(|v| &v.room == room)
    }

    /// Remove a resident from wherever they are, returning the occupant
    pub(crate) fn take_occupant(&mut self, student_id: &str) -> Option<Occupant> {
        for view in &mut self.rooms {
            if let Some(pos) = view.occupants.iter().position(|o| o.student_id == student_id) {
                return Some(view.occupants.remove(pos));
            }
        }
        if let Some(pos) = self
            .unassigned
            .iter()
            .position(|o| o.student_id == student_id)
        {
            return Some(self.unassigned.remove(pos));
        }
        None
    }
}
