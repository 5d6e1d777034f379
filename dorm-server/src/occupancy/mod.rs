//! Room occupancy core (住宿分配核心)
//!
//! The occupancy ledger behind the room-assignment board and the
//! single-resident transfer panel:
//!
//! - [`ledger`] — pure reconstruction of the board from persisted records
//! - [`session`] — in-memory placement session with capacity checks and the
//!   `Idle → Editing → Committing` state machine
//! - [`commit`] — the atomic transaction that persists a session's diff

pub mod commit;
pub mod ledger;
pub mod session;

pub use commit::{CommitService, TransferRequest, VersionCheck};
pub use ledger::{BoardSnapshot, Occupant, RoomView};
pub use session::{PlacementDiff, PlacementError, PlacementSession, SessionState};

#[cfg(test)]
mod tests;
