//! Database Models

// Serde helpers
pub mod serde_helpers;

// Auth
pub mod staff;

// Housing
pub mod building_group;
pub mod room;

// Residents
pub mod assignment;
pub mod resident;

// System
pub mod academic_period;

// Re-exports
pub use academic_period::{AcademicPeriod, AcademicPeriodCreate};
pub use assignment::Assignment;
pub use building_group::{BuildingGroup, BuildingGroupCreate, BuildingGroupUpdate, GroupCategory};
pub use resident::{Resident, ResidentCreate, ResidentUpdate};
pub use room::{Room, RoomCreate, RoomUpdate};
pub use staff::{Staff, StaffCreate, StaffRole, StaffUpdate};
