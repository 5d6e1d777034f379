//! Repository Module
//!
//! CRUD operations over the embedded SurrealDB tables.

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
pub use academic_period::AcademicPeriodRepository;
pub use assignment::AssignmentRepository;
pub use building_group::BuildingGroupRepository;
pub use resident::ResidentRepository;
pub use room::RoomRepository;
pub use staff::StaffRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Optimistic-concurrency rejection — the record changed since it was read
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Placement would exceed a room's bed capacity
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: let id: RecordId = "room:abc".parse()?;
//   - 创建: let id = RecordId::from_table_key("room", "abc");
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
