//! Database Module
//!
//! Embedded SurrealDB storage (RocksDB on disk, in-memory engine for tests)
//! plus schema and index definition.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "dorm";
const DATABASE: &str = "dorm";

/// Schema and index definitions, applied at startup.
///
/// Tables stay schemaless (models are the source of truth) but the unique
/// indexes back the data-model invariants: one staff username, one student
/// id, one room number per building code, one assignment per resident and
/// period.
const SCHEMA: &str = r#"
    DEFINE TABLE IF NOT EXISTS staff SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS idx_staff_username ON TABLE staff COLUMNS username UNIQUE;

    DEFINE TABLE IF NOT EXISTS building_group SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS idx_group_key ON TABLE building_group COLUMNS group_key UNIQUE;

    DEFINE TABLE IF NOT EXISTS room SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS idx_room_number ON TABLE room COLUMNS building, number UNIQUE;

    DEFINE TABLE IF NOT EXISTS resident SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS idx_student_id ON TABLE resident COLUMNS student_id UNIQUE;

    DEFINE TABLE IF NOT EXISTS assignment SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS idx_assignment_resident ON TABLE assignment COLUMNS student_id, period_key UNIQUE;

    DEFINE TABLE IF NOT EXISTS academic_period SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS idx_period_key ON TABLE academic_period COLUMNS period_key UNIQUE;

    DEFINE TABLE IF NOT EXISTS audit_log SCHEMALESS;
"#;

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database and apply schema definitions
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {}", e)))?;

        Self::setup(db).await
    }

    /// In-memory database, used by integration tests
    pub async fn new_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {}", e)))?;

        Self::setup(db).await
    }

    async fn setup(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {}", e)))?;

        db.query(SCHEMA)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply schema: {}", e)))?;

        tracing::info!("Database ready (SurrealDB embedded)");
        Ok(Self { db })
    }
}
