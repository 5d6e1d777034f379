//! Assignment Model
//!
//! The link between one resident and one room for one academic period.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Assignment entity (住宿分配)
///
/// Keyed deterministically by `⟨student_id⟩_⟨period_key⟩` so re-committing
/// the same board snapshot upserts the same records instead of duplicating
/// them, and a resident can hold at most one assignment per period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub resident: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub room: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub period: RecordId,
    /// Denormalized for the deterministic key and queue queries
    pub student_id: String,
    pub period_key: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_archived: bool,
    #[serde(default)]
    pub version: i64,
}

impl Assignment {
    /// Deterministic record key for a resident in a period
    pub fn record_key(student_id: &str, period_key: &str) -> String {
        format!("{}_{}", student_id, period_key)
    }

    /// Deterministic record id (`assignment:⟨student_id⟩_⟨period_key⟩`)
    pub fn record_id(student_id: &str, period_key: &str) -> RecordId {
        RecordId::from_table_key("assignment", Self::record_key(student_id, period_key))
    }
}
