//! Live-update sync payloads
//!
//! Broadcast to connected consoles whenever a resource changes, so
//! open views (room board, resident lists) can refresh without polling.

use serde::{Deserialize, Serialize};

/// Resource change notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Resource type (e.g. "room", "resident", "assignment")
    pub resource: String,
    /// Monotonically increasing version per resource type.
    /// Clients compare against their last seen version to detect missed
    /// updates and trigger a full refresh.
    pub version: u64,
    /// Change type ("created", "updated", "deleted", "committed")
    pub action: String,
    /// Resource ID
    pub id: String,
    /// Resource data (None for deletions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}
