//! Room Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// Room entity (寝室)
///
/// `occupied` is a derived counter maintained by the commit protocol and
/// validated against the assignment set on every board reconstruction.
/// `version` is the optimistic-concurrency revision: every committed write
/// increments it, and commits that carry a stale version are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Room number, unique within its building code (e.g. "RM1")
    pub number: String,
    /// Sub-building code (e.g. "MD4")
    pub building: String,
    /// Building group reference
    #[serde(with = "serde_helpers::record_id")]
    pub group: RecordId,
    /// Bed capacity, always positive
    pub capacity: i64,
    #[serde(default)]
    pub occupied: i64,
    #[serde(default)]
    pub version: i64,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Room {
    /// Room label used in logs and client views, e.g. "MD4-RM1"
    pub fn label(&self) -> String {
        format!("{}-{}", self.building, self.number)
    }
}

/// Create room payload
///
/// Capacity is required and must be positive. There is no fallback
/// default: a room without a real bed count is a data error.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoomCreate {
    #[validate(length(min = 1, max = 40))]
    pub number: String,
    #[validate(length(min = 1, max = 20))]
    pub building: String,
    #[serde(with = "serde_helpers::record_id")]
    pub group: RecordId,
    #[validate(range(min = 1, max = 64))]
    pub capacity: i64,
}

/// Update room payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoomUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 40))]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 64))]
    pub capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(capacity: i64) -> RoomCreate {
        RoomCreate {
            number: "RM1".to_string(),
            building: "MD4".to_string(),
            group: RecordId::from_table_key("building_group", "md4-5"),
            capacity,
        }
    }

    #[test]
    fn capacity_bounds_are_declared_on_the_payload() {
        assert!(payload(0).validate().is_err());
        assert!(payload(65).validate().is_err());
        assert!(payload(8).validate().is_ok());
    }

    #[test]
    fn update_rejects_empty_room_number() {
        let update = RoomUpdate {
            number: Some(String::new()),
            capacity: None,
            is_active: None,
        };
        assert!(update.validate().is_err());
    }
}
