//! Building Group Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// Building group category (男生楼 / 女生楼 / 其他)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupCategory {
    Male,
    Female,
    Other,
}

/// Building group entity — a named cluster of rooms administered as one
/// unit (e.g. "Men's Dorm 4 & 5"), typically with one assigned manager.
///
/// `group_key` is a stored stable identifier. It is never derived from the
/// display title at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingGroup {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub title: String,
    pub group_key: String,
    pub category: GroupCategory,
    /// Staff account managing this group (0 or 1)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub manager: Option<RecordId>,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Create building group payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BuildingGroupCreate {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    /// Stable key, e.g. "md4-5"
    #[validate(length(min = 1, max = 40))]
    pub group_key: String,
    pub category: GroupCategory,
}

/// Update building group payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BuildingGroupUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 120))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<GroupCategory>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub manager: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
