//! Resident Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// Resident entity (住宿生)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resident {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Unique student number, e.g. "21-0001"
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub course: String,
    pub year_level: i64,
    pub contact_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub home_address: String,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    /// Building group this resident belongs to
    #[serde(with = "serde_helpers::record_id")]
    pub group: RecordId,
    /// Registration period
    pub school_year: String,
    pub term: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_archived: bool,
}

impl Resident {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Create resident payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResidentCreate {
    #[validate(length(min = 1, max = 20))]
    pub student_id: String,
    #[validate(length(min = 1, max = 80))]
    pub first_name: String,
    #[validate(length(min = 1, max = 80))]
    pub last_name: String,
    #[validate(length(min = 1, max = 120))]
    pub course: String,
    #[validate(range(min = 1, max = 8))]
    pub year_level: i64,
    #[validate(length(min = 1, max = 30))]
    pub contact_number: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 240))]
    pub home_address: String,
    #[validate(length(min = 1, max = 160))]
    pub emergency_contact_name: String,
    #[validate(length(min = 1, max = 30))]
    pub emergency_contact_number: String,
    #[serde(with = "serde_helpers::record_id")]
    pub group: RecordId,
    #[validate(length(min = 1, max = 20))]
    pub school_year: String,
    #[validate(length(min = 1, max = 10))]
    pub term: String,
}

/// Update resident payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ResidentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 80))]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 80))]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 120))]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 8))]
    pub year_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 30))]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 240))]
    pub home_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 160))]
    pub emergency_contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 30))]
    pub emergency_contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
}
