//! Academic Period Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// Academic period entity (学年 + 学期)
///
/// Exactly one period is active system-wide at a time. `period_key` is the
/// stored stable identifier used in assignment keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicPeriod {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// e.g. "2025-2026"
    pub school_year: String,
    /// e.g. "1st", "2nd", "summer"
    pub term: String,
    /// Stable key, e.g. "2025-2026_1st"
    pub period_key: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_active: bool,
}

impl AcademicPeriod {
    /// Stable key for a (school_year, term) pair.
    ///
    /// Computed once at creation and stored; reads always use the stored
    /// value.
    pub fn make_key(school_year: &str, term: &str) -> String {
        format!("{}_{}", school_year, term)
    }
}

/// Create academic period payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AcademicPeriodCreate {
    #[validate(length(min = 4, max = 20))]
    pub school_year: String,
    #[validate(length(min = 1, max = 10))]
    pub term: String,
}
