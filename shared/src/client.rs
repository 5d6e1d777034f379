//! Client-related types shared between server and client
//!
//! Common request/response types used in API communication.
//! These types are shared between dorm-server and the console clients.

use serde::{Deserialize, Serialize};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// User information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: String,
    /// Building group this account manages (manager accounts only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_group: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

