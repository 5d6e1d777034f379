//! Shared types for the dorm management system
//!
//! Request/response DTOs and sync payloads used by both dorm-server
//! and its clients (admin console, manager console).

pub mod client;
pub mod response;
pub mod sync;
pub mod util;

// Re-exports
pub use client::{LoginRequest, LoginResponse, UserInfo};
pub use response::ApiResponse;
pub use serde::{Deserialize, Serialize};
pub use sync::SyncPayload;
