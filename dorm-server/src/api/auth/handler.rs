//! Authentication Handlers
//!
//! Handles login, logout, and token management

use std::time::Duration;

use axum::{Extension, Json, extract::State};

use crate::audit::AuditAction;
use crate::auth::{CurrentUser, permissions};
use crate::core::ServerState;
use crate::db::models::Staff;
use crate::utils::AppError;

// Re-use shared DTOs for API consistency
use shared::client::{LoginRequest, LoginResponse, UserInfo};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Login handler
///
/// Authenticates staff credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let db = state.get_db();
    let username = req.username.clone();

    let mut result = db
        .query("SELECT * FROM staff WHERE username = $username LIMIT 1")
        .bind(("username", username.clone()))
        .await
        .map_err(|e| AppError::database(format!("Query failed: {}", e)))?;

    let staff: Option<Staff> = result
        .take(0)
        .map_err(|e| AppError::database(format!("Failed to parse staff record: {}", e)))?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent username enumeration
    let staff = match staff {
        Some(s) => {
            if !s.is_active {
                return Err(AppError::forbidden("Account has been disabled".to_string()));
            }

            let password_valid = s
                .verify_password(&req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

            if !password_valid {
                state.audit.log(
                    AuditAction::LoginFailed,
                    "auth",
                    format!("staff:{}", username),
                    None,
                    serde_json::json!({"reason": "invalid_credentials"}),
                );
                tracing::warn!(username = %username, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            s
        }
        None => {
            state.audit.log(
                AuditAction::LoginFailed,
                "auth",
                format!("staff:{}", username),
                None,
                serde_json::json!({"reason": "user_not_found"}),
            );
            tracing::warn!(username = %username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let role = staff.role.as_str();
    let user_permissions = permissions::get_default_permissions(role);
    let building_group = staff.building_group.as_ref().map(|g| g.to_string());

    let jwt_service = state.get_jwt_service();
    let user_id = staff.id.as_ref().map(|t| t.to_string()).unwrap_or_default();

    let token = jwt_service
        .generate_token(
            &user_id,
            &staff.username,
            &staff.display_name,
            role,
            &user_permissions,
            building_group.clone(),
        )
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    let current = CurrentUser {
        id: user_id.clone(),
        username: staff.username.clone(),
        display_name: staff.display_name.clone(),
        role: role.to_string(),
        permissions: user_permissions.clone(),
        building_group: building_group.clone(),
    };
    state.audit.log(
        AuditAction::LoginSuccess,
        "auth",
        user_id.clone(),
        Some(&current),
        serde_json::json!({"username": &staff.username}),
    );

    tracing::info!(
        user_id = %user_id,
        username = %staff.username,
        role = %role,
        "User logged in successfully"
    );

    let response = LoginResponse {
        token,
        user: UserInfo {
            id: user_id,
            username: staff.username.clone(),
            display_name: staff.display_name.clone(),
            role: role.to_string(),
            building_group,
            permissions: user_permissions,
        },
    };

    Ok(Json(response))
}

/// Get current user info
pub async fn me(Extension(user): Extension<CurrentUser>) -> Result<Json<UserInfo>, AppError> {
    Ok(Json(UserInfo {
        id: user.id,
        username: user.username,
        display_name: user.display_name,
        role: user.role,
        building_group: user.building_group,
        permissions: user.permissions,
    }))
}

/// Logout handler
pub async fn logout(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<()>, AppError> {
    state.audit.log(
        AuditAction::Logout,
        "auth",
        user.id.clone(),
        Some(&user),
        serde_json::json!({"username": &user.username}),
    );

    tracing::info!(
        user_id = %user.id,
        username = %user.username,
        "User logged out"
    );

    Ok(Json(()))
}
