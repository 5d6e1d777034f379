//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口
//! - [`building_groups`] - 楼栋组管理接口
//! - [`rooms`] - 寝室管理接口
//! - [`residents`] - 住宿生档案接口
//! - [`periods`] - 学年学期接口
//! - [`staff`] - 账号管理接口
//! - [`board`] - 住宿分配看板接口
//! - [`sync`] - 变更推送 (SSE) 接口
//! - [`audit_log`] - 审计日志查询接口

use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

pub mod auth;
pub mod health;

// Data models API
pub mod audit_log;
pub mod board;
pub mod building_groups;
pub mod periods;
pub mod residents;
pub mod rooms;
pub mod staff;
pub mod sync;

/// HTTP 请求日志中间件
async fn log_request(
    request: axum::extract::Request,
    next: middleware::Next,
) -> axum::response::Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        // Core APIs
        .merge(auth::router())
        .merge(health::router())
        // Data model APIs
        .merge(building_groups::router())
        .merge(rooms::router())
        .merge(residents::router())
        .merge(periods::router())
        .merge(staff::router())
        .merge(board::router())
        .merge(sync::router())
        .merge(audit_log::router())
}

/// Build the full application router with state and middleware
pub fn create_router(state: ServerState) -> Router {
    build_app()
        // JWT 认证中间件 - require_auth 内部会跳过公共路由
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        // Tower HTTP 中间件
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        // HTTP 请求日志中间件
        .layer(middleware::from_fn(log_request))
}
