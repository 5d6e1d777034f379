//! Sync API 模块
//!
//! SSE 推送资源变更给在线控制台

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sync", routes())
}

fn routes() -> Router<ServerState> {
    // 订阅变更流：登录即可（认证中间件已拦截未登录请求）
    Router::new()
        .route("/events", get(handler::events))
        .route("/status", get(handler::status))
}
