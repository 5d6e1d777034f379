//! AcademicPeriod API 模块

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::{require_admin, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/periods", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/active", get(handler::get_active))
        .layer(middleware::from_fn(require_permission("periods:read")));

    // 学期创建与激活是全局滚动操作，仅管理员
    let manage_routes = Router::new()
        .route("/", axum::routing::post(handler::create))
        .route("/{id}/activate", axum::routing::post(handler::activate))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
