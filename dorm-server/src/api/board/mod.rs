//! Board API 模块
//!
//! 住宿分配看板：读取、批量提交、单人调寝

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/board", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/{group_id}", get(handler::get_board))
        .layer(middleware::from_fn(require_permission("board:read")));

    let commit_routes = Router::new()
        .route("/{group_id}/commit", post(handler::commit))
        .route("/{group_id}/transfer", post(handler::transfer))
        .layer(middleware::from_fn(require_permission("board:commit")));

    read_routes.merge(commit_routes)
}
