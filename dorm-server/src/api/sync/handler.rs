//! Sync API Handlers

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use crate::core::ServerState;

/// GET /api/sync/events - 订阅变更事件流 (SSE)
///
/// 每条事件为一个 JSON 序列化的 [`shared::SyncPayload`]。
/// 落后超过通道容量的慢消费者会被跳过中间消息，继续接收最新事件。
pub async fn events(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.sync.subscribe();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(payload) => {
                    let event = match serde_json::to_string(&payload) {
                        Ok(json) => Event::default().event(payload.resource.clone()).data(json),
                        Err(e) => {
                            tracing::error!("Failed to serialize sync payload: {}", e);
                            continue;
                        }
                    };
                    return Some((Ok(event), rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "SSE subscriber lagged, skipping missed events");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// 同步状态响应
#[derive(Serialize)]
pub struct SyncStatus {
    /// 当前 SSE 订阅者数量
    pub subscribers: usize,
}

/// GET /api/sync/status - 同步服务状态
pub async fn status(State(state): State<ServerState>) -> Json<SyncStatus> {
    Json(SyncStatus {
        subscribers: state.sync.subscriber_count(),
    })
}
