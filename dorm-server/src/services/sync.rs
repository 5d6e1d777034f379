//! 数据同步服务
//!
//! 通过 tokio broadcast 通道向所有连接的控制台推送资源变更通知。
//! SSE 端点订阅该通道，将 [`SyncPayload`] 以 JSON 推送给前端。

use shared::SyncPayload;
use tokio::sync::broadcast;

/// 广播通道容量 — 慢消费者落后超过此数量的消息会收到 Lagged
const SYNC_CHANNEL_CAPACITY: usize = 256;

/// 数据同步服务
///
/// 无订阅者时 `publish` 是空操作，不是错误。
#[derive(Debug, Clone)]
pub struct SyncService {
    tx: broadcast::Sender<SyncPayload>,
}

impl SyncService {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SYNC_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// 发布一条同步消息给所有订阅者
    pub fn publish(&self, payload: SyncPayload) {
        let receivers = self.tx.receiver_count();
        if receivers == 0 {
            tracing::trace!(resource = %payload.resource, "No sync subscribers, skipping");
            return;
        }
        if let Err(e) = self.tx.send(payload) {
            tracing::debug!("Sync broadcast failed: {}", e);
        }
    }

    /// 订阅同步消息流（每个 SSE 连接一个接收端）
    pub fn subscribe(&self) -> broadcast::Receiver<SyncPayload> {
        self.tx.subscribe()
    }

    /// 当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SyncService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn published_payloads_reach_all_subscribers() {
        let svc = SyncService::new();
        let mut a = svc.subscribe();
        let mut b = svc.subscribe();

        svc.publish(SyncPayload {
            resource: "room".to_string(),
            version: 1,
            action: "updated".to_string(),
            id: "room:md4rm1".to_string(),
            data: None,
        });

        assert_eq!(a.recv().await.unwrap().resource, "room");
        assert_eq!(b.recv().await.unwrap().id, "room:md4rm1");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let svc = SyncService::new();
        svc.publish(SyncPayload {
            resource: "room".to_string(),
            version: 1,
            action: "updated".to_string(),
            id: "room:md4rm1".to_string(),
            data: None,
        });
        assert_eq!(svc.subscriber_count(), 0);
    }
}
