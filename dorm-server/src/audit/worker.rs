//! 审计落盘任务
//!
//! 请求路径只把 [`AuditLogRequest`] 投进通道；真正写 `audit_log` 表的是
//! 这里的后台任务，写库慢或失败都不会反压到任何住宿操作。

use tokio::sync::mpsc::Receiver;

use super::service::AuditLogRequest;
use super::storage::AuditStorage;

/// 消费审计通道、逐条落盘的后台任务
pub struct AuditWorker {
    storage: AuditStorage,
}

impl AuditWorker {
    pub fn new(storage: AuditStorage) -> Self {
        Self { storage }
    }

    /// 持续消费通道直到所有发送端关闭
    ///
    /// 单条写入失败只计数并记错误日志，不终止任务；代价是审计序列
    /// 出现缺口。
    pub async fn run(self, mut rx: Receiver<AuditLogRequest>) {
        tracing::info!("📋 Housing audit writer ready");

        let mut persisted: u64 = 0;
        let mut lost: u64 = 0;

        while let Some(req) = rx.recv().await {
            let action = req.action;
            let outcome = self
                .storage
                .append(
                    req.action,
                    req.resource_type,
                    req.resource_id,
                    req.operator_id,
                    req.operator_name,
                    req.details,
                )
                .await;

            match outcome {
                Ok(entry) => {
                    persisted += 1;
                    tracing::debug!(seq = entry.id, action = %entry.action, "Audit entry persisted");
                }
                Err(e) => {
                    lost += 1;
                    tracing::error!(action = %action, error = %e, "Audit entry lost");
                }
            }
        }

        tracing::info!(persisted, lost, "Audit channel drained, writer stopped");
    }
}
