//! 审计日志服务
//!
//! `AuditService` 提供：
//! - 日志写入（通过 mpsc 通道异步接收）
//! - 日志查询（直接读取 SurrealDB）

use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::mpsc;

use super::storage::{AuditStorage, AuditStorageError};
use super::types::*;
use crate::auth::CurrentUser;

/// 发送到 AuditService 的日志请求
pub struct AuditLogRequest {
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub operator_id: Option<String>,
    pub operator_name: Option<String>,
    pub details: serde_json::Value,
}

/// 审计日志服务
///
/// 通过 mpsc 通道接收日志请求，异步写入 SurrealDB。
/// 查询操作直接读取 storage。写路径永不阻塞请求处理：
/// 通道满时丢弃并记录 tracing 错误。
pub struct AuditService {
    storage: AuditStorage,
    tx: mpsc::Sender<AuditLogRequest>,
}

impl std::fmt::Debug for AuditService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditService").finish_non_exhaustive()
    }
}

impl AuditService {
    /// 创建审计服务，返回服务和 worker 消费端
    pub fn new(
        db: Surreal<Db>,
        buffer_size: usize,
    ) -> (Arc<Self>, mpsc::Receiver<AuditLogRequest>) {
        let (tx, rx) = mpsc::channel(buffer_size);
        let storage = AuditStorage::new(db);
        let service = Arc::new(Self { storage, tx });
        (service, rx)
    }

    /// 记录一条审计日志（fire-and-forget）
    pub fn log(
        &self,
        action: AuditAction,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        operator: Option<&CurrentUser>,
        details: serde_json::Value,
    ) {
        let req = AuditLogRequest {
            action,
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            operator_id: operator.map(|u| u.id.clone()),
            operator_name: operator.map(|u| u.display_name.clone()),
            details,
        };

        if let Err(e) = self.tx.try_send(req) {
            tracing::error!("Audit log channel full or closed, entry dropped: {}", e);
        }
    }

    /// 记录系统事件（无操作人）
    pub fn log_system(&self, action: AuditAction, details: serde_json::Value) {
        self.log(action, "system", "system", None, details);
    }

    /// 查询审计日志
    pub async fn query(
        &self,
        q: &AuditQuery,
    ) -> Result<AuditListResponse, AuditStorageError> {
        let (items, total) = self.storage.query(q).await?;
        Ok(AuditListResponse { items, total })
    }

    pub(super) fn storage_clone(&self) -> AuditStorage {
        self.storage.clone()
    }
}
