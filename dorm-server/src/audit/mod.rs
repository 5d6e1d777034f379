//! 审计日志模块
//!
//! 敏感操作（分配提交、调寝、归档、账号管理）的只追加审计记录：
//! - [`AuditService`] - 日志写入（mpsc 异步）与查询
//! - [`AuditWorker`] - 后台写入 worker
//! - [`AuditAction`] - 操作类型枚举

pub mod service;
pub mod storage;
pub mod types;
pub mod worker;

pub use service::{AuditLogRequest, AuditService};
pub use storage::AuditStorage;
pub use types::{AuditAction, AuditEntry, AuditListResponse, AuditQuery};
pub use worker::AuditWorker;

use std::sync::Arc;

/// 启动审计 worker 后台任务
pub fn spawn_worker(
    service: &Arc<AuditService>,
    rx: tokio::sync::mpsc::Receiver<AuditLogRequest>,
) {
    let worker = AuditWorker::new(service.storage_clone());
    tokio::spawn(worker.run(rx));
}
