//! 服务模块
//!
//! - [`SyncService`] - 资源变更广播（SSE 推送源）

pub mod sync;

pub use sync::SyncService;
