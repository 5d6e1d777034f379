//! Dorm Server - 大学宿舍住宿管理系统服务端
//!
//! # 架构概述
//!
//! - **占用核心** (`occupancy`): 看板重建、分配编辑会话、原子提交
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **审计** (`audit`): 敏感操作的只追加审计日志
//! - **HTTP API** (`api`): RESTful API 接口 + SSE 变更推送
//!
//! # 模块结构
//!
//! ```text
//! dorm-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、权限
//! ├── occupancy/     # 占用台账、编辑会话、提交协议
//! ├── audit/         # 审计日志
//! ├── services/      # 变更广播
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 错误、日志
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod audit;
pub mod auth;
pub mod core;
pub mod db;
pub mod occupancy;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use occupancy::{BoardSnapshot, CommitService, PlacementSession};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    ____                        _____
   / __ \____  _________ ___   / ___/___  ______   _____  _____
  / / / / __ \/ ___/ __ `__ \  \__ \/ _ \/ ___/ | / / _ \/ ___/
 / /_/ / /_/ / /  / / / / / / ___/ /  __/ /   | |/ /  __/ /
/_____/\____/_/  /_/ /_/ /_/ /____/\___/_/    |___/\___/_/
    "#
    );
}
