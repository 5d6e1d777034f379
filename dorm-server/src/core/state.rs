use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use shared::SyncPayload;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::audit::{self, AuditAction, AuditService};
use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::StaffRepository;
use crate::services::SyncService;

/// 资源版本管理器
///
/// 使用 DashMap 实现无锁并发的版本号管理。
/// 每种资源类型维护独立的版本号，支持原子递增。
///
/// # 使用场景
///
/// 用于 broadcast_sync 时自动生成递增的版本号，
/// 确保客户端可以通过版本号判断数据新旧。
#[derive(Debug)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    /// 创建空的版本管理器
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// 递增指定资源的版本号并返回新值
    ///
    /// 如果资源不存在，从 0 开始递增（返回 1）
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 获取指定资源的当前版本号
    ///
    /// 如果资源不存在，返回 0
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// 服务器状态 - 持有所有服务的单例引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | sync | SyncService | 资源变更广播 |
/// | audit | Arc<AuditService> | 审计日志服务 |
/// | resource_versions | Arc<ResourceVersions> | 资源版本管理 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 资源变更广播服务 (SSE 推送源)
    pub sync: SyncService,
    /// 审计日志服务
    pub audit: Arc<AuditService>,
    /// 资源版本管理器 (用于 broadcast_sync 自动递增版本号)
    pub resource_versions: Arc<ResourceVersions>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/dorm.db)
    /// 3. 各服务 (JWT, Sync, Audit)
    /// 4. 初始管理员账号
    ///
    /// # Panics
    ///
    /// 工作目录或数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("dorm.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        Self::from_db(config, db_service).await
    }

    /// 基于已有数据库实例初始化（测试场景用内存库）
    pub async fn from_db(config: &Config, db_service: DbService) -> Self {
        let db = db_service.db;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let sync = SyncService::new();
        let (audit_service, audit_rx) = AuditService::new(db.clone(), config.audit_buffer_size);
        audit::spawn_worker(&audit_service, audit_rx);

        let state = Self {
            config: config.clone(),
            db: db.clone(),
            jwt_service,
            sync,
            audit: audit_service,
            resource_versions: Arc::new(ResourceVersions::new()),
        };

        // 确保初始管理员账号存在
        match config.admin_password.as_deref() {
            Some(password) => {
                if let Err(e) = StaffRepository::new(db)
                    .ensure_system_admin(&config.admin_username, password)
                    .await
                {
                    tracing::error!("Failed to ensure system admin account: {}", e);
                }
            }
            None => {
                tracing::warn!(
                    "ADMIN_PASSWORD not set; skipping bootstrap admin account creation"
                );
            }
        }

        state
            .audit
            .log_system(AuditAction::SystemStartup, serde_json::json!({}));

        state
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 广播同步消息
    ///
    /// 向所有连接的控制台广播资源变更通知。
    /// 版本号由 ResourceVersions 自动递增管理。
    ///
    /// # 参数
    /// - `resource`: 资源类型 (如 "room", "resident", "board")
    /// - `action`: 变更类型 ("created", "updated", "deleted", "committed")
    /// - `id`: 资源 ID
    /// - `data`: 资源数据 (deleted 时为 None)
    pub fn broadcast_sync<T: serde::Serialize>(
        &self,
        resource: &str,
        action: &str,
        id: &str,
        data: Option<&T>,
    ) {
        let version = self.resource_versions.increment(resource);
        let payload = SyncPayload {
            resource: resource.to_string(),
            version,
            action: action.to_string(),
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        self.sync.publish(payload);
    }
}
