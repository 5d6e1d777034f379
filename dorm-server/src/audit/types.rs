//! 审计日志类型定义

use serde::{Deserialize, Serialize};

/// 审计操作类型（枚举，非自由文本）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // ═══ 系统生命周期 ═══
    /// 系统正常启动
    SystemStartup,

    // ═══ 认证 ═══
    /// 登录成功
    LoginSuccess,
    /// 登录失败
    LoginFailed,
    /// 登出
    Logout,

    // ═══ 住宿分配（核心操作）═══
    /// 分配看板批量提交
    BoardCommitted,
    /// 分配看板提交被拒绝（容量/版本冲突）
    BoardCommitRejected,
    /// 单人调寝
    ResidentTransferred,

    // ═══ 住宿生档案 ═══
    /// 住宿生登记
    ResidentCreated,
    /// 住宿生资料更新
    ResidentUpdated,
    /// 住宿生归档（退宿）
    ResidentArchived,

    // ═══ 管理操作 ═══
    /// 楼栋组创建
    BuildingGroupCreated,
    /// 楼栋组更新
    BuildingGroupUpdated,
    /// 楼栋组删除
    BuildingGroupDeleted,
    /// 寝室创建
    RoomCreated,
    /// 寝室更新
    RoomUpdated,
    /// 寝室删除
    RoomDeleted,
    /// 账号创建
    StaffCreated,
    /// 账号更新
    StaffUpdated,
    /// 账号停用
    StaffDeactivated,

    // ═══ 学年学期 ═══
    /// 学期创建
    PeriodCreated,
    /// 学期激活（滚动归档旧分配）
    PeriodActivated,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// 审计日志条目（不可变，只追加）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// 全局递增序列号（唯一标识）
    pub id: u64,
    /// 时间戳（Unix 毫秒）
    pub timestamp: i64,
    /// 操作类型
    pub action: AuditAction,
    /// 资源类型（如 "room", "resident", "board"）
    pub resource_type: String,
    /// 资源 ID（如 "room:md4rm1", "resident:21-0001"）
    pub resource_id: String,
    /// 操作人 ID（系统事件为 None）
    pub operator_id: Option<String>,
    /// 操作人名称
    pub operator_name: Option<String>,
    /// 结构化详情（JSON）
    pub details: serde_json::Value,
}

/// 审计日志查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct AuditQuery {
    /// 起始时间（Unix 毫秒，含）
    pub from: Option<i64>,
    /// 截止时间（Unix 毫秒，含）
    pub to: Option<i64>,
    /// 操作类型过滤
    pub action: Option<AuditAction>,
    /// 操作人 ID 过滤
    pub operator_id: Option<String>,
    /// 资源类型过滤
    pub resource_type: Option<String>,
    /// 分页偏移
    #[serde(default)]
    pub offset: usize,
    /// 分页大小（默认 50）
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// 审计日志列表响应
#[derive(Debug, Serialize)]
pub struct AuditListResponse {
    pub items: Vec<AuditEntry>,
    pub total: u64,
}
