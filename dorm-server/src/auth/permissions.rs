//! Permission Definitions
//!
//! Simplified RBAC permission system.
//!
//! ## 设计原则
//! - 读取操作（查看楼栋、寝室、住宿看板）登录即可使用
//! - 模块化权限：按功能模块授权
//! - 楼栋/寝室/学期配置与账号管理仅 admin 角色可用

/// 可配置权限列表
/// 不包含 "all" 和 "staff:manage"，这些是系统级权限
pub const ALL_PERMISSIONS: &[&str] = &[
    // === 读取 (5) ===
    "groups:read",    // 查看楼栋组
    "rooms:read",     // 查看寝室
    "residents:read", // 查看住宿生档案
    "board:read",     // 查看住宿分配看板
    "periods:read",   // 查看学年学期

    // === 宿管操作 (2) ===
    "residents:manage", // 住宿生登记/修改/归档
    "board:commit",     // 提交分配看板 (含调寝)
];

/// Admin 专属权限（不在可配置列表中）
pub const ADMIN_ONLY_PERMISSIONS: &[&str] = &[
    "groups:manage",  // 楼栋组管理
    "rooms:manage",   // 寝室管理
    "periods:manage", // 学年/学期管理
    "staff:manage",   // 账号管理
    "all",            // 超级权限
];

/// Default role permissions
pub const DEFAULT_ADMIN_PERMISSIONS: &[&str] = &["all"];

/// 宿管角色默认权限（全部可配置权限）
pub const DEFAULT_MANAGER_PERMISSIONS: &[&str] = &[
    "groups:read",
    "rooms:read",
    "residents:read",
    "board:read",
    "periods:read",
    "residents:manage",
    "board:commit",
];

/// Get permissions for a role name
pub fn get_default_permissions(role_name: &str) -> Vec<String> {
    match role_name {
        "admin" => DEFAULT_ADMIN_PERMISSIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        "manager" => DEFAULT_MANAGER_PERMISSIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        _ => vec![],
    }
}

/// Validate if a permission string is valid
pub fn is_valid_permission(permission: &str) -> bool {
    ALL_PERMISSIONS.contains(&permission)
        || ADMIN_ONLY_PERMISSIONS.contains(&permission)
        || permission.ends_with(":*")
}
