//! 员工账号与认证测试
//!
//! 启动引导管理员、账号生命周期守卫、JWT 签发与权限判定。

use surrealdb::RecordId;

use dorm_server::auth::permissions;
use dorm_server::db::DbService;
use dorm_server::db::models::{StaffCreate, StaffRole, StaffUpdate};
use dorm_server::db::repository::{RepoError, StaffRepository};
use dorm_server::{CurrentUser, JwtService};

async fn repo() -> StaffRepository {
    let db = DbService::new_memory().await.expect("in-memory db");
    StaffRepository::new(db.db.clone())
}

#[tokio::test]
async fn bootstrap_admin_is_created_once() {
    let repo = repo().await;

    repo.ensure_system_admin("admin", "change-me-please")
        .await
        .expect("bootstrap");
    repo.ensure_system_admin("admin", "another-password")
        .await
        .expect("idempotent bootstrap");

    let all = repo.find_all().await.expect("list");
    assert_eq!(all.len(), 1);

    let admin = all.into_iter().next().unwrap();
    assert!(admin.is_system);
    assert_eq!(admin.role, StaffRole::Admin);
    // 第二次调用不覆盖密码
    assert!(admin.verify_password("change-me-please").unwrap());
    assert!(!admin.verify_password("another-password").unwrap());
}

#[tokio::test]
async fn manager_requires_building_group() {
    let repo = repo().await;

    let err = repo
        .create(StaffCreate {
            username: "md4_manager".to_string(),
            password: "s3cret-pass".to_string(),
            display_name: None,
            role: StaffRole::Manager,
            building_group: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let created = repo
        .create(StaffCreate {
            username: "md4_manager".to_string(),
            password: "s3cret-pass".to_string(),
            display_name: Some("MD4 Manager".to_string()),
            role: StaffRole::Manager,
            building_group: Some(RecordId::from_table_key("building_group", "md4")),
        })
        .await
        .expect("create manager");
    assert!(created.is_active);
    assert!(created.verify_password("s3cret-pass").unwrap());
}

#[tokio::test]
async fn password_hash_is_persisted_but_never_serialized() {
    let repo = repo().await;
    repo.create(StaffCreate {
        username: "gatekeeper".to_string(),
        password: "s3cret-pass".to_string(),
        display_name: None,
        role: StaffRole::Admin,
        building_group: None,
    })
    .await
    .expect("create");

    // 重新读取：哈希必须已经落库，否则后续所有登录都会失败
    let reloaded = repo
        .find_by_username("gatekeeper")
        .await
        .expect("query")
        .expect("staff");
    assert!(reloaded.verify_password("s3cret-pass").unwrap());
    assert!(!reloaded.verify_password("wrong-pass").unwrap());

    // API 输出不泄漏哈希
    let json = serde_json::to_value(&reloaded).expect("json");
    assert!(json.get("hash_pass").is_none());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let repo = repo().await;
    let payload = StaffCreate {
        username: "clerk".to_string(),
        password: "s3cret-pass".to_string(),
        display_name: None,
        role: StaffRole::Admin,
        building_group: None,
    };

    repo.create(payload.clone()).await.expect("first create");
    let err = repo.create(payload).await.unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));
}

#[tokio::test]
async fn system_account_guards() {
    let repo = repo().await;
    repo.ensure_system_admin("admin", "change-me-please")
        .await
        .expect("bootstrap");
    let admin = repo
        .find_by_username("admin")
        .await
        .expect("query")
        .expect("admin");
    let id = admin.id.expect("id").to_string();

    // 系统账号不可停用
    let err = repo.deactivate(&id).await.unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    // 系统账号只能改密码
    let err = repo
        .update(
            &id,
            StaffUpdate {
                username: Some("root".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let updated = repo
        .update(
            &id,
            StaffUpdate {
                password: Some("rotated-password".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("rotate password");
    assert!(updated.verify_password("rotated-password").unwrap());
}

#[tokio::test]
async fn deactivate_soft_deletes_regular_staff() {
    let repo = repo().await;
    let staff = repo
        .create(StaffCreate {
            username: "clerk".to_string(),
            password: "s3cret-pass".to_string(),
            display_name: None,
            role: StaffRole::Admin,
            building_group: None,
        })
        .await
        .expect("create");
    let id = staff.id.expect("id").to_string();

    assert!(repo.deactivate(&id).await.expect("deactivate"));
    let after = repo.find_by_id(&id).await.expect("query").expect("staff");
    assert!(!after.is_active);
}

#[test]
fn manager_token_carries_scoped_permissions() {
    let jwt = JwtService::new();
    let perms = permissions::get_default_permissions("manager");
    assert!(perms.contains(&"board:commit".to_string()));
    assert!(!perms.contains(&"staff:manage".to_string()));
    // 默认权限必须全部是已注册权限，不留悬空项
    assert!(perms.iter().all(|p| permissions::is_valid_permission(p)));

    let token = jwt
        .generate_token(
            "staff:md4",
            "md4_manager",
            "MD4 Manager",
            "manager",
            &perms,
            Some("building_group:md4".to_string()),
        )
        .expect("token");
    let claims = jwt.validate_token(&token).expect("claims");

    let user = CurrentUser::from(claims);
    assert!(!user.is_admin());
    assert!(user.has_permission("board:commit"));
    assert!(!user.has_permission("staff:manage"));
    assert!(user.can_manage_group("building_group:md4"));
    assert!(!user.can_manage_group("building_group:wd1"));
}
