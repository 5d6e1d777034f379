//! 看板提交端到端测试
//!
//! 使用内存版 SurrealDB 走完整的仓储 + 提交协议路径：
//! 批量提交、幂等重放、容量与版本守卫、单人调寝、学期滚动。

use surrealdb::RecordId;

use dorm_server::db::DbService;
use dorm_server::db::models::{
    AcademicPeriodCreate, BuildingGroupCreate, GroupCategory, ResidentCreate, ResidentUpdate,
    RoomCreate,
};
use dorm_server::db::repository::{
    AcademicPeriodRepository, AssignmentRepository, BuildingGroupRepository, RepoError,
    ResidentRepository, RoomRepository,
};
use dorm_server::occupancy::{
    BoardSnapshot, CommitService, PlacementDiff, TransferRequest, VersionCheck,
};

struct Fixture {
    db: DbService,
    group: RecordId,
    rm1: RecordId,
    rm2: RecordId,
    period_key: String,
}

fn resident_payload(student_id: &str, last_name: &str, group: &RecordId) -> ResidentCreate {
    ResidentCreate {
        student_id: student_id.to_string(),
        first_name: "Juan".to_string(),
        last_name: last_name.to_string(),
        course: "BSIT".to_string(),
        year_level: 2,
        contact_number: "09170000000".to_string(),
        email: None,
        home_address: "Poblacion".to_string(),
        emergency_contact_name: "Maria".to_string(),
        emergency_contact_number: "09170000001".to_string(),
        group: group.clone(),
        school_year: "2025-2026".to_string(),
        term: "1st".to_string(),
    }
}

/// 建库：一个楼栋组、两间寝室 (RM1 容量 2, RM2 容量 8)、三名住宿生、激活学期
async fn setup() -> Fixture {
    let db = DbService::new_memory().await.expect("in-memory db");

    let group = BuildingGroupRepository::new(db.db.clone())
        .create(BuildingGroupCreate {
            title: "Men's Dorm 4 & 5".to_string(),
            group_key: "md4-5".to_string(),
            category: GroupCategory::Male,
        })
        .await
        .expect("create group")
        .id
        .expect("group id");

    let rooms = RoomRepository::new(db.db.clone());
    let rm1 = rooms
        .create(RoomCreate {
            number: "RM1".to_string(),
            building: "MD4".to_string(),
            group: group.clone(),
            capacity: 2,
        })
        .await
        .expect("create RM1")
        .id
        .expect("room id");
    let rm2 = rooms
        .create(RoomCreate {
            number: "RM2".to_string(),
            building: "MD4".to_string(),
            group: group.clone(),
            capacity: 8,
        })
        .await
        .expect("create RM2")
        .id
        .expect("room id");

    let residents = ResidentRepository::new(db.db.clone());
    for (student_id, last_name) in [("21-0001", "Cruz"), ("21-0002", "Reyes"), ("21-0003", "Santos")]
    {
        residents
            .create(resident_payload(student_id, last_name, &group))
            .await
            .expect("create resident");
    }

    let periods = AcademicPeriodRepository::new(db.db.clone());
    let period = periods
        .create(AcademicPeriodCreate {
            school_year: "2025-2026".to_string(),
            term: "1st".to_string(),
        })
        .await
        .expect("create period");
    let period = periods
        .activate(&period.id.expect("period id").to_string())
        .await
        .expect("activate period");

    Fixture {
        db,
        group,
        rm1,
        rm2,
        period_key: period.period_key,
    }
}

fn diff(upserts: &[(&str, &RecordId)], removals: &[&str]) -> PlacementDiff {
    PlacementDiff {
        upserts: upserts
            .iter()
            .map(|(s, r)| (s.to_string(), (*r).clone()))
            .collect(),
        removals: removals.iter().map(|s| s.to_string()).collect(),
    }
}

async fn reconstruct(fx: &Fixture) -> BoardSnapshot {
    let rooms = RoomRepository::new(fx.db.db.clone())
        .find_by_group(&fx.group.to_string())
        .await
        .expect("rooms");
    let residents = ResidentRepository::new(fx.db.db.clone())
        .find_by_group(&fx.group.to_string())
        .await
        .expect("residents");
    let assignments = AssignmentRepository::new(fx.db.db.clone())
        .find_by_group_and_period(&fx.group.to_string(), &fx.period_key)
        .await
        .expect("assignments");
    BoardSnapshot::reconstruct(&rooms, &residents, &assignments)
}

#[tokio::test]
async fn group_links_are_stored_as_record_links() {
    let fx = setup().await;

    // group 字段一旦被串化存储，所有按组过滤的查询都会落空，
    // 提交协议重算 occupied 时也会拿到空房间集
    let mut res = fx
        .db
        .db
        .query("SELECT VALUE type::is::record(group) FROM room")
        .await
        .expect("query");
    let flags: Vec<bool> = res.take(0).expect("flags");
    assert_eq!(flags.len(), 2);
    assert!(flags.into_iter().all(|is_link| is_link));

    let rooms = RoomRepository::new(fx.db.db.clone())
        .find_by_group(&fx.group.to_string())
        .await
        .expect("rooms");
    assert_eq!(rooms.len(), 2);

    let repo = ResidentRepository::new(fx.db.db.clone());
    let residents = repo.find_by_group(&fx.group.to_string()).await.expect("residents");
    assert_eq!(residents.len(), 3);

    // 资料更新不触碰 group link
    let resident = repo
        .find_by_student_id("21-0001")
        .await
        .expect("query")
        .expect("resident");
    repo.update(
        &resident.id.expect("id").to_string(),
        ResidentUpdate {
            course: Some("BSCS".to_string()),
            ..Default::default()
        },
    )
    .await
    .expect("update");
    let residents = repo.find_by_group(&fx.group.to_string()).await.expect("residents");
    assert_eq!(residents.len(), 3);
}

#[tokio::test]
async fn board_commit_places_resident_and_updates_counter() {
    let fx = setup().await;
    let commit = CommitService::new(fx.db.db.clone());

    commit
        .commit_board(&fx.group, &diff(&[("21-0001", &fx.rm1)], &[]), vec![])
        .await
        .expect("commit");

    let room = RoomRepository::new(fx.db.db.clone())
        .find_by_id(&fx.rm1.to_string())
        .await
        .expect("query")
        .expect("room");
    assert_eq!(room.occupied, 1);
    assert!(room.version > 0);

    let board = reconstruct(&fx).await;
    let view = board.room(&fx.rm1).expect("room view");
    assert_eq!(view.occupants[0].student_id, "21-0001");
    assert!(!board.unassigned.iter().any(|o| o.student_id == "21-0001"));
}

#[tokio::test]
async fn recommitting_the_same_snapshot_is_idempotent() {
    let fx = setup().await;
    let commit = CommitService::new(fx.db.db.clone());
    let d = diff(&[("21-0001", &fx.rm1), ("21-0002", &fx.rm2)], &[]);

    commit.commit_board(&fx.group, &d, vec![]).await.expect("first commit");
    commit.commit_board(&fx.group, &d, vec![]).await.expect("replay commit");

    // 确定性键：重放覆写同一批记录，不产生重复分配
    let assignments = AssignmentRepository::new(fx.db.db.clone())
        .find_by_period(&fx.period_key)
        .await
        .expect("assignments");
    assert_eq!(assignments.len(), 2);

    let room = RoomRepository::new(fx.db.db.clone())
        .find_by_id(&fx.rm1.to_string())
        .await
        .expect("query")
        .expect("room");
    assert_eq!(room.occupied, 1);
}

#[tokio::test]
async fn over_capacity_commit_rolls_back_entirely() {
    let fx = setup().await;
    let commit = CommitService::new(fx.db.db.clone());

    // RM1 容量 2，塞 3 人
    let d = diff(
        &[
            ("21-0001", &fx.rm1),
            ("21-0002", &fx.rm1),
            ("21-0003", &fx.rm1),
        ],
        &[],
    );
    let err = commit.commit_board(&fx.group, &d, vec![]).await.unwrap_err();
    assert!(matches!(err, RepoError::CapacityExceeded(_)));

    // 整批回滚：没有任何分配被持久化
    let assignments = AssignmentRepository::new(fx.db.db.clone())
        .find_by_period(&fx.period_key)
        .await
        .expect("assignments");
    assert!(assignments.is_empty());

    let room = RoomRepository::new(fx.db.db.clone())
        .find_by_id(&fx.rm1.to_string())
        .await
        .expect("query")
        .expect("room");
    assert_eq!(room.occupied, 0);
}

#[tokio::test]
async fn stale_room_version_is_rejected_as_conflict() {
    let fx = setup().await;
    let commit = CommitService::new(fx.db.db.clone());

    // 先提交一次使 RM1 版本前进
    commit
        .commit_board(&fx.group, &diff(&[("21-0001", &fx.rm1)], &[]), vec![])
        .await
        .expect("first commit");

    // 用读取提交前看板时的旧版本 (0) 再提交
    let err = commit
        .commit_board(
            &fx.group,
            &diff(&[("21-0002", &fx.rm1)], &[]),
            vec![VersionCheck {
                room: fx.rm1.clone(),
                version: 0,
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    let assignments = AssignmentRepository::new(fx.db.db.clone())
        .find_by_period(&fx.period_key)
        .await
        .expect("assignments");
    assert_eq!(assignments.len(), 1);
}

#[tokio::test]
async fn removal_frees_the_bed() {
    let fx = setup().await;
    let commit = CommitService::new(fx.db.db.clone());

    commit
        .commit_board(&fx.group, &diff(&[("21-0001", &fx.rm1)], &[]), vec![])
        .await
        .expect("place");
    commit
        .commit_board(&fx.group, &diff(&[], &["21-0001"]), vec![])
        .await
        .expect("remove");

    let room = RoomRepository::new(fx.db.db.clone())
        .find_by_id(&fx.rm1.to_string())
        .await
        .expect("query")
        .expect("room");
    assert_eq!(room.occupied, 0);

    let board = reconstruct(&fx).await;
    assert!(board.unassigned.iter().any(|o| o.student_id == "21-0001"));
}

#[tokio::test]
async fn transfer_moves_resident_between_rooms_atomically() {
    let fx = setup().await;
    let commit = CommitService::new(fx.db.db.clone());

    commit
        .commit_board(&fx.group, &diff(&[("21-0001", &fx.rm1)], &[]), vec![])
        .await
        .expect("place");

    let rooms = RoomRepository::new(fx.db.db.clone());
    let src = rooms
        .find_by_id(&fx.rm1.to_string())
        .await
        .expect("query")
        .expect("room");
    let dst = rooms
        .find_by_id(&fx.rm2.to_string())
        .await
        .expect("query")
        .expect("room");

    commit
        .commit_transfer(TransferRequest {
            student_id: "21-0001".to_string(),
            source_room: fx.rm1.clone(),
            dest_room: fx.rm2.clone(),
            source_version: src.version,
            dest_version: dst.version,
        })
        .await
        .expect("transfer");

    let src = rooms
        .find_by_id(&fx.rm1.to_string())
        .await
        .expect("query")
        .expect("room");
    let dst = rooms
        .find_by_id(&fx.rm2.to_string())
        .await
        .expect("query")
        .expect("room");
    assert_eq!(src.occupied, 0);
    assert_eq!(dst.occupied, 1);

    let board = reconstruct(&fx).await;
    assert_eq!(
        board.room(&fx.rm2).expect("view").occupants[0].student_id,
        "21-0001"
    );
}

#[tokio::test]
async fn transfer_into_full_room_is_rejected() {
    let fx = setup().await;
    let commit = CommitService::new(fx.db.db.clone());

    // RM1 (容量 2) 住满，21-0003 在 RM2
    commit
        .commit_board(
            &fx.group,
            &diff(
                &[
                    ("21-0001", &fx.rm1),
                    ("21-0002", &fx.rm1),
                    ("21-0003", &fx.rm2),
                ],
                &[],
            ),
            vec![],
        )
        .await
        .expect("seed");

    let rooms = RoomRepository::new(fx.db.db.clone());
    let src = rooms
        .find_by_id(&fx.rm2.to_string())
        .await
        .expect("query")
        .expect("room");
    let dst = rooms
        .find_by_id(&fx.rm1.to_string())
        .await
        .expect("query")
        .expect("room");

    let err = commit
        .commit_transfer(TransferRequest {
            student_id: "21-0003".to_string(),
            source_room: fx.rm2.clone(),
            dest_room: fx.rm1.clone(),
            source_version: src.version,
            dest_version: dst.version,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::CapacityExceeded(_)));

    // 计数未被触碰
    let dst_after = rooms
        .find_by_id(&fx.rm1.to_string())
        .await
        .expect("query")
        .expect("room");
    assert_eq!(dst_after.occupied, 2);
}

#[tokio::test]
async fn period_rollover_archives_assignments_and_resets_counters() {
    let fx = setup().await;
    let commit = CommitService::new(fx.db.db.clone());

    commit
        .commit_board(
            &fx.group,
            &diff(&[("21-0001", &fx.rm1), ("21-0002", &fx.rm2)], &[]),
            vec![],
        )
        .await
        .expect("seed");

    let periods = AcademicPeriodRepository::new(fx.db.db.clone());
    let next = periods
        .create(AcademicPeriodCreate {
            school_year: "2025-2026".to_string(),
            term: "2nd".to_string(),
        })
        .await
        .expect("create next period");
    periods
        .activate(&next.id.expect("period id").to_string())
        .await
        .expect("activate next period");

    // 旧学期的分配全部归档
    let old_live = AssignmentRepository::new(fx.db.db.clone())
        .find_by_period(&fx.period_key)
        .await
        .expect("assignments");
    assert!(old_live.is_empty());

    // 床位计数清零，新学期的看板所有人排队
    let room = RoomRepository::new(fx.db.db.clone())
        .find_by_id(&fx.rm1.to_string())
        .await
        .expect("query")
        .expect("room");
    assert_eq!(room.occupied, 0);

    let fx_next = Fixture {
        period_key: "2025-2026_2nd".to_string(),
        ..fx
    };
    let board = reconstruct(&fx_next).await;
    assert!(board.rooms.iter().all(|v| v.occupants.is_empty()));
    assert_eq!(board.unassigned.len(), 3);
}

#[tokio::test]
async fn archiving_a_resident_frees_their_bed() {
    let fx = setup().await;
    let commit = CommitService::new(fx.db.db.clone());

    commit
        .commit_board(&fx.group, &diff(&[("21-0001", &fx.rm1)], &[]), vec![])
        .await
        .expect("place");

    let residents = ResidentRepository::new(fx.db.db.clone());
    let resident = residents
        .find_by_student_id("21-0001")
        .await
        .expect("query")
        .expect("resident");
    residents
        .archive(&resident.id.expect("id").to_string(), &fx.period_key)
        .await
        .expect("archive");

    let room = RoomRepository::new(fx.db.db.clone())
        .find_by_id(&fx.rm1.to_string())
        .await
        .expect("query")
        .expect("room");
    assert_eq!(room.occupied, 0);

    // 归档的住宿生不再出现在看板任何位置
    let board = reconstruct(&fx).await;
    assert!(!board.contains("21-0001"));
}

#[tokio::test]
async fn commit_without_active_period_is_rejected() {
    let db = DbService::new_memory().await.expect("in-memory db");
    let group = BuildingGroupRepository::new(db.db.clone())
        .create(BuildingGroupCreate {
            title: "Women's Dorm 1".to_string(),
            group_key: "wd1".to_string(),
            category: GroupCategory::Female,
        })
        .await
        .expect("create group")
        .id
        .expect("group id");
    let rm = RoomRepository::new(db.db.clone())
        .create(RoomCreate {
            number: "RM1".to_string(),
            building: "WD1".to_string(),
            group: group.clone(),
            capacity: 4,
        })
        .await
        .expect("create room")
        .id
        .expect("room id");

    let err = CommitService::new(db.db.clone())
        .commit_board(&group, &diff(&[("22-0001", &rm)], &[]), vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}
