mod common;

use common::{ScriptedDevice, device_cfg, open_pool, raw_punch, raw_user};
use zkattend::core::sync::SyncLogic;
use zkattend::db::queries::{get_user, list_users, load_punches, set_user_fields};
use zkattend::errors::AppError;
use zkattend::models::filter::SummaryFilter;

#[test]
fn first_sync_inserts_everything() {
    let mut pool = open_pool("sync_first");
    let device = ScriptedDevice::new(
        vec![raw_user(1, Some("Alice")), raw_user(2, Some("Bob"))],
        vec![
            raw_punch(1, "2024-03-01 08:00:00"),
            raw_punch(1, "2024-03-01 17:00:00"),
            raw_punch(2, "2024-03-01 08:30:00"),
        ],
    );

    let (info, report) = SyncLogic::run(&mut pool, &device, &device_cfg()).expect("sync");

    assert_eq!(info.serial, "TEST0001");
    assert_eq!(report.users_added, 2);
    assert_eq!(report.users_unchanged, 0);
    assert_eq!(report.punches_added, 3);
    assert_eq!(report.punches_skipped, 0);

    let users = list_users(&pool.conn).expect("list users");
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name.as_deref(), Some("Alice"));
}

#[test]
fn second_sync_is_idempotent() {
    let mut pool = open_pool("sync_idempotent");
    let device = ScriptedDevice::new(
        vec![raw_user(1, Some("Alice"))],
        vec![
            raw_punch(1, "2024-03-01 08:00:00"),
            raw_punch(1, "2024-03-01 17:00:00"),
        ],
    );

    SyncLogic::run(&mut pool, &device, &device_cfg()).expect("first sync");
    let (_, report) = SyncLogic::run(&mut pool, &device, &device_cfg()).expect("second sync");

    assert_eq!(report.users_added, 0);
    assert_eq!(report.users_unchanged, 1);
    assert_eq!(report.punches_added, 0);
    assert_eq!(report.punches_skipped, 2);

    let punches = load_punches(&pool.conn, &SummaryFilter::default()).expect("load punches");
    assert_eq!(punches.len(), 2);
}

#[test]
fn sync_preserves_local_name_edits() {
    let mut pool = open_pool("sync_local_edits");

    let device = ScriptedDevice::new(vec![raw_user(1, Some("usr1"))], vec![]);
    SyncLogic::run(&mut pool, &device, &device_cfg()).expect("first sync");

    // Operator fixes the display name locally.
    set_user_fields(&pool.conn, 1, Some("Alice Smith"), Some("Engineering")).expect("set fields");

    SyncLogic::run(&mut pool, &device, &device_cfg()).expect("second sync");

    let user = get_user(&pool.conn, 1).expect("get").expect("exists");
    assert_eq!(user.name.as_deref(), Some("Alice Smith"));
    assert_eq!(user.department.as_deref(), Some("Engineering"));
    assert!(user.synced_at.is_some());
}

#[test]
fn orphan_punch_creates_placeholder_user() {
    let mut pool = open_pool("sync_orphan");

    // Punch from a user the roster never mentioned (deleted on the device
    // after the punch was recorded).
    let device = ScriptedDevice::new(
        vec![raw_user(1, Some("Alice"))],
        vec![
            raw_punch(1, "2024-03-01 08:00:00"),
            raw_punch(99, "2024-03-01 09:00:00"),
        ],
    );

    let (_, report) = SyncLogic::run(&mut pool, &device, &device_cfg()).expect("sync");

    assert_eq!(report.users_added, 2);
    assert_eq!(report.punches_added, 2);

    let ghost = get_user(&pool.conn, 99).expect("get").expect("placeholder exists");
    assert!(ghost.name.is_none());
}

#[test]
fn duplicate_roster_ids_collapse_to_one_row() {
    let mut pool = open_pool("sync_dup_roster");

    // Some firmware repeats a user id within one dump; the later record wins.
    let device = ScriptedDevice::new(
        vec![raw_user(7, Some("Old Name")), raw_user(7, Some("New Name"))],
        vec![],
    );

    let (_, report) = SyncLogic::run(&mut pool, &device, &device_cfg()).expect("sync");

    assert_eq!(report.users_added, 1);
    let user = get_user(&pool.conn, 7).expect("get").expect("exists");
    assert_eq!(user.name.as_deref(), Some("New Name"));
}

#[test]
fn unreachable_device_aborts_before_any_write() {
    let mut pool = open_pool("sync_unreachable");
    let device = ScriptedDevice::unreachable();

    let err = SyncLogic::run(&mut pool, &device, &device_cfg()).unwrap_err();
    assert!(matches!(err, AppError::Connection(_)));

    assert!(list_users(&pool.conn).expect("list").is_empty());
    assert!(
        load_punches(&pool.conn, &SummaryFilter::default())
            .expect("load")
            .is_empty()
    );
}

#[test]
fn committed_roster_survives_punch_fetch_failure() {
    let mut pool = open_pool("sync_partial_failure");

    // Probe and roster read succeed, then the link drops during the punch
    // read. The roster transaction is already committed; the punch pass must
    // leave nothing behind.
    let broken = ScriptedDevice::with_failing_punch_read(vec![
        raw_user(1, Some("Alice")),
        raw_user(2, Some("Bob")),
    ]);

    let err = SyncLogic::run(&mut pool, &broken, &device_cfg()).unwrap_err();
    assert!(matches!(err, AppError::Connection(_)));

    assert_eq!(list_users(&pool.conn).expect("list").len(), 2);
    assert!(
        load_punches(&pool.conn, &SummaryFilter::default())
            .expect("load")
            .is_empty()
    );

    // A retry against a healthy device picks up where the store left off.
    let healthy = ScriptedDevice::new(
        vec![raw_user(1, Some("Alice")), raw_user(2, Some("Bob"))],
        vec![raw_punch(1, "2024-03-01 08:00:00")],
    );
    let (_, report) = SyncLogic::run(&mut pool, &healthy, &device_cfg()).expect("retry");

    assert_eq!(report.users_added, 0);
    assert_eq!(report.users_unchanged, 2);
    assert_eq!(report.punches_added, 1);
    assert_eq!(report.punches_skipped, 0);
}

#[test]
fn empty_device_yields_empty_report() {
    let mut pool = open_pool("sync_empty");
    let device = ScriptedDevice::new(vec![], vec![]);

    let (_, report) = SyncLogic::run(&mut pool, &device, &device_cfg()).expect("sync");

    assert_eq!(report.users_added, 0);
    assert_eq!(report.users_unchanged, 0);
    assert_eq!(report.punches_added, 0);
    assert_eq!(report.punches_skipped, 0);
}
