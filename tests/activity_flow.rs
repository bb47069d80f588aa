use activity_bot::activity::{
    self, ActivityLog, Policy, ReactionDelta, SnapshotStore, StoreError, UserStats,
};
use chrono::{DateTime, Utc};

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
}

fn open(dir: &tempfile::TempDir) -> ActivityLog {
    let store = SnapshotStore::new(dir.path().join("activity_data.json"));
    ActivityLog::load(store, Policy::default()).unwrap()
}

#[test]
fn test_message_reaction_voice_scenario() {
    // Start empty, two messages, one reaction, 120s in voice
    let dir = tempfile::tempdir().unwrap();
    let mut log = open(&dir);

    log.record_message("42", false);
    log.record_message("42", false);
    log.record_reaction("42", false, ReactionDelta::Added);
    log.record_voice_join("42", false, at(0));
    log.record_voice_leave("42", false, at(120));

    assert_eq!(
        log.snapshot_for("42"),
        UserStats {
            messages: 2,
            reactions: 1,
            voice_seconds: 120.0,
        }
    );
}

#[test]
fn test_counters_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut log = open(&dir);
        for _ in 0..3 {
            log.record_message("1", false);
        }
        log.record_message("2", false);
        log.record_reaction("1", false, ReactionDelta::Removed);
        log.record_voice_join("2", false, at(10));
        log.record_voice_leave("2", false, at(100));

        // Open session at shutdown is not carried over
        log.record_voice_join("1", false, at(200));
    }

    let reopened = open(&dir);
    assert_eq!(reopened.snapshot_for("1").messages, 3);
    assert_eq!(reopened.snapshot_for("1").reactions, -1);
    assert_eq!(reopened.snapshot_for("2").voice_seconds, 90.0);
    assert!(!reopened.is_in_voice("1"));

    let mut log = open(&dir);
    assert_eq!(log.record_voice_leave("1", false, at(300)), None);
    assert_eq!(log.snapshot_for("1").voice_seconds, 0.0);
}

#[test]
fn test_round_trip_matches_in_memory_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut log = open(&dir);
    log.record_message("10", false);
    log.record_reaction("11", false, ReactionDelta::Added);
    log.record_voice_join("12", false, at(0));
    log.record_voice_leave("12", false, at(7));
    log.save();

    let reopened = open(&dir);
    assert_eq!(reopened.counters(), log.counters());
}

#[test]
fn test_unknown_user_reports_zeros() {
    let dir = tempfile::tempdir().unwrap();
    let log = open(&dir);
    assert_eq!(log.snapshot_for("nobody"), UserStats::default());
    assert!(log.top_by_messages(10).is_empty());
}

#[test]
fn test_corrupt_snapshot_refuses_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("activity_data.json");
    std::fs::write(&path, "{\"message_counts\": {\"1\": ").unwrap();

    let result = ActivityLog::load(SnapshotStore::new(&path), Policy::default());
    assert!(matches!(result, Err(StoreError::Corrupt { .. })));
}

#[test]
fn test_save_failure_keeps_memory_state() {
    let dir = tempfile::tempdir().unwrap();
    // A directory squatting on the temp file path makes every save fail
    let path = dir.path().join("activity_data.json");
    std::fs::create_dir(dir.path().join("activity_data.json.tmp")).unwrap();

    let mut log = ActivityLog::load(SnapshotStore::new(&path), Policy::default()).unwrap();
    assert!(log.record_message("1", false));
    assert!(log.record_message("1", false));
    assert_eq!(log.snapshot_for("1").messages, 2);
    assert!(!path.exists());

    // The next successful save carries everything the failed ones missed
    std::fs::remove_dir(dir.path().join("activity_data.json.tmp")).unwrap();
    log.save();

    let reopened = open(&dir);
    assert_eq!(reopened.snapshot_for("1").messages, 2);
}

#[tokio::test]
async fn test_shared_log_from_handlers() {
    // Handlers share one log through Data
    let dir = tempfile::tempdir().unwrap();
    let shared = activity::new_shared(open(&dir));

    let mut tasks = Vec::new();
    for i in 0..4 {
        let shared = shared.clone();
        tasks.push(tokio::spawn(async move {
            let mut log = shared.lock().await;
            log.record_message("7", i % 2 == 1);
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let log = shared.lock().await;
    assert_eq!(log.snapshot_for("7").messages, 2);
    drop(log);

    let reopened = open(&dir);
    assert_eq!(reopened.snapshot_for("7").messages, 2);
}
