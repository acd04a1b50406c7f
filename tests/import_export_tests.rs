use std::fs;
use std::sync::Arc;

use study_planner::{
    Day, FixedEvent, InMemoryStore, NewFixedEvent, NewTask, PersistenceError, SchedulerSnapshot,
    SchedulerStore, Slot, Task, WeeklyPlanner, import_snapshot, load_snapshot_from_json,
    save_snapshot_to_csv, save_snapshot_to_json,
};
use tempfile::NamedTempFile;

fn populated_planner() -> WeeklyPlanner {
    let planner = WeeklyPlanner::new(Arc::new(InMemoryStore::new()));
    planner
        .add_fixed_event("u", NewFixedEvent::new("MAE101", Day::Monday, "15:00", "17:00"))
        .unwrap();
    planner.add_task("u", "Code Python", 2).unwrap();
    planner
        .add_prepared_task("u", NewTask::new("Someday", 1))
        .unwrap();
    planner
}

#[test]
fn json_snapshot_round_trip_into_fresh_store() {
    let planner = populated_planner();
    let snapshot = planner.snapshot("u").unwrap();
    let file = NamedTempFile::new().unwrap();
    save_snapshot_to_json(&snapshot, file.path()).unwrap();

    let raw = fs::read_to_string(file.path()).unwrap();
    assert!(raw.contains("\"startTime\": \"15:00\""));
    assert!(raw.contains("\"fixedEvents\""));
    assert!(raw.contains("\"assignedSlot\": null"));
    assert!(raw.contains("\"assignedSlot\": {"));

    let loaded = load_snapshot_from_json(file.path()).unwrap();
    assert_eq!(loaded, snapshot);

    let target = InMemoryStore::new();
    target.create_task("other", NewTask::new("Keep", 1)).unwrap();
    target.create_task("u", NewTask::new("Replaced", 1)).unwrap();
    let imported = import_snapshot(&target, "u", loaded).unwrap();

    assert_eq!(imported.fixed_events.len(), 1);
    let names: Vec<&str> = imported.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Code Python", "Someday"]);
    assert_eq!(imported.tasks[0].assigned_slot, Some(Slot::new(Day::Monday, 7)));
    assert_eq!(target.list("other").unwrap().tasks.len(), 1);
}

#[test]
fn csv_export_lists_events_then_tasks() {
    let planner = populated_planner();
    let snapshot = planner.snapshot("u").unwrap();
    let file = NamedTempFile::new().unwrap();
    save_snapshot_to_csv(&snapshot, file.path()).unwrap();

    let contents = fs::read_to_string(file.path()).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines[0],
        "kind,id,name,day,start_time,end_time,duration_hours"
    );
    assert_eq!(lines[1], "fixed,1,MAE101,Monday,15:00,17:00,2");
    assert_eq!(lines[2], "task,1,Code Python,Monday,07:00,09:00,2");
    assert_eq!(lines[3], "task,2,Someday,,,,1");
}

fn backwards_event_snapshot() -> SchedulerSnapshot {
    SchedulerSnapshot {
        fixed_events: vec![FixedEvent {
            id: 1,
            user_id: "u".into(),
            name: "Backwards".into(),
            day: Day::Monday,
            start_hour: 10,
            end_hour: 9,
        }],
        tasks: vec![Task::new(1, "u", "Imported", 1)],
    }
}

fn assert_failed_import_keeps_data(store: &dyn SchedulerStore) {
    store.create_task("u", NewTask::new("Precious", 2)).unwrap();

    let result = import_snapshot(store, "u", backwards_event_snapshot());
    assert!(matches!(result, Err(PersistenceError::InvalidData(_))));

    let kept = store.list("u").unwrap();
    let names: Vec<&str> = kept.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Precious"]);
    assert!(kept.fixed_events.is_empty());
}

#[test]
fn failed_import_leaves_existing_data_in_memory_store() {
    assert_failed_import_keeps_data(&InMemoryStore::new());
}

#[cfg(feature = "sqlite")]
#[test]
fn failed_import_leaves_existing_data_in_sqlite_store() {
    let store = study_planner::SqliteStore::in_memory().unwrap();
    assert_failed_import_keeps_data(&store);
}

#[test]
fn invalid_json_file_does_not_wipe_store_on_load() {
    let file = NamedTempFile::new().unwrap();
    save_snapshot_to_json(&backwards_event_snapshot(), file.path()).unwrap();
    let loaded = load_snapshot_from_json(file.path()).unwrap();

    let store = InMemoryStore::new();
    store
        .create_fixed_event("u", NewFixedEvent::new("Calculus", Day::Friday, "08:00", "10:00"))
        .unwrap();
    assert!(import_snapshot(&store, "u", loaded).is_err());
    assert_eq!(store.list("u").unwrap().fixed_events[0].name, "Calculus");
}
