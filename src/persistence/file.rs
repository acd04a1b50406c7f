use super::{PersistenceResult, SchedulerSnapshot, SchedulerStore};
use crate::event::NewFixedEvent;
use crate::grid;
use crate::task::NewTask;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

pub fn save_snapshot_to_json<P: AsRef<Path>>(
    snapshot: &SchedulerSnapshot,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, snapshot)?;
    Ok(())
}

pub fn load_snapshot_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<SchedulerSnapshot> {
    let file = File::open(path)?;
    let snapshot: SchedulerSnapshot = serde_json::from_reader(file)?;
    Ok(snapshot)
}

/// Replaces everything `user_id` owns with the contents of `snapshot`.
///
/// Identities are reassigned by the store; task order and slots are kept.
/// An invalid entry aborts the import before anything is replaced.
pub fn import_snapshot(
    store: &dyn SchedulerStore,
    user_id: &str,
    snapshot: SchedulerSnapshot,
) -> PersistenceResult<SchedulerSnapshot> {
    let fixed_events = snapshot
        .fixed_events
        .into_iter()
        .map(|event| {
            NewFixedEvent::from_hours(event.name, event.day, event.start_hour, event.end_hour)
        })
        .collect();
    let tasks = snapshot
        .tasks
        .into_iter()
        .map(|task| {
            NewTask::new(task.name, u32::from(task.duration_hours)).with_slot(task.assigned_slot)
        })
        .collect();
    store.replace_all(user_id, fixed_events, tasks)
}

#[derive(Debug, Default, Serialize)]
struct EntryCsvRecord {
    kind: String,
    id: i64,
    name: String,
    day: String,
    start_time: String,
    end_time: String,
    duration_hours: u8,
}

impl SchedulerSnapshot {
    fn csv_records(&self) -> Vec<EntryCsvRecord> {
        let events = self.fixed_events.iter().map(|event| EntryCsvRecord {
            kind: "fixed".into(),
            id: event.id,
            name: event.name.clone(),
            day: event.day.to_string(),
            start_time: grid::format_hour(event.start_hour),
            end_time: grid::format_hour(event.end_hour),
            duration_hours: event.duration_hours(),
        });
        let tasks = self.tasks.iter().map(|task| {
            let mut record = EntryCsvRecord {
                kind: "task".into(),
                id: task.id,
                name: task.name.clone(),
                duration_hours: task.duration_hours,
                ..Default::default()
            };
            if let Some(slot) = task.assigned_slot {
                record.day = slot.day.to_string();
                record.start_time = slot.start_time();
                record.end_time = grid::format_hour(slot.start_hour + task.duration_hours);
            }
            record
        });
        events.chain(tasks).collect()
    }
}

/// One row per fixed event and task; unscheduled tasks leave day and times blank.
pub fn save_snapshot_to_csv<P: AsRef<Path>>(
    snapshot: &SchedulerSnapshot,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for record in snapshot.csv_records() {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
