use super::{PersistenceError, PersistenceResult, SchedulerSnapshot, SchedulerStore};
use crate::event::{EventId, FixedEvent, NewFixedEvent};
use crate::task::{NewTask, SlotUpdate, Task, TaskId};
use crate::validation;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
struct Tables {
    next_event_id: EventId,
    next_task_id: TaskId,
    fixed_events: Vec<FixedEvent>,
    tasks: Vec<Task>,
}

/// Process-local store. Rows are kept in insertion order.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn validate_updates(tables: &Tables, user_id: &str, updates: &[SlotUpdate]) -> PersistenceResult<()> {
    let durations: HashMap<TaskId, u8> = tables
        .tasks
        .iter()
        .filter(|task| task.user_id == user_id)
        .map(|task| (task.id, task.duration_hours))
        .collect();
    for update in updates {
        let duration = durations
            .get(&update.id)
            .copied()
            .ok_or(PersistenceError::NotFound {
                kind: "task",
                id: update.id,
            })?;
        if let Some(slot) = &update.assigned_slot {
            validation::validate_slot(slot, duration)?;
        }
    }
    Ok(())
}

impl SchedulerStore for InMemoryStore {
    fn create_fixed_event(
        &self,
        user_id: &str,
        event: NewFixedEvent,
    ) -> PersistenceResult<FixedEvent> {
        let (start_hour, end_hour) = event.validate()?;
        let mut tables = self.tables.write();
        tables.next_event_id += 1;
        let created = FixedEvent {
            id: tables.next_event_id,
            user_id: user_id.to_string(),
            name: event.name,
            day: event.day,
            start_hour,
            end_hour,
        };
        tables.fixed_events.push(created.clone());
        Ok(created)
    }

    fn delete_fixed_event(&self, user_id: &str, id: EventId) -> PersistenceResult<()> {
        let mut tables = self.tables.write();
        let position = tables
            .fixed_events
            .iter()
            .position(|event| event.id == id && event.user_id == user_id)
            .ok_or(PersistenceError::NotFound {
                kind: "fixed event",
                id,
            })?;
        tables.fixed_events.remove(position);
        Ok(())
    }

    fn create_tasks(&self, user_id: &str, tasks: Vec<NewTask>) -> PersistenceResult<Vec<Task>> {
        let durations = tasks
            .iter()
            .map(validation::validate_new_task)
            .collect::<Result<Vec<_>, _>>()?;

        let mut tables = self.tables.write();
        let mut created = Vec::with_capacity(tasks.len());
        for (task, duration) in tasks.into_iter().zip(durations) {
            tables.next_task_id += 1;
            created.push(Task {
                id: tables.next_task_id,
                user_id: user_id.to_string(),
                name: task.name,
                duration_hours: duration,
                assigned_slot: task.slot,
            });
        }
        tables.tasks.extend(created.iter().cloned());
        Ok(created)
    }

    fn delete_task(&self, user_id: &str, id: TaskId) -> PersistenceResult<()> {
        let mut tables = self.tables.write();
        let position = tables
            .tasks
            .iter()
            .position(|task| task.id == id && task.user_id == user_id)
            .ok_or(PersistenceError::NotFound { kind: "task", id })?;
        tables.tasks.remove(position);
        Ok(())
    }

    fn batch_reassign(&self, user_id: &str, updates: &[SlotUpdate]) -> PersistenceResult<()> {
        let mut tables = self.tables.write();
        validate_updates(&tables, user_id, updates)?;
        for update in updates {
            if let Some(task) = tables
                .tasks
                .iter_mut()
                .find(|task| task.id == update.id && task.user_id == user_id)
            {
                task.assigned_slot = update.assigned_slot;
            }
        }
        Ok(())
    }

    fn list(&self, user_id: &str) -> PersistenceResult<SchedulerSnapshot> {
        let tables = self.tables.read();
        Ok(SchedulerSnapshot {
            fixed_events: tables
                .fixed_events
                .iter()
                .filter(|event| event.user_id == user_id)
                .cloned()
                .collect(),
            tasks: tables
                .tasks
                .iter()
                .filter(|task| task.user_id == user_id)
                .cloned()
                .collect(),
        })
    }

    fn reset(&self, user_id: &str) -> PersistenceResult<()> {
        let mut tables = self.tables.write();
        tables.fixed_events.retain(|event| event.user_id != user_id);
        tables.tasks.retain(|task| task.user_id != user_id);
        Ok(())
    }

    fn replace_all(
        &self,
        user_id: &str,
        fixed_events: Vec<NewFixedEvent>,
        tasks: Vec<NewTask>,
    ) -> PersistenceResult<SchedulerSnapshot> {
        let hours = fixed_events
            .iter()
            .map(NewFixedEvent::validate)
            .collect::<Result<Vec<_>, _>>()?;
        let durations = tasks
            .iter()
            .map(validation::validate_new_task)
            .collect::<Result<Vec<_>, _>>()?;

        let mut tables = self.tables.write();
        tables.fixed_events.retain(|event| event.user_id != user_id);
        tables.tasks.retain(|task| task.user_id != user_id);

        let mut snapshot = SchedulerSnapshot::default();
        for (event, (start_hour, end_hour)) in fixed_events.into_iter().zip(hours) {
            tables.next_event_id += 1;
            snapshot.fixed_events.push(FixedEvent {
                id: tables.next_event_id,
                user_id: user_id.to_string(),
                name: event.name,
                day: event.day,
                start_hour,
                end_hour,
            });
        }
        for (task, duration) in tasks.into_iter().zip(durations) {
            tables.next_task_id += 1;
            snapshot.tasks.push(Task {
                id: tables.next_task_id,
                user_id: user_id.to_string(),
                name: task.name,
                duration_hours: duration,
                assigned_slot: task.slot,
            });
        }
        tables.fixed_events.extend(snapshot.fixed_events.iter().cloned());
        tables.tasks.extend(snapshot.tasks.iter().cloned());
        Ok(snapshot)
    }
}
