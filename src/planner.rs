use crate::event::{EventId, FixedEvent, NewFixedEvent};
use crate::persistence::{PersistenceError, SchedulerSnapshot, SchedulerStore};
use crate::placement::{self, RegenerateSummary};
use crate::task::{NewTask, SlotUpdate, Task, TaskId};
use crate::validation::{self, ValidationError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
    #[error("persistence failure: {0}")]
    Persistence(PersistenceError),
}

impl From<PersistenceError> for PlannerError {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::NotFound { kind, id } => PlannerError::NotFound { kind, id },
            other => PlannerError::Persistence(other),
        }
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;

/// Drives the store and the placement engine for one request at a time.
///
/// Every operation reads a fresh snapshot from the store, runs the engine
/// over it, and writes the result back.
#[derive(Clone)]
pub struct WeeklyPlanner {
    store: Arc<dyn SchedulerStore>,
}

impl WeeklyPlanner {
    pub fn new(store: Arc<dyn SchedulerStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn SchedulerStore {
        self.store.as_ref()
    }

    pub fn snapshot(&self, user_id: &str) -> PlannerResult<SchedulerSnapshot> {
        Ok(self.store.list(user_id)?)
    }

    pub fn add_fixed_event(
        &self,
        user_id: &str,
        event: NewFixedEvent,
    ) -> PlannerResult<FixedEvent> {
        event.validate()?;
        let created = self.store.create_fixed_event(user_id, event)?;
        info!(user_id, event_id = created.id, day = %created.day, "fixed event added");
        Ok(created)
    }

    /// Existing placements are left as they are until the next `generate`.
    pub fn remove_fixed_event(&self, user_id: &str, id: EventId) -> PlannerResult<()> {
        self.store.delete_fixed_event(user_id, id)?;
        warn!(
            user_id,
            event_id = id,
            "fixed event removed; task placements are stale until the schedule is regenerated"
        );
        Ok(())
    }

    /// Creates a task, placing it in the earliest free slot if there is one.
    pub fn add_task(&self, user_id: &str, name: &str, duration_hours: u32) -> PlannerResult<Task> {
        validation::validate_name("task", name)?;
        let duration = validation::validate_duration(duration_hours)?;
        let snapshot = self.store.list(user_id)?;
        let slot = placement::find_first_available_slot(
            duration,
            &snapshot.fixed_events,
            &snapshot.tasks,
            None,
        );
        match slot {
            Some(slot) => debug!(user_id, %slot, "placing new task"),
            None => info!(user_id, name, "no space left for new task; storing it unscheduled"),
        }
        let task = NewTask::new(name, duration_hours).with_slot(slot);
        Ok(self.store.create_task(user_id, task)?)
    }

    /// Stores a task as given: unscheduled, or at a slot the caller already computed.
    pub fn add_prepared_task(&self, user_id: &str, task: NewTask) -> PlannerResult<Task> {
        validation::validate_new_task(&task)?;
        Ok(self.store.create_task(user_id, task)?)
    }

    /// Creates up to seven tasks, one per day that still has room.
    pub fn add_everyday_task(
        &self,
        user_id: &str,
        name: &str,
        duration_hours: u32,
    ) -> PlannerResult<Vec<Task>> {
        validation::validate_name("task", name)?;
        let duration = validation::validate_duration(duration_hours)?;
        let snapshot = self.store.list(user_id)?;
        let slots = placement::plan_everyday(duration, &snapshot.fixed_events, &snapshot.tasks);
        if slots.is_empty() {
            info!(user_id, name, "no day has room for everyday task");
            return Ok(Vec::new());
        }
        let tasks = slots
            .into_iter()
            .map(|slot| NewTask::new(name, duration_hours).with_slot(Some(slot)))
            .collect();
        let created = self.store.create_tasks(user_id, tasks)?;
        info!(user_id, count = created.len(), "everyday task added");
        Ok(created)
    }

    pub fn remove_task(&self, user_id: &str, id: TaskId) -> PlannerResult<()> {
        self.store.delete_task(user_id, id)?;
        debug!(user_id, task_id = id, "task removed");
        Ok(())
    }

    /// Recomputes every task's slot and commits all of them in one write.
    pub fn generate(&self, user_id: &str) -> PlannerResult<(Vec<Task>, RegenerateSummary)> {
        let snapshot = self.store.list(user_id)?;
        let (tasks, summary) =
            placement::regenerate_schedule(&snapshot.fixed_events, &snapshot.tasks);
        let updates: Vec<SlotUpdate> = tasks.iter().map(SlotUpdate::for_task).collect();
        if !updates.is_empty() {
            self.store.batch_reassign(user_id, &updates)?;
        }
        info!(user_id, summary = %summary.to_cli_summary(), "schedule regenerated");
        Ok((tasks, summary))
    }

    /// Applies caller-supplied slots atomically. Collisions are not re-checked here.
    pub fn reassign(&self, user_id: &str, updates: &[SlotUpdate]) -> PlannerResult<()> {
        let snapshot = self.store.list(user_id)?;
        for update in updates {
            let task = snapshot
                .tasks
                .iter()
                .find(|task| task.id == update.id)
                .ok_or(PlannerError::NotFound {
                    kind: "task",
                    id: update.id,
                })?;
            if let Some(slot) = &update.assigned_slot {
                validation::validate_slot(slot, task.duration_hours)?;
            }
        }
        self.store.batch_reassign(user_id, updates)?;
        debug!(user_id, count = updates.len(), "slots reassigned");
        Ok(())
    }

    pub fn reset(&self, user_id: &str) -> PlannerResult<()> {
        self.store.reset(user_id)?;
        info!(user_id, "scheduler data cleared");
        Ok(())
    }
}
