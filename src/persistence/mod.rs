use crate::event::{EventId, FixedEvent, NewFixedEvent};
use crate::task::{NewTask, SlotUpdate, Task, TaskId};
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("database error: {0}")]
    Database(Box<dyn std::error::Error + Send + Sync>),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
}

impl From<ValidationError> for PersistenceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Database(Box::new(value))
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Everything one user owns, tasks in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerSnapshot {
    pub fixed_events: Vec<FixedEvent>,
    pub tasks: Vec<Task>,
}

/// Durable storage of fixed events and tasks, keyed by owning user.
///
/// Reads hand out owned snapshots. Multi-row writes (`create_tasks`,
/// `batch_reassign`, `replace_all`, `reset`) are all-or-nothing.
pub trait SchedulerStore: Send + Sync {
    fn create_fixed_event(&self, user_id: &str, event: NewFixedEvent)
    -> PersistenceResult<FixedEvent>;

    /// Returns `NotFound` when the event does not exist or belongs to someone else.
    fn delete_fixed_event(&self, user_id: &str, id: EventId) -> PersistenceResult<()>;

    fn create_tasks(&self, user_id: &str, tasks: Vec<NewTask>) -> PersistenceResult<Vec<Task>>;

    fn create_task(&self, user_id: &str, task: NewTask) -> PersistenceResult<Task> {
        self.create_tasks(user_id, vec![task])?
            .pop()
            .ok_or_else(|| PersistenceError::InvalidData("task was not created".into()))
    }

    fn delete_task(&self, user_id: &str, id: TaskId) -> PersistenceResult<()>;

    /// Applies every update or none of them.
    fn batch_reassign(&self, user_id: &str, updates: &[SlotUpdate]) -> PersistenceResult<()>;

    fn list(&self, user_id: &str) -> PersistenceResult<SchedulerSnapshot>;

    fn reset(&self, user_id: &str) -> PersistenceResult<()>;

    /// Swaps everything `user_id` owns for the given entries in one write.
    /// Every entry is validated first; on error the existing data is untouched.
    fn replace_all(
        &self,
        user_id: &str,
        fixed_events: Vec<NewFixedEvent>,
        tasks: Vec<NewTask>,
    ) -> PersistenceResult<SchedulerSnapshot>;
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{import_snapshot, load_snapshot_from_json, save_snapshot_to_csv, save_snapshot_to_json};
pub use memory::InMemoryStore;
