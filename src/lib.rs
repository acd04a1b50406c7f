pub mod config;
pub mod event;
pub mod grid;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod logging;
pub mod persistence;
pub mod placement;
pub mod planner;
pub mod task;
pub mod validation;

pub use config::AppConfig;
pub use event::{EventId, FixedEvent, NewFixedEvent};
pub use grid::{DAY_END_HOUR, DAY_START_HOUR, Day, GridError};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStore;
pub use persistence::{
    InMemoryStore, PersistenceError, SchedulerSnapshot, SchedulerStore, import_snapshot,
    load_snapshot_from_json, save_snapshot_to_csv, save_snapshot_to_json,
};
pub use placement::{RegenerateSummary, find_first_available_slot, regenerate_schedule};
pub use planner::{PlannerError, WeeklyPlanner};
pub use task::{NewTask, Slot, SlotUpdate, Task, TaskId, TaskState};
pub use validation::ValidationError;
