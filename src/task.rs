use crate::grid::{self, Day, hour_string};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TaskId = i64;

/// Where a task begins: a day of the week and a start hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub day: Day,
    #[serde(rename = "startTime", with = "hour_string")]
    pub start_hour: u8,
}

impl Slot {
    pub fn new(day: Day, start_hour: u8) -> Self {
        Self { day, start_hour }
    }

    pub fn start_time(&self) -> String {
        grid::format_hour(self.start_hour)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.start_time())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Unscheduled,
    Scheduled,
}

/// A flexible work item. `assigned_slot` is `None` while unscheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub user_id: String,
    pub name: String,
    pub duration_hours: u8,
    #[serde(default)]
    pub assigned_slot: Option<Slot>,
}

impl Task {
    pub fn new(
        id: TaskId,
        user_id: impl Into<String>,
        name: impl Into<String>,
        duration_hours: u8,
    ) -> Self {
        Self {
            id,
            user_id: user_id.into(),
            name: name.into(),
            duration_hours,
            assigned_slot: None,
        }
    }

    pub fn with_slot(mut self, slot: Slot) -> Self {
        self.assigned_slot = Some(slot);
        self
    }

    pub fn state(&self) -> TaskState {
        if self.assigned_slot.is_some() {
            TaskState::Scheduled
        } else {
            TaskState::Unscheduled
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.assigned_slot.is_some()
    }

    pub fn assign(&mut self, slot: Slot) {
        self.assigned_slot = Some(slot);
    }

    pub fn clear_slot(&mut self) {
        self.assigned_slot = None;
    }

    /// Whether this task's assigned interval collides with `[start, start + duration)` on `day`.
    pub fn overlaps(&self, day: Day, start: u8, duration: u8) -> bool {
        match self.assigned_slot {
            Some(slot) if slot.day == day => {
                grid::intervals_overlap(slot.start_hour, self.duration_hours, start, duration)
            }
            _ => false,
        }
    }

    pub fn scheduled_day(&self) -> Option<Day> {
        self.assigned_slot.map(|slot| slot.day)
    }

    pub fn scheduled_start_time(&self) -> Option<String> {
        self.assigned_slot.map(|slot| slot.start_time())
    }
}

/// Creation payload. A `slot` is only present when the caller pre-computed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub name: String,
    pub duration_hours: u32,
    #[serde(default)]
    pub slot: Option<Slot>,
}

impl NewTask {
    pub fn new(name: impl Into<String>, duration_hours: u32) -> Self {
        Self {
            name: name.into(),
            duration_hours,
            slot: None,
        }
    }

    pub fn with_slot(mut self, slot: Option<Slot>) -> Self {
        self.slot = slot;
        self
    }
}

/// One entry of a batch reassignment. `assigned_slot: None` clears the task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotUpdate {
    pub id: TaskId,
    #[serde(default)]
    pub assigned_slot: Option<Slot>,
}

impl SlotUpdate {
    pub fn for_task(task: &Task) -> Self {
        Self {
            id: task.id,
            assigned_slot: task.assigned_slot,
        }
    }
}
