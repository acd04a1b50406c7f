//! Greedy, earliest-slot-wins placement of tasks into the weekly grid.
//!
//! Every function here is a pure read of the snapshots passed in. Days are
//! scanned Monday first and hours ascending, so the first free `(day, hour)`
//! pair always wins. Nothing tries to balance load or reduce fragmentation.

use crate::event::FixedEvent;
use crate::grid::{self, Day, DAY_END_HOUR};
use crate::task::{Slot, Task, TaskId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateSummary {
    pub task_count: usize,
    pub scheduled_count: usize,
    pub unscheduled: Vec<TaskId>,
}

impl RegenerateSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = vec![
            format!("tasks={}", self.task_count),
            format!("scheduled={}", self.scheduled_count),
        ];
        if !self.unscheduled.is_empty() {
            let ids = self
                .unscheduled
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            parts.push(format!("no_space={ids}"));
        }
        parts.join(", ")
    }
}

/// True if `[start, start + duration)` on `day` hits a fixed event or another placed task.
pub fn collides(
    day: Day,
    start: u8,
    duration: u8,
    fixed_events: &[FixedEvent],
    tasks: &[Task],
    exclude: Option<TaskId>,
) -> bool {
    if fixed_events
        .iter()
        .any(|event| event.overlaps(day, start, duration))
    {
        return true;
    }
    tasks
        .iter()
        .filter(|task| Some(task.id) != exclude)
        .any(|task| task.overlaps(day, start, duration))
}

/// Earliest free start hour on a single day.
pub fn find_slot_on_day(
    day: Day,
    duration: u8,
    fixed_events: &[FixedEvent],
    tasks: &[Task],
    exclude: Option<TaskId>,
) -> Option<Slot> {
    grid::hours_in_order()
        .take_while(|hour| u16::from(*hour) + u16::from(duration) <= u16::from(DAY_END_HOUR))
        .find(|hour| !collides(day, *hour, duration, fixed_events, tasks, exclude))
        .map(|hour| Slot::new(day, hour))
}

/// Earliest free slot in the week, or `None` when every day is full.
///
/// `None` is a normal outcome: the task simply stays unscheduled.
pub fn find_first_available_slot(
    duration: u8,
    fixed_events: &[FixedEvent],
    tasks: &[Task],
    exclude: Option<TaskId>,
) -> Option<Slot> {
    grid::days_in_order()
        .into_iter()
        .find_map(|day| find_slot_on_day(day, duration, fixed_events, tasks, exclude))
}

/// Discards every assignment and re-places tasks one by one in the order given.
///
/// Tasks placed earlier in the pass become obstacles for later ones, so the
/// outcome depends on input order. Callers replay tasks in creation order.
pub fn regenerate_schedule(
    fixed_events: &[FixedEvent],
    tasks: &[Task],
) -> (Vec<Task>, RegenerateSummary) {
    let mut working: Vec<Task> = tasks.to_vec();
    working.iter_mut().for_each(Task::clear_slot);

    let mut unscheduled = Vec::new();
    for idx in 0..working.len() {
        let (task_id, duration) = (working[idx].id, working[idx].duration_hours);
        match find_first_available_slot(duration, fixed_events, &working, Some(task_id)) {
            Some(slot) => working[idx].assign(slot),
            None => unscheduled.push(task_id),
        }
    }

    let summary = RegenerateSummary {
        task_count: working.len(),
        scheduled_count: working.len() - unscheduled.len(),
        unscheduled,
    };
    (working, summary)
}

/// One slot per day for a task that recurs daily; days without room are skipped.
///
/// Each day is scanned on its own, so the chosen hour can differ between days.
pub fn plan_everyday(duration: u8, fixed_events: &[FixedEvent], tasks: &[Task]) -> Vec<Slot> {
    grid::days_in_order()
        .into_iter()
        .filter_map(|day| find_slot_on_day(day, duration, fixed_events, tasks, None))
        .collect()
}
