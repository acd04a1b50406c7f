use crate::grid::{self, DAY_END_HOUR, DAY_START_HOUR, GridError, HOURS_PER_DAY};
use crate::task::{NewTask, Slot};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("{kind} name must not be empty")]
    EmptyName { kind: &'static str },
    #[error("start {start:02}:00 must be before end {end:02}:00")]
    StartNotBeforeEnd { start: u8, end: u8 },
    #[error("interval {start:02}:00-{end:02}:00 lies outside the operating window 07:00-23:00")]
    OutsideWindow { start: u8, end: u8 },
    #[error("duration {0}h is invalid: must be between 1 and 16 hours")]
    InvalidDuration(u32),
}

pub fn validate_name(kind: &'static str, name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName { kind });
    }
    Ok(())
}

pub fn validate_event_hours(start: u8, end: u8) -> Result<(), ValidationError> {
    if start >= end {
        return Err(ValidationError::StartNotBeforeEnd { start, end });
    }
    if start < DAY_START_HOUR || end > DAY_END_HOUR {
        return Err(ValidationError::OutsideWindow { start, end });
    }
    Ok(())
}

/// Rejects durations the engine cannot place anywhere: zero, or longer than the window.
pub fn validate_duration(duration: u32) -> Result<u8, ValidationError> {
    if duration == 0 || duration > u32::from(HOURS_PER_DAY) {
        return Err(ValidationError::InvalidDuration(duration));
    }
    Ok(duration as u8)
}

pub fn validate_slot(slot: &Slot, duration: u8) -> Result<(), ValidationError> {
    if !grid::fits_in_window(slot.start_hour, duration) {
        return Err(ValidationError::OutsideWindow {
            start: slot.start_hour,
            end: slot.start_hour.saturating_add(duration),
        });
    }
    Ok(())
}

pub fn validate_new_task(task: &NewTask) -> Result<u8, ValidationError> {
    validate_name("task", &task.name)?;
    let duration = validate_duration(task.duration_hours)?;
    if let Some(slot) = &task.slot {
        validate_slot(slot, duration)?;
    }
    Ok(duration)
}
