use crate::grid::{self, Day, hour_string};
use crate::validation::{self, ValidationError};
use serde::{Deserialize, Serialize};

pub type EventId = i64;

/// An immovable weekly commitment. Never relocated by the placement engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedEvent {
    pub id: EventId,
    pub user_id: String,
    pub name: String,
    pub day: Day,
    #[serde(rename = "startTime", with = "hour_string")]
    pub start_hour: u8,
    #[serde(rename = "endTime", with = "hour_string")]
    pub end_hour: u8,
}

impl FixedEvent {
    pub fn duration_hours(&self) -> u8 {
        self.end_hour.saturating_sub(self.start_hour)
    }

    pub fn overlaps(&self, day: Day, start: u8, duration: u8) -> bool {
        self.day == day
            && grid::intervals_overlap(self.start_hour, self.duration_hours(), start, duration)
    }
}

/// Creation payload: `{ name, day, startTime: "HH:00", endTime: "HH:00" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFixedEvent {
    pub name: String,
    pub day: Day,
    pub start_time: String,
    pub end_time: String,
}

impl NewFixedEvent {
    pub fn new(
        name: impl Into<String>,
        day: Day,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            day,
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }

    pub fn from_hours(name: impl Into<String>, day: Day, start_hour: u8, end_hour: u8) -> Self {
        Self::new(
            name,
            day,
            grid::format_hour(start_hour),
            grid::format_hour(end_hour),
        )
    }

    /// Parses the times and checks `7 <= start < end <= 23`.
    pub fn parsed_hours(&self) -> Result<(u8, u8), ValidationError> {
        let start = grid::parse_hour(&self.start_time)?;
        let end = grid::parse_hour(&self.end_time)?;
        validation::validate_event_hours(start, end)?;
        Ok((start, end))
    }

    pub fn validate(&self) -> Result<(u8, u8), ValidationError> {
        validation::validate_name("fixed event", &self.name)?;
        self.parsed_hours()
    }
}
