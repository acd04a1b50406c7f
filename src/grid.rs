use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// First bookable hour of the day (07:00).
pub const DAY_START_HOUR: u8 = 7;
/// Hour by which every interval must have ended (23:00). Never a start hour.
pub const DAY_END_HOUR: u8 = 23;
/// Number of discrete start hours in the operating window.
pub const HOURS_PER_DAY: u8 = DAY_END_HOUR - DAY_START_HOUR;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("invalid time '{0}': expected a whole hour formatted as HH:00")]
    InvalidTime(String),
    #[error("unknown day '{0}'")]
    UnknownDay(String),
}

/// A day of the recurring weekly template. Ordinal order is Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    pub fn ordinal(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Day::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| GridError::UnknownDay(s.to_string()))
    }
}

impl From<Day> for Weekday {
    fn from(day: Day) -> Self {
        match day {
            Day::Monday => Weekday::Mon,
            Day::Tuesday => Weekday::Tue,
            Day::Wednesday => Weekday::Wed,
            Day::Thursday => Weekday::Thu,
            Day::Friday => Weekday::Fri,
            Day::Saturday => Weekday::Sat,
            Day::Sunday => Weekday::Sun,
        }
    }
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        Day::ALL[weekday.num_days_from_monday() as usize]
    }
}

/// The seven days in tie-breaking order.
pub fn days_in_order() -> [Day; 7] {
    Day::ALL
}

/// Valid start hours, ascending: 7, 8, ..., 22.
pub fn hours_in_order() -> impl Iterator<Item = u8> {
    DAY_START_HOUR..DAY_END_HOUR
}

/// Half-open overlap test. Intervals that only touch do not overlap.
pub fn intervals_overlap(start_a: u8, duration_a: u8, start_b: u8, duration_b: u8) -> bool {
    let (start_a, start_b) = (u16::from(start_a), u16::from(start_b));
    start_a < start_b + u16::from(duration_b) && start_b < start_a + u16::from(duration_a)
}

/// True when an interval starting at `start` fits inside the operating window.
pub fn fits_in_window(start: u8, duration: u8) -> bool {
    start >= DAY_START_HOUR && u16::from(start) + u16::from(duration) <= u16::from(DAY_END_HOUR)
}

/// Parses a zero-padded whole-hour string such as `"08:00"`.
pub fn parse_hour(value: &str) -> Result<u8, GridError> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 5
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[2] == b':'
        && &bytes[3..] == b"00";
    if !well_formed {
        return Err(GridError::InvalidTime(value.to_string()));
    }
    let hour = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    if hour > 23 {
        return Err(GridError::InvalidTime(value.to_string()));
    }
    Ok(hour)
}

pub fn format_hour(hour: u8) -> String {
    format!("{hour:02}:00")
}

/// Serde adapter storing an hour as its `"HH:00"` string.
pub mod hour_string {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(hour: &u8, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_hour(*hour))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_hour(&raw).map_err(D::Error::custom)
    }
}
