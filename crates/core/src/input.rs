//! Parsing of the fixed-format date and time strings accepted at the tool
//! boundary: `YYYY-MM-DD` and 24-hour `HH:MM`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::meeting::Priority;
use crate::errors::ParseError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
pub const SLOT_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn parse_date(value: &str) -> Result<NaiveDate, ParseError> {
    let trimmed = value.trim();
    if trimmed.len() != 10 {
        return Err(ParseError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ParseError::InvalidDate(value.to_string()))
}

pub fn parse_time(value: &str) -> Result<NaiveTime, ParseError> {
    let trimmed = value.trim();
    if trimmed.len() != 5 {
        return Err(ParseError::InvalidTime(value.to_string()));
    }
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .map_err(|_| ParseError::InvalidTime(value.to_string()))
}

/// A missing time means the start of the day.
pub fn parse_timestamp(date: &str, time: Option<&str>) -> Result<NaiveDateTime, ParseError> {
    let date = parse_date(date)?;
    let time = match time.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_time(value)?,
        None => NaiveTime::MIN,
    };
    Ok(date.and_time(time))
}

/// A missing or blank priority defaults to `MEDIUM`.
pub fn parse_priority(value: Option<&str>) -> Result<Priority, ParseError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value.parse(),
        None => Ok(Priority::default()),
    }
}
