use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::ParseError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MeetingId(pub u64);

impl fmt::Display for MeetingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            _ => Err(ParseError::InvalidPriority(value.to_string())),
        }
    }
}

/// Everything a caller supplies to book a meeting; the calendar assigns the id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeetingRequest {
    pub topic: String,
    pub organizer: String,
    pub duration_minutes: u32,
    pub start: NaiveDateTime,
    pub priority: Priority,
}

impl MeetingRequest {
    pub fn new(
        topic: impl Into<String>,
        organizer: impl Into<String>,
        duration_minutes: u32,
        start: NaiveDateTime,
    ) -> Self {
        Self {
            topic: topic.into(),
            organizer: organizer.into(),
            duration_minutes,
            start,
            priority: Priority::default(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// A booked interval `[start, start + duration)`. Fields are fixed once the
/// calendar has accepted the meeting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    id: MeetingId,
    topic: String,
    organizer: String,
    start: NaiveDateTime,
    duration_minutes: u32,
    priority: Priority,
}

impl Meeting {
    pub(crate) fn from_request(id: MeetingId, request: MeetingRequest) -> Self {
        Self {
            id,
            topic: request.topic,
            organizer: request.organizer,
            start: request.start,
            duration_minutes: request.duration_minutes,
            priority: request.priority,
        }
    }

    pub fn id(&self) -> MeetingId {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn organizer(&self) -> &str {
        &self.organizer
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start + self.duration()
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Half-open overlap: touching endpoints do not count.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start < self.end() && self.start < end
    }
}

impl fmt::Display for Meeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Meeting #{}: \"{}\"", self.id, self.topic)?;
        writeln!(f, "Organizer: {}", self.organizer)?;
        writeln!(
            f,
            "Start: {}, End: {}, Duration: {} min",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end().format("%Y-%m-%d %H:%M"),
            self.duration_minutes
        )?;
        write!(f, "Priority: {}", self.priority)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{Meeting, MeetingId, MeetingRequest, Priority};

    fn at(hour: u32, minute: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 28)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid timestamp")
    }

    fn meeting(hour: u32, minutes: u32) -> Meeting {
        Meeting::from_request(
            MeetingId(1),
            MeetingRequest::new("Sprint planning", "irina@example.com", minutes, at(hour, 0)),
        )
    }

    #[test]
    fn end_is_start_plus_duration() {
        let meeting = meeting(10, 90);
        assert_eq!(meeting.end(), at(11, 30));
        assert_eq!(meeting.priority(), Priority::Medium);
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let meeting = meeting(10, 60);
        assert!(!meeting.overlaps(at(11, 0), at(12, 0)));
        assert!(!meeting.overlaps(at(9, 0), at(10, 0)));
        assert!(meeting.overlaps(at(10, 59), at(12, 0)));
        assert!(meeting.overlaps(at(9, 0), at(10, 1)));
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("high".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(" Low ".parse::<Priority>(), Ok(Priority::Low));
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn display_renders_human_block() {
        let rendered = meeting(10, 60).to_string();
        assert!(rendered.starts_with("Meeting #1: \"Sprint planning\""));
        assert!(rendered.contains("Start: 2025-04-28 10:00, End: 2025-04-28 11:00"));
        assert!(rendered.ends_with("Priority: MEDIUM"));
    }
}
