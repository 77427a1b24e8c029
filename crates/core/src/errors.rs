use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid working hours {start}..{end}: expected 0 <= start < end <= 24")]
    InvalidWorkingHours { start: u32, end: u32 },
    #[error("invalid working day index {0}: expected 0 (Monday) through 6 (Sunday)")]
    InvalidWorkingDay(u8),
    #[error("meeting duration must be greater than zero minutes")]
    InvalidDuration,
    #[error("no working days are configured")]
    NoWorkingDays,
    #[error(
        "a {duration_minutes} minute slot cannot fit in a {window_minutes} minute working day"
    )]
    SlotExceedsWorkingDay { duration_minutes: u32, window_minutes: u32 },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid date `{0}`: expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid time `{0}`: expected HH:MM (24-hour)")]
    InvalidTime(String),
    #[error("invalid priority `{0}`: expected LOW, MEDIUM or HIGH")]
    InvalidPriority(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("requested slot conflicts with {count} existing meeting(s)")]
    SlotConflict { count: usize },
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("conflict: {message}")]
    Conflict { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::Conflict { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::Conflict { .. } => {
                "The requested time is already taken. Pick the suggested slot or another time."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Conflict { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let message = value.to_string();
        match value {
            ApplicationError::Schedule(_) | ApplicationError::Parse(_) => {
                Self::BadRequest { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::SlotConflict { .. } => {
                Self::Conflict { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Configuration(_) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, InterfaceError, ParseError, ScheduleError};

    #[test]
    fn schedule_error_maps_to_bad_request_interface_error() {
        let interface =
            ApplicationError::from(ScheduleError::InvalidWorkingHours { start: 20, end: 18 })
                .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ref message,
            } if correlation_id == "req-1" && message.contains("20..18")
        ));
    }

    #[test]
    fn parse_error_has_user_safe_message() {
        let interface = ApplicationError::from(ParseError::InvalidDate("2025-13-01".to_owned()))
            .into_interface("req-2");

        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn slot_conflict_maps_to_conflict() {
        let interface = ApplicationError::SlotConflict { count: 2 }.into_interface("req-3");

        assert!(matches!(interface, InterfaceError::Conflict { .. }));
        assert_eq!(interface.correlation_id(), "req-3");
        assert!(interface.to_string().contains("2 existing meeting(s)"));
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface = ApplicationError::Configuration("end_hour out of range".to_owned())
            .into_interface("req-4");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }
}
