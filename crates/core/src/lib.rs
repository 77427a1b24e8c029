pub mod calendar;
pub mod config;
pub mod domain;
pub mod errors;
pub mod fixtures;
pub mod input;
pub mod policy;

pub use calendar::{AddOutcome, Availability, Calendar};
pub use domain::meeting::{Meeting, MeetingId, MeetingRequest, Priority};
pub use errors::{ApplicationError, InterfaceError, ParseError, ScheduleError};
pub use policy::{WorkingTimePolicy, DAY_NAMES};
