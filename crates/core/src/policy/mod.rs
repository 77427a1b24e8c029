pub mod working_time;

pub use working_time::{WorkingTimePolicy, DAY_NAMES};
