//! Working-time policy: which weekdays and which hours of those days count as
//! bookable time.
//!
//! Weekdays are indexed `0 = Monday` through `6 = Sunday`. Hours form the
//! half-open window `[start_hour, end_hour)`; an `end_hour` of 24 means the
//! window runs until the following midnight.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::errors::ScheduleError;

pub const DAY_NAMES: [&str; 7] =
    ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

const MAX_WEEKDAY: u8 = 6;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingTimePolicy {
    working_days: BTreeSet<u8>,
    start_hour: u32,
    end_hour: u32,
}

impl Default for WorkingTimePolicy {
    fn default() -> Self {
        Self { working_days: (0..=4).collect(), start_hour: 9, end_hour: 18 }
    }
}

impl WorkingTimePolicy {
    pub fn new(
        working_days: impl IntoIterator<Item = u8>,
        start_hour: u32,
        end_hour: u32,
    ) -> Result<Self, ScheduleError> {
        let mut policy = Self::default();
        policy.set_working_hours(start_hour, end_hour)?;
        policy.set_working_days(working_days)?;
        Ok(policy)
    }

    pub fn working_days(&self) -> &BTreeSet<u8> {
        &self.working_days
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    /// Replaces both hours at once, or neither.
    pub fn set_working_hours(&mut self, start_hour: u32, end_hour: u32) -> Result<(), ScheduleError> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(ScheduleError::InvalidWorkingHours { start: start_hour, end: end_hour });
        }
        self.start_hour = start_hour;
        self.end_hour = end_hour;
        Ok(())
    }

    /// Replaces the working-day set verbatim. An empty set is accepted; slot
    /// searches then fail with [`ScheduleError::NoWorkingDays`].
    pub fn set_working_days(
        &mut self,
        days: impl IntoIterator<Item = u8>,
    ) -> Result<(), ScheduleError> {
        let days = days.into_iter().collect::<BTreeSet<_>>();
        if let Some(invalid) = days.iter().find(|day| **day > MAX_WEEKDAY) {
            return Err(ScheduleError::InvalidWorkingDay(*invalid));
        }
        self.working_days = days;
        Ok(())
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        let index = date.weekday().num_days_from_monday() as u8;
        self.working_days.contains(&index)
    }

    pub fn is_working_time(&self, time: NaiveDateTime) -> bool {
        self.is_working_day(time.date())
            && self.start_hour <= time.hour()
            && time.hour() < self.end_hour
    }

    pub fn window_minutes(&self) -> u32 {
        (self.end_hour - self.start_hour) * 60
    }

    /// Closing time of the working window on `time`'s calendar day.
    pub fn end_of_day(&self, time: NaiveDateTime) -> NaiveDateTime {
        day_at(time.date(), self.end_hour)
    }

    /// Smallest timestamp `>= time` that is working time.
    pub fn next_working_time(&self, time: NaiveDateTime) -> Result<NaiveDateTime, ScheduleError> {
        if self.working_days.is_empty() {
            return Err(ScheduleError::NoWorkingDays);
        }

        let mut current = time;
        if current.hour() >= self.end_hour {
            current = day_at(current.date() + Duration::days(1), 0);
        }
        if current.hour() < self.start_hour {
            current = day_at(current.date(), self.start_hour);
        }
        while !self.is_working_day(current.date()) {
            current = day_at(current.date() + Duration::days(1), self.start_hour);
        }

        Ok(current)
    }
}

/// Midnight of `date` plus `hour` hours; `hour == 24` is the next midnight.
pub fn day_at(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(hour))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::{day_at, WorkingTimePolicy};
    use crate::errors::ScheduleError;

    // 2025-04-28 is a Monday.
    fn at(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").expect("valid timestamp")
    }

    #[test]
    fn default_is_weekdays_nine_to_six() {
        let policy = WorkingTimePolicy::default();
        assert!(policy.is_working_time(at("2025-04-28 09:00")));
        assert!(policy.is_working_time(at("2025-04-28 17:59")));
        assert!(!policy.is_working_time(at("2025-04-28 18:00")));
        assert!(!policy.is_working_time(at("2025-04-28 08:59")));
        // Saturday
        assert!(!policy.is_working_time(at("2025-04-26 10:00")));
    }

    #[test]
    fn invalid_hours_leave_policy_untouched() {
        let mut policy = WorkingTimePolicy::default();
        assert_eq!(
            policy.set_working_hours(20, 18),
            Err(ScheduleError::InvalidWorkingHours { start: 20, end: 18 })
        );
        assert_eq!(
            policy.set_working_hours(9, 25),
            Err(ScheduleError::InvalidWorkingHours { start: 9, end: 25 })
        );
        assert_eq!(policy.start_hour(), 9);
        assert_eq!(policy.end_hour(), 18);

        policy.set_working_hours(0, 24).expect("full day is valid");
        assert_eq!(policy.window_minutes(), 24 * 60);
    }

    #[test]
    fn out_of_range_day_is_rejected() {
        let mut policy = WorkingTimePolicy::default();
        assert_eq!(policy.set_working_days([0, 7]), Err(ScheduleError::InvalidWorkingDay(7)));
        assert_eq!(policy.working_days().len(), 5);
    }

    #[test]
    fn next_working_time_rolls_past_end_of_day() {
        let policy = WorkingTimePolicy::default();
        assert_eq!(policy.next_working_time(at("2025-04-28 18:30")), Ok(at("2025-04-29 09:00")));
        assert_eq!(policy.next_working_time(at("2025-04-28 07:15")), Ok(at("2025-04-28 09:00")));
        assert_eq!(policy.next_working_time(at("2025-04-28 11:15")), Ok(at("2025-04-28 11:15")));
    }

    #[test]
    fn next_working_time_skips_weekend() {
        let policy = WorkingTimePolicy::default();
        // Friday evening -> Monday morning
        assert_eq!(policy.next_working_time(at("2025-04-25 19:00")), Ok(at("2025-04-28 09:00")));
        // Saturday midday -> Monday morning
        assert_eq!(policy.next_working_time(at("2025-04-26 10:00")), Ok(at("2025-04-28 09:00")));
    }

    #[test]
    fn next_working_time_reclamps_on_every_skipped_day() {
        let mut policy = WorkingTimePolicy::default();
        policy.set_working_days([3]).expect("thursday only");
        // Monday 14:00 -> Thursday 09:00, not Thursday 14:00
        assert_eq!(policy.next_working_time(at("2025-04-28 14:00")), Ok(at("2025-05-01 09:00")));
    }

    #[test]
    fn next_working_time_without_working_days_fails() {
        let mut policy = WorkingTimePolicy::default();
        policy.set_working_days(Vec::new()).expect("empty set is accepted");
        assert_eq!(policy.next_working_time(at("2025-04-28 10:00")), Err(ScheduleError::NoWorkingDays));
    }

    #[test]
    fn end_hour_twenty_four_is_next_midnight() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 28).expect("valid date");
        assert_eq!(day_at(date, 24), at("2025-04-29 00:00"));

        let policy = WorkingTimePolicy::new(0..=6, 20, 24).expect("valid policy");
        assert!(policy.is_working_time(at("2025-04-28 23:59")));
        assert_eq!(policy.end_of_day(at("2025-04-28 22:00")), at("2025-04-29 00:00"));
    }
}
