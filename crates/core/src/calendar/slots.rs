use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::calendar::conflict::overlapping;
use crate::calendar::Calendar;
use crate::errors::ScheduleError;

impl Calendar {
    /// Earliest `t >= start` such that `[t, t + duration)` sits inside one
    /// day's working window and collides with no stored meeting.
    ///
    /// Every collision restarts the scan from the earliest meeting: a jump to
    /// the next working day can land on a meeting the previous pass had
    /// already walked past.
    pub fn find_next_free_slot(
        &self,
        start: NaiveDateTime,
        duration_minutes: u32,
    ) -> Result<NaiveDateTime, ScheduleError> {
        if duration_minutes == 0 {
            return Err(ScheduleError::InvalidDuration);
        }
        let window_minutes = self.policy.window_minutes();
        if duration_minutes > window_minutes {
            return Err(ScheduleError::SlotExceedsWorkingDay { duration_minutes, window_minutes });
        }

        let duration = Duration::minutes(i64::from(duration_minutes));
        let mut current = start;
        if !self.policy.is_working_time(current) {
            current = self.policy.next_working_time(current)?;
        }

        let sorted = self.meetings_by_start();
        let mut rescans = 0usize;
        loop {
            let blocking = overlapping(sorted.iter().copied(), current, current + duration).next();
            if let Some(meeting) = blocking {
                current = meeting.end();
                if !self.policy.is_working_time(current) {
                    current = self.policy.next_working_time(current)?;
                }
                rescans += 1;
                continue;
            }

            let end_of_day = self.policy.end_of_day(current);
            if current + duration <= end_of_day {
                debug!(
                    event_name = "calendar.slot.found",
                    requested = %start,
                    found = %current,
                    duration_minutes,
                    rescans,
                    "free slot found"
                );
                return Ok(current);
            }
            current = self.policy.next_working_time(end_of_day)?;
        }
    }
}
