//! Deterministic demo week used by the CLI `seed` command and by tests.
//!
//! Callers own the returned calendar; nothing here is process-global.

use chrono::NaiveDateTime;

use crate::calendar::{AddOutcome, Calendar};
use crate::domain::meeting::{MeetingRequest, Priority};
use crate::errors::{ApplicationError, ParseError};
use crate::input::SLOT_FORMAT;
use crate::policy::WorkingTimePolicy;

pub const DEMO_MEETINGS: &[(&str, &str, u32, &str, Priority)] = &[
    ("Sprint planning", "irina@example.com", 60, "2025-04-28 10:00", Priority::High),
    ("Architecture sync", "roman@example.com", 45, "2025-04-28 13:00", Priority::Medium),
    ("QA kickoff", "daria@example.com", 30, "2025-04-29 09:30", Priority::Medium),
    ("Data migration review", "svetlana@example.com", 60, "2025-04-29 11:00", Priority::High),
    ("UX workshop", "marina@example.com", 90, "2025-04-30 15:00", Priority::Medium),
    ("API performance working group", "sergey@example.com", 60, "2025-05-01 10:00", Priority::High),
    ("Security audit prep", "ekaterina@example.com", 60, "2025-05-02 14:00", Priority::High),
    ("Stakeholder demo", "anastasia@example.com", 90, "2025-05-05 11:00", Priority::High),
    ("CI/CD improvements", "alexey@example.com", 45, "2025-05-06 16:00", Priority::Medium),
    ("Risk register update", "olga@example.com", 30, "2025-05-08 17:00", Priority::Medium),
];

pub fn demo_calendar(policy: WorkingTimePolicy) -> Result<Calendar, ApplicationError> {
    let mut calendar = Calendar::new(policy);
    for (topic, organizer, duration_minutes, start, priority) in DEMO_MEETINGS {
        let start = NaiveDateTime::parse_from_str(start, SLOT_FORMAT)
            .map_err(|_| ParseError::InvalidDate((*start).to_string()))?;
        let request = MeetingRequest::new(*topic, *organizer, *duration_minutes, start)
            .with_priority(*priority);
        if let AddOutcome::Conflict { conflicts, .. } = calendar.add_meeting(request)? {
            return Err(ApplicationError::SlotConflict { count: conflicts.len() });
        }
    }
    Ok(calendar)
}

#[cfg(test)]
mod tests {
    use super::{demo_calendar, DEMO_MEETINGS};
    use crate::domain::meeting::MeetingId;
    use crate::policy::WorkingTimePolicy;

    #[test]
    fn demo_week_loads_without_conflicts() {
        let calendar = demo_calendar(WorkingTimePolicy::default()).expect("demo loads");
        assert_eq!(calendar.len(), DEMO_MEETINGS.len());
        assert_eq!(
            calendar.get(MeetingId(1)).map(|meeting| meeting.topic()),
            Some("Sprint planning")
        );
    }

    #[test]
    fn demo_week_is_deterministic() {
        let first = demo_calendar(WorkingTimePolicy::default()).expect("demo loads");
        let second = demo_calendar(WorkingTimePolicy::default()).expect("demo loads");
        assert_eq!(first.state_string(), second.state_string());
    }
}
