use chrono::{Duration, NaiveDateTime};

use crate::calendar::Calendar;
use crate::domain::meeting::Meeting;

/// Meetings whose `[start, end)` intersects `[start, end)`. Touching
/// endpoints are not conflicts.
pub fn overlapping<'a, I>(
    meetings: I,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> impl Iterator<Item = &'a Meeting>
where
    I: IntoIterator<Item = &'a Meeting>,
{
    meetings.into_iter().filter(move |meeting| meeting.overlaps(start, end))
}

impl Calendar {
    /// Every stored meeting that would collide with a slot of
    /// `duration_minutes` starting at `start`. Read-only.
    pub fn conflicts_with(&self, start: NaiveDateTime, duration_minutes: u32) -> Vec<&Meeting> {
        let end = start + Duration::minutes(i64::from(duration_minutes));
        overlapping(&self.meetings, start, end).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use crate::calendar::Calendar;
    use crate::domain::meeting::MeetingRequest;

    fn at(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").expect("valid timestamp")
    }

    fn calendar() -> Calendar {
        let mut calendar = Calendar::default();
        for (topic, start, minutes) in [
            ("Sprint planning", "2025-04-28 10:00", 60),
            ("Architecture sync", "2025-04-28 13:00", 45),
        ] {
            calendar
                .add_meeting(MeetingRequest::new(topic, "team@example.com", minutes, at(start)))
                .expect("valid request");
        }
        calendar
    }

    #[test]
    fn reports_every_overlapping_meeting() {
        let calendar = calendar();
        let conflicts = calendar.conflicts_with(at("2025-04-28 10:30"), 180);
        let topics = conflicts.iter().map(|meeting| meeting.topic()).collect::<Vec<_>>();
        assert_eq!(topics, vec!["Sprint planning", "Architecture sync"]);
    }

    #[test]
    fn adjacent_slots_are_not_conflicts() {
        let calendar = calendar();
        assert!(calendar.conflicts_with(at("2025-04-28 11:00"), 120).is_empty());
        assert!(calendar.conflicts_with(at("2025-04-28 09:00"), 60).is_empty());
        assert_eq!(calendar.conflicts_with(at("2025-04-28 09:00"), 61).len(), 1);
    }

    #[test]
    fn query_does_not_mutate() {
        let calendar = calendar();
        let before = calendar.meetings().to_vec();
        let _ = calendar.conflicts_with(at("2025-04-28 10:00"), 60);
        assert_eq!(calendar.meetings(), before.as_slice());
    }
}
