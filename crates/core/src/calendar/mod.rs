//! In-memory meeting calendar.
//!
//! A [`Calendar`] owns its meetings and one [`WorkingTimePolicy`]. It keeps a
//! single invariant: no two stored meetings overlap as half-open intervals.
//! The type does no internal locking; callers that share a calendar must
//! serialize access around whole operations.

pub mod conflict;
pub mod slots;

use chrono::{Duration, NaiveDateTime};
use tracing::info;

use crate::domain::meeting::{Meeting, MeetingId, MeetingRequest};
use crate::errors::ScheduleError;
use crate::policy::WorkingTimePolicy;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    Added(MeetingId),
    /// Nothing was stored. `suggestion` is the next free slot for the same
    /// duration, or `None` when no slot can be found at all.
    Conflict { conflicts: Vec<Meeting>, suggestion: Option<NaiveDateTime> },
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added(_))
    }

    pub fn meeting_id(&self) -> Option<MeetingId> {
        match self {
            Self::Added(id) => Some(*id),
            Self::Conflict { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Availability {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub within_working_time: bool,
    pub conflicts: Vec<Meeting>,
}

impl Availability {
    pub fn is_free_from_meetings(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn is_available(&self) -> bool {
        self.within_working_time && self.is_free_from_meetings()
    }

    pub fn reasons(&self) -> Vec<String> {
        let mut reasons = Vec::new();
        if !self.within_working_time {
            reasons.push("outside working time".to_string());
        }
        if !self.conflicts.is_empty() {
            let topics =
                self.conflicts.iter().map(|meeting| meeting.topic()).collect::<Vec<_>>().join(", ");
            reasons.push(format!("conflicts with: {topics}"));
        }
        reasons
    }
}

#[derive(Clone, Debug)]
pub struct Calendar {
    meetings: Vec<Meeting>,
    next_id: u64,
    policy: WorkingTimePolicy,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(WorkingTimePolicy::default())
    }
}

impl Calendar {
    pub fn new(policy: WorkingTimePolicy) -> Self {
        Self { meetings: Vec::new(), next_id: 1, policy }
    }

    pub fn policy(&self) -> &WorkingTimePolicy {
        &self.policy
    }

    pub fn meetings(&self) -> &[Meeting] {
        &self.meetings
    }

    pub fn len(&self) -> usize {
        self.meetings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meetings.is_empty()
    }

    pub fn get(&self, id: MeetingId) -> Option<&Meeting> {
        self.meetings.iter().find(|meeting| meeting.id() == id)
    }

    /// Stored meetings ordered by start. Start order is total because stored
    /// meetings never overlap.
    pub fn meetings_by_start(&self) -> Vec<&Meeting> {
        let mut sorted = self.meetings.iter().collect::<Vec<_>>();
        sorted.sort_by_key(|meeting| meeting.start());
        sorted
    }

    pub fn set_working_days(
        &mut self,
        days: impl IntoIterator<Item = u8>,
    ) -> Result<(), ScheduleError> {
        self.policy.set_working_days(days)?;
        info!(
            event_name = "calendar.policy.updated",
            working_days = ?self.policy.working_days(),
            "working days updated"
        );
        Ok(())
    }

    pub fn set_working_hours(&mut self, start_hour: u32, end_hour: u32) -> Result<(), ScheduleError> {
        self.policy.set_working_hours(start_hour, end_hour)?;
        info!(
            event_name = "calendar.policy.updated",
            start_hour, end_hour, "working hours updated"
        );
        Ok(())
    }

    /// Stores the meeting if its slot is free. A conflict is an outcome, not
    /// an error: the calendar is left untouched and the caller gets the
    /// colliding meetings plus the next free slot.
    ///
    /// Meetings are not required to fall inside working time.
    pub fn add_meeting(&mut self, request: MeetingRequest) -> Result<AddOutcome, ScheduleError> {
        if request.duration_minutes == 0 {
            return Err(ScheduleError::InvalidDuration);
        }

        let conflicts = self
            .conflicts_with(request.start, request.duration_minutes)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();

        if !conflicts.is_empty() {
            let suggestion =
                self.find_next_free_slot(request.start, request.duration_minutes).ok();
            info!(
                event_name = "calendar.meeting.conflict",
                topic = %request.topic,
                start = %request.start,
                conflicts = conflicts.len(),
                suggestion = ?suggestion,
                "meeting rejected due to conflict"
            );
            return Ok(AddOutcome::Conflict { conflicts, suggestion });
        }

        let id = MeetingId(self.next_id);
        self.next_id += 1;
        info!(
            event_name = "calendar.meeting.added",
            meeting_id = id.0,
            topic = %request.topic,
            start = %request.start,
            duration_minutes = request.duration_minutes,
            "meeting added"
        );
        self.meetings.push(Meeting::from_request(id, request));
        Ok(AddOutcome::Added(id))
    }

    /// Returns `false` when no meeting has this id. Ids are never reused.
    pub fn remove_meeting(&mut self, id: MeetingId) -> bool {
        match self.meetings.iter().position(|meeting| meeting.id() == id) {
            Some(index) => {
                self.meetings.remove(index);
                info!(event_name = "calendar.meeting.removed", meeting_id = id.0, "meeting removed");
                true
            }
            None => {
                info!(
                    event_name = "calendar.meeting.not_found",
                    meeting_id = id.0,
                    "meeting to remove was not found"
                );
                false
            }
        }
    }

    /// The slot must start in working time, end no later than the same day's
    /// closing hour, and collide with nothing.
    pub fn check_availability(
        &self,
        start: NaiveDateTime,
        duration_minutes: u32,
    ) -> Result<Availability, ScheduleError> {
        if duration_minutes == 0 {
            return Err(ScheduleError::InvalidDuration);
        }
        let end = start + Duration::minutes(i64::from(duration_minutes));
        let within_working_time =
            self.policy.is_working_time(start) && end <= self.policy.end_of_day(start);
        let conflicts =
            self.conflicts_with(start, duration_minutes).into_iter().cloned().collect();
        Ok(Availability { start, end, within_working_time, conflicts })
    }

    /// A zero-length slot is never available.
    pub fn is_time_available(&self, start: NaiveDateTime, duration_minutes: u32) -> bool {
        self.check_availability(start, duration_minutes)
            .is_ok_and(|availability| availability.is_available())
    }

    pub fn state_string(&self) -> String {
        if self.meetings.is_empty() {
            return "Calendar is empty.".to_string();
        }
        self.meetings_by_start()
            .into_iter()
            .map(|meeting| meeting.to_string())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
