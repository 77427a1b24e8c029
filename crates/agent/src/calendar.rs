use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use slotwise_core::input::{parse_priority, parse_timestamp, DATE_FORMAT, SLOT_FORMAT};
use slotwise_core::{AddOutcome, Calendar, Meeting, MeetingId, MeetingRequest, DAY_NAMES};

use crate::tools::{Tool, ToolError, ToolRegistry};

pub type SharedCalendar = Arc<Mutex<Calendar>>;

pub fn shared(calendar: Calendar) -> SharedCalendar {
    Arc::new(Mutex::new(calendar))
}

/// A registry holding every calendar tool bound to `calendar`.
pub fn calendar_registry(calendar: SharedCalendar) -> ToolRegistry {
    let mut registry = ToolRegistry::default();
    register_calendar_tools(&mut registry, calendar);
    registry
}

pub fn register_calendar_tools(registry: &mut ToolRegistry, calendar: SharedCalendar) {
    registry.register(AddMeetingTool { calendar: calendar.clone() });
    registry.register(RemoveMeetingTool { calendar: calendar.clone() });
    registry.register(ListMeetingsTool { calendar: calendar.clone() });
    registry.register(FindFreeSlotTool { calendar: calendar.clone() });
    registry.register(IsTimeAvailableTool { calendar: calendar.clone() });
    registry.register(SetWorkingDaysTool { calendar: calendar.clone() });
    registry.register(SetWorkingHoursTool { calendar });
    registry.register(GetCurrentDateTool);
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MeetingSummary {
    pub id: u64,
    pub topic: String,
    pub organizer: String,
    pub duration: u32,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub priority: String,
}

impl From<&Meeting> for MeetingSummary {
    fn from(meeting: &Meeting) -> Self {
        Self {
            id: meeting.id().0,
            topic: meeting.topic().to_string(),
            organizer: meeting.organizer().to_string(),
            duration: meeting.duration_minutes(),
            start_time: meeting.start(),
            end_time: meeting.end(),
            priority: meeting.priority().to_string(),
        }
    }
}

fn lock(calendar: &SharedCalendar) -> Result<MutexGuard<'_, Calendar>, ToolError> {
    calendar.lock().map_err(|_| ToolError::CalendarUnavailable)
}

fn parse_args<T>(tool: &'static str, input: Value) -> Result<T, ToolError>
where
    T: DeserializeOwned,
{
    let input = if input.is_null() { json!({}) } else { input };
    serde_json::from_value(input)
        .map_err(|error| ToolError::InvalidArguments { tool, message: error.to_string() })
}

fn summaries<'a>(meetings: impl IntoIterator<Item = &'a Meeting>) -> Vec<MeetingSummary> {
    meetings.into_iter().map(MeetingSummary::from).collect()
}

struct AddMeetingTool {
    calendar: SharedCalendar,
}

#[derive(Deserialize)]
struct AddMeetingInput {
    topic: String,
    organizer: String,
    duration: u32,
    date: String,
    time: String,
    #[serde(default)]
    priority: Option<String>,
}

#[async_trait]
impl Tool for AddMeetingTool {
    fn name(&self) -> &'static str {
        "add_meeting"
    }

    fn description(&self) -> &'static str {
        "Adds a meeting to the calendar. Fails with the conflicting meetings and the next free \
         slot when the requested time is taken. Priority is LOW, MEDIUM (default) or HIGH."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: AddMeetingInput = parse_args(self.name(), input)?;
        let priority = parse_priority(input.priority.as_deref()).map_err(ToolError::from)?;
        let start = parse_timestamp(&input.date, Some(&input.time)).map_err(ToolError::from)?;

        let request = MeetingRequest::new(input.topic, input.organizer, input.duration, start)
            .with_priority(priority);
        let topic = request.topic.clone();

        let mut calendar = lock(&self.calendar)?;
        match calendar.add_meeting(request).map_err(ToolError::from)? {
            AddOutcome::Added(id) => Ok(json!({
                "id": id.0,
                "message": format!("Meeting '{topic}' added"),
            })),
            AddOutcome::Conflict { conflicts, suggestion } => {
                Err(ToolError::SlotConflict { conflicts: summaries(&conflicts), suggestion }.into())
            }
        }
    }
}

struct RemoveMeetingTool {
    calendar: SharedCalendar,
}

#[derive(Deserialize)]
struct RemoveMeetingInput {
    meeting_id: u64,
}

#[async_trait]
impl Tool for RemoveMeetingTool {
    fn name(&self) -> &'static str {
        "remove_meeting"
    }

    fn description(&self) -> &'static str {
        "Removes a meeting by id. Reports removed=false when the id does not exist."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: RemoveMeetingInput = parse_args(self.name(), input)?;
        let removed = lock(&self.calendar)?.remove_meeting(MeetingId(input.meeting_id));
        let message = if removed {
            format!("Meeting {} removed", input.meeting_id)
        } else {
            format!("Meeting {} not found", input.meeting_id)
        };
        Ok(json!({ "removed": removed, "message": message }))
    }
}

struct ListMeetingsTool {
    calendar: SharedCalendar,
}

#[async_trait]
impl Tool for ListMeetingsTool {
    fn name(&self) -> &'static str {
        "list_meetings"
    }

    fn description(&self) -> &'static str {
        "Lists every meeting ordered by start time."
    }

    async fn execute(&self, _input: Value) -> Result<Value> {
        let calendar = lock(&self.calendar)?;
        let meetings = summaries(calendar.meetings_by_start());
        let message = if meetings.is_empty() {
            "Calendar is empty.".to_string()
        } else {
            format!("{} meeting(s) scheduled", meetings.len())
        };
        Ok(json!({
            "meetings": meetings,
            "rendered": calendar.state_string(),
            "message": message,
        }))
    }
}

struct FindFreeSlotTool {
    calendar: SharedCalendar,
}

#[derive(Deserialize)]
struct FindFreeSlotInput {
    duration: u32,
    date: String,
    #[serde(default)]
    time: Option<String>,
}

#[async_trait]
impl Tool for FindFreeSlotTool {
    fn name(&self) -> &'static str {
        "find_free_slot"
    }

    fn description(&self) -> &'static str {
        "Finds the earliest free slot of the given duration at or after date/time. Without a \
         time the search starts at the beginning of the working day."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: FindFreeSlotInput = parse_args(self.name(), input)?;
        let start = parse_timestamp(&input.date, input.time.as_deref()).map_err(ToolError::from)?;

        let slot = lock(&self.calendar)?
            .find_next_free_slot(start, input.duration)
            .map_err(ToolError::from)?;
        Ok(json!({
            "next_available_slot": slot,
            "message": format!("Next free slot: {}", slot.format(SLOT_FORMAT)),
        }))
    }
}

struct IsTimeAvailableTool {
    calendar: SharedCalendar,
}

#[derive(Deserialize)]
struct IsTimeAvailableInput {
    duration: u32,
    date: String,
    time: String,
}

#[async_trait]
impl Tool for IsTimeAvailableTool {
    fn name(&self) -> &'static str {
        "is_time_available"
    }

    fn description(&self) -> &'static str {
        "Checks whether a slot lies inside working time and is free of meetings, listing the \
         reasons when it is not."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: IsTimeAvailableInput = parse_args(self.name(), input)?;
        let start = parse_timestamp(&input.date, Some(&input.time)).map_err(ToolError::from)?;
        let availability = lock(&self.calendar)?
            .check_availability(start, input.duration)
            .map_err(ToolError::from)?;
        let window = format!(
            "Slot {} - {}",
            availability.start.format("%H:%M"),
            availability.end.format("%H:%M")
        );
        let reasons = availability.reasons();
        let message = if availability.is_available() {
            format!("{window} is available.")
        } else {
            format!("{window} is not available: {}.", reasons.join("; "))
        };

        Ok(json!({
            "available": availability.is_available(),
            "is_working_time": availability.within_working_time,
            "is_free_from_meetings": availability.is_free_from_meetings(),
            "reasons": reasons,
            "conflicting_meetings": summaries(&availability.conflicts),
            "message": message,
        }))
    }
}

struct SetWorkingDaysTool {
    calendar: SharedCalendar,
}

#[derive(Deserialize)]
struct SetWorkingDaysInput {
    working_days: Vec<u8>,
}

#[async_trait]
impl Tool for SetWorkingDaysTool {
    fn name(&self) -> &'static str {
        "set_working_days"
    }

    fn description(&self) -> &'static str {
        "Sets which weekdays are working days (0 = Monday .. 6 = Sunday)."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: SetWorkingDaysInput = parse_args(self.name(), input)?;

        let mut calendar = lock(&self.calendar)?;
        calendar.set_working_days(input.working_days).map_err(ToolError::from)?;

        let days = calendar.policy().working_days().iter().copied().collect::<Vec<_>>();
        let names = days.iter().map(|day| DAY_NAMES[usize::from(*day)]).collect::<Vec<_>>();
        Ok(json!({
            "working_days": days,
            "day_names": names,
            "message": format!("Working days set: {}", names.join(", ")),
        }))
    }
}

struct SetWorkingHoursTool {
    calendar: SharedCalendar,
}

#[derive(Deserialize)]
struct SetWorkingHoursInput {
    work_start_hour: u32,
    work_end_hour: u32,
}

#[async_trait]
impl Tool for SetWorkingHoursTool {
    fn name(&self) -> &'static str {
        "set_working_hours"
    }

    fn description(&self) -> &'static str {
        "Sets the daily working window [start, end) in whole hours, 0 <= start < end <= 24."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: SetWorkingHoursInput = parse_args(self.name(), input)?;
        lock(&self.calendar)?
            .set_working_hours(input.work_start_hour, input.work_end_hour)
            .map_err(ToolError::from)?;
        Ok(json!({
            "work_start_hour": input.work_start_hour,
            "work_end_hour": input.work_end_hour,
            "message": format!(
                "Working hours set: {}:00 - {}:00",
                input.work_start_hour, input.work_end_hour
            ),
        }))
    }
}

struct GetCurrentDateTool;

#[async_trait]
impl Tool for GetCurrentDateTool {
    fn name(&self) -> &'static str {
        "get_current_date"
    }

    fn description(&self) -> &'static str {
        "Returns today's local date as YYYY-MM-DD."
    }

    async fn execute(&self, _input: Value) -> Result<Value> {
        Ok(Value::String(Local::now().date_naive().format(DATE_FORMAT).to_string()))
    }
}
