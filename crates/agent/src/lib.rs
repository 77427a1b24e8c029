//! Agent tool layer for the slotwise calendar.
//!
//! This crate exposes calendar operations to an agent runtime as named tools
//! that take and return JSON:
//! - `add_meeting`, `remove_meeting`, `list_meetings`
//! - `find_free_slot`, `is_time_available`
//! - `set_working_days`, `set_working_hours`
//! - `get_current_date`
//!
//! # Architecture
//!
//! 1. **Registry** (`tools`) - name-based dispatch over boxed [`Tool`]s
//! 2. **Calendar tools** (`calendar`) - argument parsing, locking, and
//!    response shaping around one shared [`slotwise_core::Calendar`]
//!
//! # Concurrency
//!
//! The calendar itself does no locking. Every tool takes the shared mutex
//! for the whole operation, so an `add_meeting` check-then-insert can never
//! interleave with another call.

pub mod calendar;
pub mod tools;

pub use calendar::{calendar_registry, register_calendar_tools, shared, MeetingSummary, SharedCalendar};
pub use tools::{Tool, ToolCall, ToolError, ToolRegistry};
