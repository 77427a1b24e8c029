use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;
use slotwise_core::input::SLOT_FORMAT;
use slotwise_core::{ApplicationError, InterfaceError, ParseError, ScheduleError};
use thiserror::Error;
use tracing::{info, warn};

use crate::calendar::MeetingSummary;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    async fn execute(&self, input: Value) -> Result<Value>;
}

/// One invocation request, as read from an agent or a JSON-lines session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Clone, Debug, Error)]
pub enum ToolError {
    #[error("{}", conflict_message(.conflicts, .suggestion.as_ref()))]
    SlotConflict { conflicts: Vec<MeetingSummary>, suggestion: Option<NaiveDateTime> },
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("invalid arguments for `{tool}`: {message}")]
    InvalidArguments { tool: &'static str, message: String },
    #[error("unknown tool `{0}`")]
    UnknownTool(String),
    #[error("calendar is unavailable: a previous operation panicked while holding it")]
    CalendarUnavailable,
}

fn conflict_message(conflicts: &[MeetingSummary], suggestion: Option<&NaiveDateTime>) -> String {
    let topics = conflicts.iter().map(|meeting| meeting.topic.as_str()).collect::<Vec<_>>();
    let topics = if topics.is_empty() { "unknown meeting".to_string() } else { topics.join(", ") };
    match suggestion {
        Some(slot) => format!(
            "requested time conflicts with: {topics}. Next free slot: {}",
            slot.format(SLOT_FORMAT)
        ),
        None => format!("requested time conflicts with: {topics}. No free slot could be found"),
    }
}

impl ToolError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::SlotConflict { .. } => "slot_conflict",
            Self::Schedule(ScheduleError::InvalidWorkingHours { .. }) => "invalid_working_hours",
            Self::Schedule(_) => "schedule",
            Self::Parse(_) => "parse",
            Self::InvalidArguments { .. } => "invalid_arguments",
            Self::UnknownTool(_) => "unknown_tool",
            Self::CalendarUnavailable => "calendar_unavailable",
        }
    }

    pub fn to_interface(&self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        match self {
            Self::SlotConflict { conflicts, .. } => {
                ApplicationError::SlotConflict { count: conflicts.len() }
                    .into_interface(correlation_id)
            }
            Self::Schedule(error) => {
                ApplicationError::from(error.clone()).into_interface(correlation_id)
            }
            Self::Parse(error) => ApplicationError::from(error.clone()).into_interface(correlation_id),
            Self::InvalidArguments { .. } | Self::UnknownTool(_) => {
                InterfaceError::BadRequest { message: self.to_string(), correlation_id }
            }
            Self::CalendarUnavailable => {
                InterfaceError::Internal { message: self.to_string(), correlation_id }
            }
        }
    }
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    /// Registered `(name, description)` pairs sorted by name.
    pub fn describe(&self) -> Vec<(&'static str, &'static str)> {
        let mut described =
            self.tools.values().map(|tool| (tool.name(), tool.description())).collect::<Vec<_>>();
        described.sort_by_key(|(name, _)| *name);
        described
    }

    pub async fn execute(&self, name: &str, input: Value) -> Result<Value> {
        let tool = self.get(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        match tool.execute(input).await {
            Ok(output) => {
                info!(event_name = "agent.tool.executed", tool = name, "tool call succeeded");
                Ok(output)
            }
            Err(error) => {
                let error_class = error
                    .downcast_ref::<ToolError>()
                    .map(ToolError::error_class)
                    .unwrap_or("internal");
                warn!(
                    event_name = "agent.tool.failed",
                    tool = name,
                    error_class,
                    error = %error,
                    "tool call failed"
                );
                Err(error)
            }
        }
    }

    pub async fn dispatch(&self, call: ToolCall) -> Result<Value> {
        self.execute(&call.tool, call.arguments).await
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use slotwise_core::{InterfaceError, ScheduleError};

    use super::{Tool, ToolCall, ToolError, ToolRegistry};

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Returns its input."
        }

        async fn execute(&self, input: Value) -> Result<Value> {
            Ok(input)
        }
    }

    #[tokio::test]
    async fn dispatches_by_name() {
        let mut registry = ToolRegistry::default();
        assert!(registry.is_empty());
        registry.register(Echo);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.describe(), vec![("echo", "Returns its input.")]);

        let call: ToolCall =
            serde_json::from_value(json!({"tool": "echo", "arguments": {"a": 1}})).expect("call");
        let output = registry.dispatch(call).await.expect("echo succeeds");
        assert_eq!(output, json!({"a": 1}));
    }

    #[tokio::test]
    async fn unknown_tool_is_a_typed_error() {
        let registry = ToolRegistry::default();
        let error = registry.execute("nope", Value::Null).await.expect_err("unknown tool");
        let tool_error = error.downcast_ref::<ToolError>().expect("typed error");
        assert!(matches!(tool_error, ToolError::UnknownTool(name) if name == "nope"));
        assert_eq!(tool_error.error_class(), "unknown_tool");
    }

    #[test]
    fn call_arguments_default_to_null() {
        let call: ToolCall =
            serde_json::from_value(json!({"tool": "list_meetings"})).expect("call");
        assert_eq!(call.arguments, Value::Null);
    }

    #[test]
    fn schedule_errors_map_to_bad_request() {
        let error = ToolError::from(ScheduleError::InvalidWorkingHours { start: 20, end: 18 });
        assert_eq!(error.error_class(), "invalid_working_hours");
        assert!(matches!(
            error.to_interface("call-1"),
            InterfaceError::BadRequest { ref correlation_id, .. } if correlation_id == "call-1"
        ));
    }
}
