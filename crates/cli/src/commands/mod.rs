pub mod call;
pub mod config;
pub mod doctor;
pub mod seed;
pub mod session;
pub mod tools;

use serde::Serialize;
use serde_json::{json, Value};
use slotwise_agent::ToolError;
use slotwise_core::config::{AppConfig, LoadOptions};
use slotwise_core::input::SLOT_FORMAT;
use slotwise_core::Calendar;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            correlation_id: None,
            hint: None,
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::failure_with_data(command, error_class, message, exit_code, None)
    }

    pub fn failure_with_data(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            correlation_id: None,
            hint: None,
            data,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Maps a failed tool call onto the command envelope. Typed tool errors
    /// keep their class and, for conflicts, the conflicting meetings and the
    /// suggested slot. `correlation_id` is echoed so a failure can be matched
    /// to its log lines.
    pub fn tool_failure(command: &str, error: &anyhow::Error, correlation_id: &str) -> Self {
        let payload = match error.downcast_ref::<ToolError>() {
            Some(tool_error) => {
                let interface = tool_error.to_interface(correlation_id);
                let data = match tool_error {
                    ToolError::SlotConflict { conflicts, suggestion } => Some(json!({
                        "conflicts": conflicts,
                        "suggestion": suggestion.map(|slot| slot.format(SLOT_FORMAT).to_string()),
                    })),
                    _ => None,
                };
                CommandOutcome {
                    command: command.to_string(),
                    status: "error".to_string(),
                    error_class: Some(tool_error.error_class().to_string()),
                    message: tool_error.to_string(),
                    correlation_id: Some(interface.correlation_id().to_string()),
                    hint: Some(interface.user_message().to_string()),
                    data,
                }
            }
            None => CommandOutcome {
                command: command.to_string(),
                status: "error".to_string(),
                error_class: Some("internal".to_string()),
                message: error.to_string(),
                correlation_id: Some(correlation_id.to_string()),
                hint: None,
                data: None,
            },
        };
        Self { exit_code: 4, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Loads config and builds the calendar a tool-driving command works on.
pub(crate) fn prepare_calendar(
    command: &str,
    options: &LoadOptions,
    demo: bool,
) -> Result<Calendar, CommandResult> {
    let mut config = AppConfig::load(options.clone()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })?;
    if demo {
        config.calendar.seed_demo = true;
    }
    config.calendar().map_err(|error| {
        let interface = error.into_interface(command);
        CommandResult::failure(command, "calendar_init", interface.to_string(), 2)
    })
}

pub(crate) fn current_thread_runtime(
    command: &str,
) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}
