use serde_json::Value;
use slotwise_agent::{calendar_registry, shared};
use slotwise_core::config::LoadOptions;

use crate::commands::{current_thread_runtime, prepare_calendar, CommandResult};

const COMMAND: &str = "call";

pub fn run(options: &LoadOptions, tool: &str, input: Option<&str>, demo: bool) -> CommandResult {
    let arguments = match input.map(serde_json::from_str::<Value>).transpose() {
        Ok(arguments) => arguments.unwrap_or(Value::Null),
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "invalid_input",
                format!("--input is not valid JSON: {error}"),
                4,
            );
        }
    };

    let calendar = match prepare_calendar(COMMAND, options, demo) {
        Ok(calendar) => calendar,
        Err(failure) => return failure,
    };
    let runtime = match current_thread_runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let registry = calendar_registry(shared(calendar));
    match runtime.block_on(registry.execute(tool, arguments)) {
        Ok(output) => {
            let message = output
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("`{tool}` succeeded"));
            CommandResult::success_with_data(COMMAND, message, Some(output))
        }
        Err(error) => CommandResult::tool_failure(COMMAND, &error, "call-1"),
    }
}
