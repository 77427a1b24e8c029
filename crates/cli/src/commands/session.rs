//! JSON-lines driver: one `{"tool": .., "arguments": {..}}` object per input
//! line, one result envelope per output line, all against one calendar.

use std::io::{self, BufRead, Write};

use serde_json::{json, Value};
use slotwise_agent::{calendar_registry, shared, ToolCall};
use slotwise_core::config::LoadOptions;
use slotwise_core::Calendar;
use tracing::info;

use crate::commands::{current_thread_runtime, prepare_calendar, CommandResult};

const COMMAND: &str = "session";

pub fn run(options: &LoadOptions, demo: bool) -> CommandResult {
    let calendar = match prepare_calendar(COMMAND, options, demo) {
        Ok(calendar) => calendar,
        Err(failure) => return failure,
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with(calendar, stdin.lock(), &mut stdout.lock())
}

/// Executes every call read from `input` in order and writes each result to
/// `output`. Calls that fail do not stop the session; the summary exit code
/// is 4 when any call failed and 5 when reading or writing failed.
pub fn run_with<R: BufRead, W: Write>(calendar: Calendar, input: R, output: &mut W) -> CommandResult {
    let runtime = match current_thread_runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };
    let registry = calendar_registry(shared(calendar));

    let mut executed = 0usize;
    let mut failed = 0usize;
    for (index, line) in input.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(error) => return io_failure(&error),
        };
        if line.trim().is_empty() {
            continue;
        }

        let result = match serde_json::from_str::<ToolCall>(&line) {
            Ok(call) => {
                let tool = call.tool.clone();
                let correlation_id = format!("session-{}", index + 1);
                match runtime.block_on(registry.dispatch(call)) {
                    Ok(value) => {
                        let message = value
                            .get("message")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("`{tool}` succeeded"));
                        CommandResult::success_with_data(&tool, message, Some(value))
                    }
                    Err(error) => CommandResult::tool_failure(&tool, &error, &correlation_id),
                }
            }
            Err(error) => CommandResult::failure(
                COMMAND,
                "invalid_input",
                format!("line {} is not a tool call: {error}", index + 1),
                4,
            ),
        };

        executed += 1;
        if result.exit_code != 0 {
            failed += 1;
        }
        if let Err(error) = writeln!(output, "{}", result.output) {
            return io_failure(&error);
        }
    }
    if let Err(error) = output.flush() {
        return io_failure(&error);
    }

    info!(event_name = "cli.session.completed", executed, failed, "session finished");

    let message = format!("session executed {executed} call(s), {failed} failed");
    let data = Some(json!({ "executed": executed, "failed": failed }));
    if failed == 0 {
        CommandResult::success_with_data(COMMAND, message, data)
    } else {
        CommandResult::failure_with_data(COMMAND, "tool_failure", message, 4, data)
    }
}

fn io_failure(error: &io::Error) -> CommandResult {
    CommandResult::failure(COMMAND, "io", format!("session I/O failed: {error}"), 5)
}
