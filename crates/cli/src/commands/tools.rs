use serde_json::json;
use slotwise_agent::{calendar_registry, shared};
use slotwise_core::Calendar;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let registry = calendar_registry(shared(Calendar::default()));
    let described = registry.describe();
    let tools = described
        .iter()
        .map(|(name, description)| json!({ "name": name, "description": description }))
        .collect::<Vec<_>>();

    CommandResult::success_with_data(
        "tools",
        format!("{} calendar tools registered", described.len()),
        Some(json!({ "tools": tools })),
    )
}
