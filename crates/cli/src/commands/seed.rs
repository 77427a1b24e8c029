use serde_json::json;
use slotwise_core::config::{AppConfig, LoadOptions};
use slotwise_core::fixtures::demo_calendar;

use crate::commands::CommandResult;

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let policy = match config.calendar.policy() {
        Ok(policy) => policy,
        Err(error) => {
            return CommandResult::failure("seed", "config_validation", error.to_string(), 2);
        }
    };

    match demo_calendar(policy) {
        Ok(calendar) => CommandResult::success_with_data(
            "seed",
            calendar.state_string(),
            Some(json!({ "meetings": calendar.len() })),
        ),
        Err(error) => CommandResult::failure("seed", "seed_execution", error.to_string(), 4),
    }
}
