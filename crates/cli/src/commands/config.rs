use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use slotwise_core::config::{AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult {
                exit_code: 2,
                output: format!("config validation failed: {error}"),
            };
        }
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let working_days = config
        .calendar
        .working_days
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",");

    let lines = vec![
        "effective config (source precedence: env > file > default):".to_string(),
        render_line(
            "calendar.working_days",
            &format!("[{working_days}]"),
            source("calendar.working_days", &["SLOTWISE_CALENDAR_WORKING_DAYS"]),
        ),
        render_line(
            "calendar.start_hour",
            &config.calendar.start_hour.to_string(),
            source("calendar.start_hour", &["SLOTWISE_CALENDAR_START_HOUR"]),
        ),
        render_line(
            "calendar.end_hour",
            &config.calendar.end_hour.to_string(),
            source("calendar.end_hour", &["SLOTWISE_CALENDAR_END_HOUR"]),
        ),
        render_line(
            "calendar.seed_demo",
            &config.calendar.seed_demo.to_string(),
            source("calendar.seed_demo", &["SLOTWISE_CALENDAR_SEED_DEMO"]),
        ),
        render_line(
            "logging.level",
            &config.logging.level,
            source("logging.level", &["SLOTWISE_LOGGING_LEVEL", "SLOTWISE_LOG_LEVEL"]),
        ),
        render_line(
            "logging.format",
            &format!("{:?}", config.logging.format),
            source("logging.format", &["SLOTWISE_LOGGING_FORMAT", "SLOTWISE_LOG_FORMAT"]),
        ),
    ];

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("slotwise.toml"), PathBuf::from("config/slotwise.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env_is_set(key)) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

/// Blank values are ignored by the loader, so they do not count as a source.
fn env_is_set(key: &str) -> bool {
    env::var(key).is_ok_and(|value| !value.trim().is_empty())
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
