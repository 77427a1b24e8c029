use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::Calendar;
use crate::errors::{ApplicationError, ScheduleError};
use crate::fixtures;
use crate::policy::WorkingTimePolicy;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub calendar: CalendarConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CalendarConfig {
    pub working_days: Vec<u8>,
    pub start_hour: u32,
    pub end_hour: u32,
    pub seed_demo: bool,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub working_days: Option<Vec<u8>>,
    pub start_hour: Option<u32>,
    pub end_hour: Option<u32>,
    pub seed_demo: Option<bool>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        let policy = WorkingTimePolicy::default();
        Self {
            calendar: CalendarConfig {
                working_days: policy.working_days().iter().copied().collect(),
                start_hour: policy.start_hour(),
                end_hour: policy.end_hour(),
                seed_demo: false,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl CalendarConfig {
    pub fn policy(&self) -> Result<WorkingTimePolicy, ScheduleError> {
        WorkingTimePolicy::new(self.working_days.iter().copied(), self.start_hour, self.end_hour)
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("slotwise.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// A fresh calendar under the configured policy, pre-populated with the
    /// demo week when `calendar.seed_demo` is set.
    pub fn calendar(&self) -> Result<Calendar, ApplicationError> {
        let policy = self.calendar.policy()?;
        if self.calendar.seed_demo {
            return fixtures::demo_calendar(policy);
        }
        Ok(Calendar::new(policy))
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(calendar) = patch.calendar {
            if let Some(working_days) = calendar.working_days {
                self.calendar.working_days = working_days;
            }
            if let Some(start_hour) = calendar.start_hour {
                self.calendar.start_hour = start_hour;
            }
            if let Some(end_hour) = calendar.end_hour {
                self.calendar.end_hour = end_hour;
            }
            if let Some(seed_demo) = calendar.seed_demo {
                self.calendar.seed_demo = seed_demo;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SLOTWISE_CALENDAR_WORKING_DAYS") {
            self.calendar.working_days = parse_days("SLOTWISE_CALENDAR_WORKING_DAYS", &value)?;
        }
        if let Some(value) = read_env("SLOTWISE_CALENDAR_START_HOUR") {
            self.calendar.start_hour = parse_u32("SLOTWISE_CALENDAR_START_HOUR", &value)?;
        }
        if let Some(value) = read_env("SLOTWISE_CALENDAR_END_HOUR") {
            self.calendar.end_hour = parse_u32("SLOTWISE_CALENDAR_END_HOUR", &value)?;
        }
        if let Some(value) = read_env("SLOTWISE_CALENDAR_SEED_DEMO") {
            self.calendar.seed_demo = parse_bool("SLOTWISE_CALENDAR_SEED_DEMO", &value)?;
        }

        let log_level =
            read_env("SLOTWISE_LOGGING_LEVEL").or_else(|| read_env("SLOTWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SLOTWISE_LOGGING_FORMAT").or_else(|| read_env("SLOTWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(working_days) = overrides.working_days {
            self.calendar.working_days = working_days;
        }
        if let Some(start_hour) = overrides.start_hour {
            self.calendar.start_hour = start_hour;
        }
        if let Some(end_hour) = overrides.end_hour {
            self.calendar.end_hour = end_hour;
        }
        if let Some(seed_demo) = overrides.seed_demo {
            self.calendar.seed_demo = seed_demo;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_calendar(&self.calendar)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("slotwise.toml"), PathBuf::from("config/slotwise.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_calendar(calendar: &CalendarConfig) -> Result<(), ConfigError> {
    if calendar.working_days.is_empty() {
        return Err(ConfigError::Validation(
            "calendar.working_days must name at least one day (0 = Monday .. 6 = Sunday)"
                .to_string(),
        ));
    }

    calendar.policy().map_err(|error| match error {
        ScheduleError::InvalidWorkingHours { start, end } => ConfigError::Validation(format!(
            "calendar.start_hour/end_hour must satisfy 0 <= start < end <= 24 (got {start}..{end})"
        )),
        ScheduleError::InvalidWorkingDay(day) => ConfigError::Validation(format!(
            "calendar.working_days entries must be in range 0..=6 (got {day})"
        )),
        other => ConfigError::Validation(format!("calendar policy is invalid: {other}")),
    })?;

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_days(key: &str, value: &str) -> Result<Vec<u8>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|day| !day.is_empty())
        .map(|day| {
            day.parse::<u8>().map_err(|_| ConfigError::InvalidEnvOverride {
                key: key.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    calendar: Option<CalendarPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CalendarPatch {
    working_days: Option<Vec<u8>>,
    start_hour: Option<u32>,
    end_hour: Option<u32>,
    seed_demo: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_SLOTWISE_END_HOUR", "17");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("slotwise.toml");
            fs::write(
                &path,
                r#"
[calendar]
start_hour = 8
end_hour = ${TEST_SLOTWISE_END_HOUR}
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.calendar.start_hour == 8, "start hour should come from the file")?;
            ensure(config.calendar.end_hour == 17, "end hour should be interpolated from env")?;
            Ok(())
        })();

        clear_vars(&["TEST_SLOTWISE_END_HOUR"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SLOTWISE_LOG_LEVEL", "warn");
        env::set_var("SLOTWISE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["SLOTWISE_LOG_LEVEL", "SLOTWISE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SLOTWISE_CALENDAR_WORKING_DAYS", "0, 1, 2");
        env::set_var("SLOTWISE_CALENDAR_START_HOUR", "10");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("slotwise.toml");
            fs::write(
                &path,
                r#"
[calendar]
working_days = [0, 1, 2, 3, 4, 5]
start_hour = 7
end_hour = 19

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    end_hour: Some(16),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.calendar.end_hour == 16, "override end hour should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.calendar.start_hour == 10, "env start hour should win over file")?;
            ensure(
                config.calendar.working_days == vec![0, 1, 2],
                "env working days should win over file",
            )?;
            Ok(())
        })();

        clear_vars(&["SLOTWISE_CALENDAR_WORKING_DAYS", "SLOTWISE_CALENDAR_START_HOUR"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SLOTWISE_CALENDAR_START_HOUR", "20");
        env::set_var("SLOTWISE_CALENDAR_END_HOUR", "18");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("calendar.start_hour")
            );
            ensure(has_message, "validation failure should mention calendar.start_hour")
        })();

        clear_vars(&["SLOTWISE_CALENDAR_START_HOUR", "SLOTWISE_CALENDAR_END_HOUR"]);
        result
    }

    #[test]
    fn malformed_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SLOTWISE_CALENDAR_WORKING_DAYS", "mon,tue");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected env override failure".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(error, ConfigError::InvalidEnvOverride { ref key, .. } if key == "SLOTWISE_CALENDAR_WORKING_DAYS"),
                "error should name the offending variable",
            )
        })();

        clear_vars(&["SLOTWISE_CALENDAR_WORKING_DAYS"]);
        result
    }

    #[test]
    fn defaults_build_an_empty_weekday_calendar() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "default format is compact")?;

        let calendar = config.calendar().map_err(|err| err.to_string())?;
        ensure(calendar.is_empty(), "calendar should start empty")?;
        ensure(calendar.policy().working_days().len() == 5, "default policy is Mon-Fri")?;

        let seeded = AppConfig {
            calendar: super::CalendarConfig { seed_demo: true, ..config.calendar.clone() },
            ..config
        };
        let demo = seeded.calendar().map_err(|err| err.to_string())?;
        ensure(!demo.is_empty(), "seed_demo should pre-populate the calendar")
    }
}
