use chrono::NaiveDate;
use serde::Serialize;
use slotwise_core::config::{AppConfig, LoadOptions};
use slotwise_core::fixtures::{demo_calendar, DEMO_MEETINGS};
use slotwise_core::policy::working_time::day_at;
use slotwise_core::{Calendar, WorkingTimePolicy};

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

/// Exits 2 when any check fails or is skipped.
pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 2 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            match config.calendar.policy() {
                Ok(policy) => {
                    checks.push(check_working_window(&policy));
                    checks.push(check_demo_fixture(&policy));
                    checks.push(check_slot_search(&policy));
                }
                Err(error) => {
                    checks.push(DoctorCheck {
                        name: "working_window",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    checks.extend(skipped(&["demo_fixture", "slot_search"], "policy is invalid"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.extend(skipped(
                &["working_window", "demo_fixture", "slot_search"],
                "configuration did not load",
            ));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn skipped(names: &[&'static str], reason: &str) -> Vec<DoctorCheck> {
    names
        .iter()
        .map(|name| DoctorCheck {
            name: *name,
            status: CheckStatus::Skipped,
            details: format!("skipped because {reason}"),
        })
        .collect()
}

fn check_working_window(policy: &WorkingTimePolicy) -> DoctorCheck {
    let days = policy.working_days().iter().map(u8::to_string).collect::<Vec<_>>().join(",");
    DoctorCheck {
        name: "working_window",
        status: CheckStatus::Pass,
        details: format!(
            "days [{days}], {:02}:00-{:02}:00 ({} minutes per day)",
            policy.start_hour(),
            policy.end_hour(),
            policy.window_minutes()
        ),
    }
}

fn check_demo_fixture(policy: &WorkingTimePolicy) -> DoctorCheck {
    match demo_calendar(policy.clone()) {
        Ok(calendar) if calendar.len() == DEMO_MEETINGS.len() => DoctorCheck {
            name: "demo_fixture",
            status: CheckStatus::Pass,
            details: format!("{} demo meetings load without conflicts", calendar.len()),
        },
        Ok(calendar) => DoctorCheck {
            name: "demo_fixture",
            status: CheckStatus::Fail,
            details: format!(
                "expected {} demo meetings, loaded {}",
                DEMO_MEETINGS.len(),
                calendar.len()
            ),
        },
        Err(error) => {
            DoctorCheck { name: "demo_fixture", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

/// Searches an empty calendar for a one-hour slot from a fixed Monday and
/// checks the answer lands on a working day inside the window.
fn check_slot_search(policy: &WorkingTimePolicy) -> DoctorCheck {
    let Some(monday) = NaiveDate::from_ymd_opt(2025, 4, 28) else {
        return DoctorCheck {
            name: "slot_search",
            status: CheckStatus::Fail,
            details: "probe date is invalid".to_string(),
        };
    };
    let duration = 60.min(policy.window_minutes());
    let calendar = Calendar::new(policy.clone());

    match calendar.find_next_free_slot(day_at(monday, 0), duration) {
        Ok(slot) if calendar.is_time_available(slot, duration) => DoctorCheck {
            name: "slot_search",
            status: CheckStatus::Pass,
            details: format!("first {duration} minute slot of the probe week: {slot}"),
        },
        Ok(slot) => DoctorCheck {
            name: "slot_search",
            status: CheckStatus::Fail,
            details: format!("search returned {slot}, which is not available"),
        },
        Err(error) => {
            DoctorCheck { name: "slot_search", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use slotwise_core::WorkingTimePolicy;

    use super::{check_demo_fixture, check_slot_search, CheckStatus};

    #[test]
    fn default_policy_passes_fixture_and_search_checks() {
        let policy = WorkingTimePolicy::default();
        assert_eq!(check_demo_fixture(&policy).status, CheckStatus::Pass);

        let search = check_slot_search(&policy);
        assert_eq!(search.status, CheckStatus::Pass);
        assert!(search.details.contains("2025-04-28 09:00:00"));
    }

    #[test]
    fn short_window_caps_probe_duration() {
        let policy = WorkingTimePolicy::new([2], 12, 13).expect("valid policy");
        let search = check_slot_search(&policy);
        assert_eq!(search.status, CheckStatus::Pass);
        assert!(search.details.contains("2025-04-30 12:00:00"));
    }
}
