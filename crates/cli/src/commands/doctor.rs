use std::time::Duration;

use maxim_core::config::{AppConfig, LlmConfig, LoadOptions};
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_DOCTOR};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

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

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { EXIT_DOCTOR };

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

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_credentials(&config.llm));
            checks.push(check_endpoint(&config.llm));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "llm_credentials",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "llm_endpoint",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
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

fn check_credentials(llm: &LlmConfig) -> DoctorCheck {
    let provider = llm.provider.as_str();
    let details = match &llm.api_key {
        Some(key) if !key.expose_secret().trim().is_empty() => {
            format!("api key present for `{provider}`")
        }
        _ if llm.provider.requires_api_key() => {
            return DoctorCheck {
                name: "llm_credentials",
                status: CheckStatus::Fail,
                details: format!("`{provider}` requires an api key"),
            };
        }
        _ => format!("`{provider}` does not require an api key"),
    };

    DoctorCheck { name: "llm_credentials", status: CheckStatus::Pass, details }
}

/// Lists the backend's models. Any HTTP answer below 500 other than an auth failure
/// counts as reachable, since some compatible servers do not serve `/models`.
fn check_endpoint(llm: &LlmConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "llm_endpoint",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let url = format!("{}/models", llm.resolved_base_url());
    let result = runtime.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|error| format!("failed to build http client: {error}"))?;

        let mut request = client.get(&url);
        if let Some(api_key) = &llm.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response =
            request.send().await.map_err(|error| format!("failed to reach `{url}`: {error}"))?;
        Ok::<reqwest::StatusCode, String>(response.status())
    });

    match result {
        Ok(status) if status.is_server_error() || matches!(status.as_u16(), 401 | 403) => {
            DoctorCheck {
                name: "llm_endpoint",
                status: CheckStatus::Fail,
                details: format!("`{url}` answered with status {status}"),
            }
        }
        Ok(status) => DoctorCheck {
            name: "llm_endpoint",
            status: CheckStatus::Pass,
            details: format!("`{url}` answered with status {status}"),
        },
        Err(error) => DoctorCheck { name: "llm_endpoint", status: CheckStatus::Fail, details: error },
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
