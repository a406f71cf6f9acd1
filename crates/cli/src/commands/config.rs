use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use maxim_core::config::{AppConfig, LoadOptions};
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

struct ConfigEntry {
    key_path: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for entry in entries(&config) {
        let source = field_source(
            entry.key_path,
            entry.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(entry.key_path, &entry.value, source));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn entries(config: &AppConfig) -> Vec<ConfigEntry> {
    let api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };

    vec![
        ConfigEntry {
            key_path: "llm.provider",
            value: config.llm.provider.as_str().to_string(),
            env_keys: &["MAXIM_LLM_PROVIDER"],
        },
        ConfigEntry {
            key_path: "llm.model",
            value: config.llm.model.clone(),
            env_keys: &["MAXIM_LLM_MODEL"],
        },
        ConfigEntry {
            key_path: "llm.base_url",
            value: config.llm.resolved_base_url(),
            env_keys: &["MAXIM_LLM_BASE_URL"],
        },
        ConfigEntry {
            key_path: "llm.api_key",
            value: api_key.to_string(),
            env_keys: &["MAXIM_LLM_API_KEY", "GROQ_API_KEY"],
        },
        ConfigEntry {
            key_path: "llm.timeout_secs",
            value: config.llm.timeout_secs.to_string(),
            env_keys: &["MAXIM_LLM_TIMEOUT_SECS"],
        },
        ConfigEntry {
            key_path: "generation.temperature",
            value: config.generation.temperature.to_string(),
            env_keys: &["MAXIM_GENERATION_TEMPERATURE"],
        },
        ConfigEntry {
            key_path: "generation.short_quote_chars",
            value: config.generation.short_quote_chars.to_string(),
            env_keys: &["MAXIM_GENERATION_SHORT_QUOTE_CHARS"],
        },
        ConfigEntry {
            key_path: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["MAXIM_SERVER_BIND_ADDRESS"],
        },
        ConfigEntry {
            key_path: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["MAXIM_SERVER_PORT"],
        },
        ConfigEntry {
            key_path: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["MAXIM_LOGGING_LEVEL", "MAXIM_LOG_LEVEL"],
        },
        ConfigEntry {
            key_path: "logging.format",
            value: format!("{:?}", config.logging.format).to_ascii_lowercase(),
            env_keys: &["MAXIM_LOGGING_FORMAT", "MAXIM_LOG_FORMAT"],
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("maxim.toml"), PathBuf::from("config/maxim.toml")]
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
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
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
