use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_LOG_FILE: &str = "chronos.logs.jsonl";

fn parse_bool_env(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

/// Logging settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilitySettings {
    pub enabled: bool,
    /// Filter directive from `CHRONOS_LOG_LEVEL`; `RUST_LOG` applies when unset.
    pub level: Option<String>,
    /// JSONL destination; console on stderr when unset.
    pub json_log_path: Option<PathBuf>,
}

impl ObservabilitySettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = ["CHRONOS_OBSERVABILITY_ENABLED", "CHRONOS_OBSERVABILITY"]
            .into_iter()
            .find_map(|key| lookup(key))
            .map(|value| parse_bool_env(&value).unwrap_or(true))
            .unwrap_or(true);
        let level = lookup("CHRONOS_LOG_LEVEL").filter(|v| !v.trim().is_empty());
        let json_log_path = lookup("CHRONOS_JSON_LOG_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Self {
            enabled,
            level,
            json_log_path,
        }
    }

    fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        if let Some(level) = &self.level
            && let Ok(filter) = tracing_subscriber::EnvFilter::try_new(level)
        {
            return filter;
        }
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    }
}

fn split_log_path(path: &Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_LOG_FILE)
        .to_string();
    (dir, file_name)
}

/// Initialize logging once per process.
///
/// Environment variables:
/// - `CHRONOS_OBSERVABILITY_ENABLED` / `CHRONOS_OBSERVABILITY`: enable/disable flag (default enabled).
/// - `CHRONOS_LOG_LEVEL`: level/filter override (`info`, `chronos_core=debug`, ...).
/// - `CHRONOS_JSON_LOG_PATH`: if set, logs are JSONL in that file. Otherwise a
///   compact console format goes to stderr so stdout stays free for command output.
/// - `RUST_LOG`: filter fallback.
pub fn init_observability() {
    INIT.get_or_init(|| {
        let settings = ObservabilitySettings::from_env();
        if !settings.enabled {
            return;
        }

        let env_filter = settings.env_filter();
        if let Some(path) = &settings.json_log_path {
            let (dir, file_name) = split_log_path(path);
            let _ = std::fs::create_dir_all(&dir);
            let writer = tracing_appender::rolling::never(dir, file_name);
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(false)
                .with_writer(writer);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .try_init();
        } else {
            let console_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> ObservabilitySettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ObservabilitySettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn parse_bool_env_accepts_common_spellings() {
        assert_eq!(parse_bool_env(" Yes "), Some(true));
        assert_eq!(parse_bool_env("disabled"), Some(false));
        assert_eq!(parse_bool_env("0"), Some(false));
        assert_eq!(parse_bool_env("maybe"), None);
    }

    #[test]
    fn defaults_to_enabled_console_logging() {
        let resolved = settings(&[]);
        assert!(resolved.enabled);
        assert_eq!(resolved.level, None);
        assert_eq!(resolved.json_log_path, None);
    }

    #[test]
    fn primary_flag_wins_and_garbage_means_enabled() {
        assert!(
            !settings(&[
                ("CHRONOS_OBSERVABILITY_ENABLED", "off"),
                ("CHRONOS_OBSERVABILITY", "on"),
            ])
            .enabled
        );
        assert!(settings(&[("CHRONOS_OBSERVABILITY", "whatever")]).enabled);
    }

    #[test]
    fn json_path_and_level_are_picked_up() {
        let resolved = settings(&[
            ("CHRONOS_LOG_LEVEL", "debug"),
            ("CHRONOS_JSON_LOG_PATH", "logs/run.jsonl"),
        ]);
        assert_eq!(resolved.level.as_deref(), Some("debug"));
        let (dir, file) = split_log_path(resolved.json_log_path.as_deref().expect("path"));
        assert_eq!(dir, PathBuf::from("logs"));
        assert_eq!(file, "run.jsonl");
    }

    #[test]
    fn bare_file_name_logs_to_current_dir() {
        let (dir, file) = split_log_path(Path::new("trace.jsonl"));
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file, "trace.jsonl");
    }
}
