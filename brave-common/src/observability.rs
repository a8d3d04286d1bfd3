//! Process-wide logging setup.
//!
//! Everything in the workspace logs through `tracing`; this module decides
//! where those events land (a rolling file, optionally stderr) and how they
//! are encoded.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Env var consulted when no explicit log directory is configured.
pub const LOG_DIR_ENV: &str = "BRAVE_LOG_DIR";

/// Output encoding for structured logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Logical name of the component (used for defaults and file names).
    pub app_name: &'static str,
    /// Optional explicit directory for log output. If `None`, we consult
    /// `BRAVE_LOG_DIR` and finally fall back to `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    /// Whether to duplicate events to `stderr` in addition to the file sink.
    pub emit_stderr: bool,
    /// Preferred log encoding.
    pub format: LogFormat,
    /// Default filter applied when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "brave-search",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

/// Install the global `tracing` subscriber: a daily-rolling file sink, plus
/// stderr when asked. `RUST_LOG` overrides `default_filter`.
///
/// Returns today's log file. Only the first call installs anything; later
/// calls get the path resolved by the first.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let dir = resolve_log_dir(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    let prefix = format!("{}.log", config.app_name);
    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, &prefix));
    let _ = LOG_GUARD.set(guard);

    let mut sinks: Vec<BoxedLayer> = vec![encoded(config.format, writer, false)];
    if config.emit_stderr {
        sinks.push(encoded(config.format, std::io::stderr, true));
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::registry()
        .with(sinks)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let path = dated_file(&dir, &prefix, Local::now().date_naive());
    let _ = LOG_PATH.set(path.clone());
    tracing::info!(
        app = config.app_name,
        log_path = %path.display(),
        format = ?config.format,
        "logging.initialised"
    );
    Ok(path)
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn encoded<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(ansi).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    }
}

/// File the daily appender writes to on `date`.
fn dated_file(dir: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    dir.join(format!("{prefix}.{}", date.format("%Y-%m-%d")))
}

fn resolve_log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return expand_home(dir);
    }

    if let Ok(env_dir) = std::env::var(LOG_DIR_ENV) {
        return expand_home(Path::new(&env_dir));
    }

    default_data_dir(app_name)
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

// ~/.local/share/<app>, or ./<app> without a home directory.
fn default_data_dir(app_name: &str) -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".local/share"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(app_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = resolve_log_dir("brave-tests", Some(tmp.path()));
        assert_eq!(dir, tmp.path());
    }

    #[test]
    fn default_dir_ends_with_app_name() {
        let dir = default_data_dir("brave-tests");
        assert!(dir.ends_with("brave-tests"));
    }

    #[test]
    fn tilde_is_expanded_against_home() {
        if let Some(home) = std::env::var_os("HOME") {
            let got = expand_home(Path::new("~/logs/brave"));
            assert_eq!(got, PathBuf::from(home).join("logs/brave"));
        }
        assert_eq!(expand_home(Path::new("/var/log")), PathBuf::from("/var/log"));
    }

    #[test]
    fn dated_file_matches_daily_appender_naming() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let got = dated_file(Path::new("/tmp/logs"), "brave-search.log", date);
        assert_eq!(got, PathBuf::from("/tmp/logs/brave-search.log.2024-03-09"));
    }

    #[test]
    fn init_logging_only_installs_once() {
        let tmp = tempfile::TempDir::new().unwrap();
        let first = init_logging(LogConfig {
            app_name: "brave-init-test",
            log_dir: Some(tmp.path().to_path_buf()),
            ..Default::default()
        })
        .unwrap();
        assert!(first.starts_with(tmp.path()));
        assert!(first
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("brave-init-test.log.")));

        let other = tempfile::TempDir::new().unwrap();
        let second = init_logging(LogConfig {
            log_dir: Some(other.path().to_path_buf()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn log_format_parses_lowercase() {
        let f: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(f, LogFormat::Json);
        let f: LogFormat = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(f, LogFormat::Text);
    }
}
