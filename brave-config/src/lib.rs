//! Loader for the app configuration with YAML + environment overlays.
//!
//! Sources are merged in order: config file (optional or required), inline
//! YAML snippets, then `BRAVE__`-prefixed environment variables. String values
//! may reference `${VAR}` placeholders, expanded after the merge.
//!
//! ```yaml
//! version: "1"
//! api_key: "${BRAVE_API_KEY}"
//! base_url: "https://api.search.brave.com"   # default
//! timeout_secs: 10                           # optional, unset = no timeout
//! logging:
//!   format: json        # text | json
//!   emit_stderr: true
//!   filter: "info,brave_http=debug"
//!   dir: "~/.local/share/brave-search"
//! ```
use brave_common::DEFAULT_API_BASE;
use brave_common::observability::LogFormat;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "BRAVE";

#[derive(Deserialize)]
pub struct BraveConfig {
    #[serde(default)]
    pub version: Option<String>,
    /// Subscription token sent as `X-Subscription-Token`. Empty means unset.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl BraveConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

// Hand-written so the key never lands in logs via `{:?}`.
impl fmt::Debug for BraveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BraveConfig")
            .field("version", &self.version)
            .field(
                "api_key",
                &if self.has_api_key() { "<redacted>" } else { "<unset>" },
            )
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("logging", &self.logging)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub emit_stderr: bool,
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            emit_stderr: false,
            filter: default_filter(),
            dir: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.into()
}
fn default_filter() -> String {
    "info".into()
}

// Environment overrides arrive as strings; accept both "10" and 10.
fn lenient_opt_u64<'de, D>(d: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("expected unsigned integer, got {n}"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected unsigned integer, got {s:?}"))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected unsigned integer, got {other}"
        ))),
    }
}

fn lenient_bool<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(d)? {
        Value::Bool(b) => Ok(b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!("expected boolean, got {other:?}"))),
        },
        Value::Null => Ok(false),
        other => Err(serde::de::Error::custom(format!("expected boolean, got {other}"))),
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct BraveConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for BraveConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl BraveConfigLoader {
    /// Start with no file sources and `BRAVE__` env overrides.
    ///
    /// ```
    /// use brave_config::BraveConfigLoader;
    ///
    /// let config = BraveConfigLoader::new()
    ///     .with_yaml_str("version: '1'\napi_key: abc")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.base_url, "https://api.search.brave.com");
    /// assert!(config.timeout().is_none());
    /// ```
    pub fn new() -> Self {
        // Env is added last in `load` so it overrides file and inline sources.
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, for deployments configured purely
    /// through the environment.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use brave_config::BraveConfigLoader;
    ///
    /// let config = temp_env::with_var("DOC_BRAVE_TOKEN", Some("from-env"), || {
    ///     BraveConfigLoader::new()
    ///         .with_yaml_str("api_key: \"${DOC_BRAVE_TOKEN}\"")
    ///         .load()
    ///         .expect("valid configuration")
    /// });
    ///
    /// assert_eq!(config.api_key, "from-env");
    /// ```
    pub fn load(self) -> Result<BraveConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
