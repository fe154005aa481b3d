//! Configuration loading and typed config structures for the user pipeline.
//!
//! The configuration lives in `reactica-config.yaml` next to the binaries.
//! The file is optional and every field has a default matching the
//! reference deployment, so an empty file (or none at all) yields a
//! working configuration. Connection settings can be overridden from the
//! environment so containers can be wired without editing the file.

use std::path::{Path, PathBuf};

use reactica_store::{CallPolicy, DragonflyPool};
use serde::Deserialize;

use crate::schedule::DelayPolicy;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "reactica-config.yaml";

/// Environment variable naming an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "REACTICA_CONFIG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is syntactically valid but unusable.
    #[error("invalid configuration: {message}")]
    Invalid {
        /// Which setting is wrong and why.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this file.
    File(PathBuf),
    /// Built from defaults because this file does not exist.
    Defaults {
        /// The file that was looked for.
        missing: PathBuf,
    },
}

impl core::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults { missing } => write!(f, "defaults ({} not found)", missing.display()),
        }
    }
}

/// Top-level pipeline configuration.
///
/// Mirrors the structure of `reactica-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReacticaConfig {
    /// Key-value store connection and caches.
    #[serde(default)]
    pub store: StoreConfig,

    /// Bus connection and topic.
    #[serde(default)]
    pub bus: BusConfig,

    /// Arrival pacing.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ReacticaConfig {
    /// Load configuration the way the binaries do.
    ///
    /// Reads the file named by `REACTICA_CONFIG`, or `reactica-config.yaml`
    /// in the working directory. See [`load_from`](Self::load_from).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed, or if the resulting configuration is invalid.
    pub fn load() -> Result<(Self, ConfigSource), ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);
        Self::load_from(&path)
    }

    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    ///
    /// Nothing is logged here: loading happens before the subscriber is
    /// installed, so the returned [`ConfigSource`] is logged by the caller.
    /// Environment overrides and validation apply either way.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed, or if the resulting configuration is invalid.
    pub fn load_from(path: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        if path.exists() {
            let config = Self::from_file(path)?;
            Ok((config, ConfigSource::File(path.to_path_buf())))
        } else {
            let mut config = Self::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok((
                config,
                ConfigSource::Defaults {
                    missing: path.to_path_buf(),
                },
            ))
        }
    }

    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for connection settings:
    /// - `STORE_HOST` overrides `store.host`
    /// - `STORE_PORT` overrides `store.port`
    /// - `NATS_URL` overrides `bus.nats_url`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml reads an empty document as null rather than an empty map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override connection settings with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("STORE_HOST") {
            self.store.host = val;
        }
        if let Some(port) = std::env::var("STORE_PORT").ok().and_then(|v| v.parse().ok()) {
            self.store.port = port;
        }
        if let Ok(val) = std::env::var("NATS_URL") {
            self.bus.nats_url = val;
        }
    }

    /// Reject settings the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(bool, &str); 8] = [
            (self.store.port != 0, "store.port must not be 0"),
            (!self.store.host.is_empty(), "store.host must not be empty"),
            (!self.store.users_cache.is_empty(), "store.users_cache must not be empty"),
            (!self.store.events_cache.is_empty(), "store.events_cache must not be empty"),
            (self.store.timeout_ms > 0, "store.timeout_ms must be positive"),
            (!self.bus.topic.is_empty(), "bus.topic must not be empty"),
            (self.bus.publish_timeout_ms > 0, "bus.publish_timeout_ms must be positive"),
            (self.generator.floor_ms > 0, "generator.floor_ms must be positive"),
        ];
        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, message)) => Err(ConfigError::Invalid {
                message: (*message).to_owned(),
            }),
            None => Ok(()),
        }
    }
}

/// Key-value store settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Store host name.
    #[serde(default = "default_store_host")]
    pub host: String,

    /// Store port.
    #[serde(default = "default_store_port")]
    pub port: u16,

    /// Deadline for a single store call, in milliseconds.
    #[serde(default = "default_store_timeout_ms")]
    pub timeout_ms: u64,

    /// Extra attempts for a failed store call (0 = fail fast).
    #[serde(default)]
    pub max_retries: u32,

    /// Pause between retried store calls, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Cache holding the current record of each generated user.
    #[serde(default = "default_users_cache")]
    pub users_cache: String,

    /// Cache holding the last event received for each user.
    #[serde(default = "default_events_cache")]
    pub events_cache: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: default_store_host(),
            port: default_store_port(),
            timeout_ms: default_store_timeout_ms(),
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            users_cache: default_users_cache(),
            events_cache: default_events_cache(),
        }
    }
}

impl StoreConfig {
    /// The `redis://` URL of the store.
    pub fn url(&self) -> String {
        DragonflyPool::url_for(&self.host, self.port)
    }

    /// The timeout/retry policy for store calls.
    pub const fn call_policy(&self) -> CallPolicy {
        CallPolicy {
            timeout_ms: self.timeout_ms,
            max_retries: self.max_retries,
            retry_backoff_ms: self.retry_backoff_ms,
        }
    }
}

fn default_store_host() -> String {
    String::from("eventstore-dg-hotrod")
}

const fn default_store_port() -> u16 {
    11333
}

const fn default_store_timeout_ms() -> u64 {
    5000
}

const fn default_retry_backoff_ms() -> u64 {
    200
}

fn default_users_cache() -> String {
    String::from("users")
}

fn default_events_cache() -> String {
    String::from("userevents")
}

/// Bus settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BusConfig {
    /// NATS messaging URL.
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Topic carrying user lifecycle events.
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Deadline for a single publish, in milliseconds.
    #[serde(default = "default_publish_timeout_ms")]
    pub publish_timeout_ms: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            nats_url: default_nats_url(),
            topic: default_topic(),
            publish_timeout_ms: default_publish_timeout_ms(),
        }
    }
}

fn default_nats_url() -> String {
    String::from("nats://localhost:4222")
}

fn default_topic() -> String {
    String::from(reactica_bus::USER_EVENTS_TOPIC)
}

const fn default_publish_timeout_ms() -> u64 {
    5000
}

/// Arrival pacing settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratorConfig {
    /// Base inter-arrival period, in milliseconds.
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Bound of the signed jitter added to each draw, in milliseconds.
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,

    /// Delay used instead of any draw shorter than `burst_threshold_ms`.
    #[serde(default = "default_floor_ms")]
    pub floor_ms: u64,

    /// Draws below this are treated as bursts and replaced by `floor_ms`.
    #[serde(default = "default_burst_threshold_ms")]
    pub burst_threshold_ms: u64,

    /// RNG seed for reproducible pacing and names (random when unset).
    #[serde(default)]
    pub seed: Option<u64>,

    /// Stop after this many users (0 = run until shutdown).
    #[serde(default)]
    pub max_users: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            jitter_ms: default_jitter_ms(),
            floor_ms: default_floor_ms(),
            burst_threshold_ms: default_burst_threshold_ms(),
            seed: None,
            max_users: 0,
        }
    }
}

impl GeneratorConfig {
    /// The delay policy described by these settings.
    pub const fn delay_policy(&self) -> DelayPolicy {
        DelayPolicy {
            period_ms: self.period_ms,
            jitter_ms: self.jitter_ms,
            floor_ms: self.floor_ms,
            burst_threshold_ms: self.burst_threshold_ms,
        }
    }
}

const fn default_period_ms() -> u64 {
    20_000
}

const fn default_jitter_ms() -> u64 {
    3000
}

const fn default_floor_ms() -> u64 {
    5000
}

const fn default_burst_threshold_ms() -> u64 {
    100
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let config = ReacticaConfig::default();
        assert_eq!(config.store.host, "eventstore-dg-hotrod");
        assert_eq!(config.store.port, 11333);
        assert_eq!(config.store.users_cache, "users");
        assert_eq!(config.store.events_cache, "userevents");
        assert_eq!(config.bus.topic, "user-events");
        assert_eq!(config.generator.period_ms, 20_000);
        assert_eq!(config.generator.jitter_ms, 3000);
        assert_eq!(config.generator.floor_ms, 5000);
        assert_eq!(config.generator.burst_threshold_ms, 100);
        assert_eq!(config.generator.max_users, 0);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn store_url_and_policy() {
        let store = StoreConfig {
            max_retries: 2,
            ..StoreConfig::default()
        };
        assert_eq!(store.url(), "redis://eventstore-dg-hotrod:11333");
        assert_eq!(
            store.call_policy(),
            CallPolicy {
                timeout_ms: 5000,
                max_retries: 2,
                retry_backoff_ms: 200,
            }
        );
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
store:
  port: 6379
  timeout_ms: 750
  max_retries: 1
  users_cache: "test-users"
bus:
  topic: "test-events"
generator:
  period_ms: 1000
  jitter_ms: 200
  floor_ms: 300
  seed: 42
  max_users: 10
logging:
  level: "debug"
  format: "json"
"#;
        let config = ReacticaConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.unwrap_or_default();

        assert_eq!(config.store.port, 6379);
        assert_eq!(config.store.timeout_ms, 750);
        assert_eq!(config.store.users_cache, "test-users");
        assert_eq!(config.store.events_cache, "userevents");
        assert_eq!(config.bus.topic, "test-events");
        assert_eq!(config.generator.seed, Some(42));
        assert_eq!(config.generator.max_users, 10);
        assert_eq!(
            config.generator.delay_policy(),
            DelayPolicy {
                period_ms: 1000,
                jitter_ms: 200,
                floor_ms: 300,
                burst_threshold_ms: 100,
            }
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = ReacticaConfig::parse("generator:\n  period_ms: 500\n");
        assert!(config.is_ok());
        let config = config.unwrap_or_default();
        assert_eq!(config.generator.period_ms, 500);
        assert_eq!(config.generator.jitter_ms, 3000);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(ReacticaConfig::parse("").is_ok());
    }

    #[test]
    fn parse_invalid_yaml() {
        let result = ReacticaConfig::parse("store: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn zero_floor_is_rejected() {
        let result = ReacticaConfig::parse("generator:\n  floor_ms: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn empty_topic_is_rejected() {
        let result = ReacticaConfig::parse("bus:\n  topic: \"\"\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let missing = Path::new(env!("CARGO_MANIFEST_DIR")).join("no-such-config.yaml");
        let loaded = ReacticaConfig::load_from(&missing);
        assert!(loaded.is_ok(), "{loaded:?}");
        let (config, source) = loaded.unwrap_or_else(|_| {
            (ReacticaConfig::default(), ConfigSource::File(PathBuf::new()))
        });
        assert_eq!(config.generator, GeneratorConfig::default());
        assert_eq!(source, ConfigSource::Defaults { missing });
        assert!(source.to_string().contains("not found"));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(DEFAULT_CONFIG_FILE);
        if path.exists() {
            let loaded = ReacticaConfig::load_from(&path);
            assert!(loaded.is_ok(), "Failed to load project config: {loaded:?}");
            let source = loaded.map(|(_, source)| source).ok();
            assert_eq!(source, Some(ConfigSource::File(path)));
        }
    }
}
