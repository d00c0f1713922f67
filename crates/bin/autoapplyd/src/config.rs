//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `autoapply.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use autoapply_app::automation_engine::EngineConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Background sweep and engine tunables.
    pub scheduler: SchedulerConfig,
    /// Where applications are submitted.
    pub submission: SubmissionConfig,
    /// Where reminders are delivered.
    pub notification: NotificationConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Scheduler configuration. Durations are in seconds.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Delay between two sweeps.
    pub interval_secs: u64,
    /// Failed submissions retried before a schedule is marked failed.
    pub max_retries: u32,
    /// Delay before a failed submission is attempted again.
    pub backoff_secs: u64,
    /// Upper bound for a single submission.
    pub submission_timeout_secs: u64,
    /// Minimum gap between two reminders for one schedule.
    pub reminder_suppression_secs: u64,
}

/// Submission endpoint configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// URL applications are POSTed to.
    pub endpoint: String,
    /// API keys used in turn as bearer tokens.
    pub api_keys: Vec<String>,
}

/// Notification configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Webhook receiving reminders. Reminders are only logged when unset.
    pub webhook_url: Option<String>,
}

impl Config {
    /// Load configuration from `autoapply.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("autoapply.toml")?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("AUTOAPPLY_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("AUTOAPPLY_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("AUTOAPPLY_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("AUTOAPPLY_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("AUTOAPPLY_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("AUTOAPPLY_SUBMISSION_ENDPOINT") {
            self.submission.endpoint = val;
        }
        if let Some(val) = var("AUTOAPPLY_SUBMISSION_API_KEYS") {
            self.submission.api_keys = val
                .split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(ToString::to_string)
                .collect();
        }
        if let Some(val) = var("AUTOAPPLY_NOTIFICATION_WEBHOOK") {
            self.notification.webhook_url = Some(val).filter(|url| !url.is_empty());
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.scheduler.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "scheduler interval must be non-zero".to_string(),
            ));
        }
        if self.submission.endpoint.trim().is_empty() {
            return Err(ConfigError::Validation(
                "submission endpoint must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Delay between two scheduler sweeps.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler.interval_secs)
    }

    /// Engine tunables derived from the `[scheduler]` section.
    #[must_use]
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            max_retries: self.scheduler.max_retries,
            backoff: Duration::from_secs(self.scheduler.backoff_secs),
            submission_timeout: Duration::from_secs(self.scheduler.submission_timeout_secs),
            reminder_suppression: Duration::from_secs(self.scheduler.reminder_suppression_secs),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:autoapply.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "autoapplyd=info,autoapply=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            interval_secs: 60,
            max_retries: engine.max_retries,
            backoff_secs: engine.backoff.as_secs(),
            submission_timeout_secs: engine.submission_timeout.as_secs(),
            reminder_suppression_secs: engine.reminder_suppression.as_secs(),
        }
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/applications".to_string(),
            api_keys: Vec::new(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite:autoapply.db?mode=rwc");
        assert_eq!(config.sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.engine(), EngineConfig::default());
        assert!(config.submission.api_keys.is_empty());
        assert!(config.notification.webhook_url.is_none());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.scheduler.interval_secs, 60);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'

            [scheduler]
            interval_secs = 10
            max_retries = 5
            backoff_secs = 30
            submission_timeout_secs = 3
            reminder_suppression_secs = 600

            [submission]
            endpoint = 'https://jobs.example.com/apply'
            api_keys = ['k1', 'k2']

            [notification]
            webhook_url = 'https://hooks.example.com/remind'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.sweep_interval(), Duration::from_secs(10));
        assert_eq!(
            config.engine(),
            EngineConfig {
                max_retries: 5,
                backoff: Duration::from_secs(30),
                submission_timeout: Duration::from_secs(3),
                reminder_suppression: Duration::from_secs(600),
            }
        );
        assert_eq!(config.submission.endpoint, "https://jobs.example.com/apply");
        assert_eq!(config.submission.api_keys, vec!["k1", "k2"]);
        assert_eq!(
            config.notification.webhook_url.as_deref(),
            Some("https://hooks.example.com/remind")
        );
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [scheduler]
            max_retries = 1
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.scheduler.max_retries, 1);
        assert_eq!(config.scheduler.interval_secs, 60);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_apply_environment_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("AUTOAPPLY_HOST", "127.0.0.1"),
            ("AUTOAPPLY_PORT", "4000"),
            ("AUTOAPPLY_DATABASE_URL", "sqlite::memory:"),
            ("AUTOAPPLY_LOG", "warn"),
            ("AUTOAPPLY_SUBMISSION_ENDPOINT", "https://jobs.example.com/apply"),
            ("AUTOAPPLY_SUBMISSION_API_KEYS", "k1, k2,,k3"),
            ("AUTOAPPLY_NOTIFICATION_WEBHOOK", "https://hooks.example.com"),
        ]));

        assert_eq!(config.bind_addr(), "127.0.0.1:4000");
        assert_eq!(config.database_url(), "sqlite::memory:");
        assert_eq!(config.logging.filter, "warn");
        assert_eq!(config.submission.endpoint, "https://jobs.example.com/apply");
        assert_eq!(config.submission.api_keys, vec!["k1", "k2", "k3"]);
        assert_eq!(
            config.notification.webhook_url.as_deref(),
            Some("https://hooks.example.com")
        );
    }

    #[test]
    fn should_prefer_bind_over_host_and_port() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("AUTOAPPLY_HOST", "10.0.0.1"),
            ("AUTOAPPLY_PORT", "4000"),
            ("AUTOAPPLY_BIND", "127.0.0.1:5000"),
        ]));
        assert_eq!(config.bind_addr(), "127.0.0.1:5000");
    }

    #[test]
    fn should_prefer_rust_log_over_autoapply_log() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("AUTOAPPLY_LOG", "warn"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_ignore_unparsable_port_override() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("AUTOAPPLY_PORT", "http")]));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_interval() {
        let mut config = Config::default();
        config.scheduler.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_empty_submission_endpoint() {
        let mut config = Config::default();
        config.submission.endpoint = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: submission endpoint must not be empty"
        );
    }

    #[test]
    fn should_accept_defaults() {
        assert!(Config::default().validate().is_ok());
    }
}
