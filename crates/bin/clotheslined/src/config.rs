//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `clothesline.toml` in the working directory. Every field has a
//! default so the file is optional. Environment variables take precedence
//! over file values.

use std::time::Duration;

use serde::Deserialize;

const CONFIG_FILE: &str = "clothesline.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Telemetry tick settings.
    pub telemetry: TelemetryConfig,
    /// Shared store settings.
    pub store: StoreConfig,
    /// Automation engine settings.
    pub automation: AutomationConfig,
    /// Motor settings.
    pub motor: MotorConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Milliseconds between two sensor ticks.
    pub interval_ms: u64,
    /// Start ticking on boot instead of waiting for `POST /start`.
    pub autostart: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base path; status and command live directly below it.
    pub root: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    pub enabled: bool,
    /// How long a forecast must hold before it is acted on.
    pub stability_ms: u64,
    /// Minimum gap between two automated commands.
    pub cooldown_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    /// Full travel time between the two end positions.
    pub travel_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `clothesline.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file(CONFIG_FILE)?;
        config.apply_overrides(|key| std::env::var(key).ok());
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

    /// Apply overrides read through `lookup`, in increasing precedence.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("CLOTHESLINE_HOST") {
            self.server.host = val;
        }
        for key in ["PORT", "CLOTHESLINE_PORT"] {
            if let Some(port) = lookup(key).and_then(|val| val.parse().ok()) {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("CLOTHESLINE_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        for key in ["INTERVAL_MS", "CLOTHESLINE_INTERVAL_MS"] {
            if let Some(interval) = lookup(key).and_then(|val| val.parse().ok()) {
                self.telemetry.interval_ms = interval;
            }
        }
        if let Some(autostart) = lookup("CLOTHESLINE_AUTOSTART").and_then(|val| parse_flag(&val)) {
            self.telemetry.autostart = autostart;
        }
        if let Some(val) = lookup("CLOTHESLINE_STORE_ROOT") {
            self.store.root = val;
        }
        if let Some(enabled) = lookup("CLOTHESLINE_AUTOMATION").and_then(|val| parse_flag(&val)) {
            self.automation.enabled = enabled;
        }
        if let Some(val) = lookup("CLOTHESLINE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.telemetry.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "telemetry interval must be non-zero".to_string(),
            ));
        }
        if self.motor.travel_ms == 0 {
            return Err(ConfigError::Validation(
                "motor travel time must be non-zero".to_string(),
            ));
        }
        let root = self.store.root.trim_end_matches('/');
        if !root.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "store root {:?} must start with '/'",
                self.store.root
            )));
        }
        if root.is_empty() {
            return Err(ConfigError::Validation(
                "store root must name a path below '/'".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry.interval_ms)
    }

    #[must_use]
    pub fn motor_travel(&self) -> Duration {
        Duration::from_millis(self.motor.travel_ms)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
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

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            interval_ms: 3_000,
            autostart: true,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: "/clothesline".to_string(),
        }
    }
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stability_ms: 10_000,
            cooldown_ms: 45_000,
        }
    }
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self { travel_ms: 5_000 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "clotheslined=info,clothesline=info,tower_http=debug".to_string(),
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

    fn overridden(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).cloned());
        config
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.telemetry_interval(), Duration::from_millis(3_000));
        assert!(config.telemetry.autostart);
        assert_eq!(config.store.root, "/clothesline");
        assert!(config.automation.enabled);
        assert_eq!(config.automation.stability_ms, 10_000);
        assert_eq!(config.automation.cooldown_ms, 45_000);
        assert_eq!(config.motor_travel(), Duration::from_millis(5_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [telemetry]
            interval_ms = 1000
            autostart = false

            [store]
            root = '/garden/line'

            [automation]
            enabled = false
            stability_ms = 2000
            cooldown_ms = 8000

            [motor]
            travel_ms = 1500

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.telemetry.interval_ms, 1_000);
        assert!(!config.telemetry.autostart);
        assert_eq!(config.store.root, "/garden/line");
        assert!(!config.automation.enabled);
        assert_eq!(config.automation.stability_ms, 2_000);
        assert_eq!(config.automation.cooldown_ms, 8_000);
        assert_eq!(config.motor.travel_ms, 1_500);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [telemetry]
            interval_ms = 500
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.telemetry.interval_ms, 500);
        assert!(config.telemetry.autostart);
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
    fn should_prefer_namespaced_port_over_legacy_port() {
        let config = overridden(&[("PORT", "8080"), ("CLOTHESLINE_PORT", "9000")]);
        assert_eq!(config.server.port, 9000);

        let config = overridden(&[("PORT", "8080")]);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn should_split_bind_override() {
        let config = overridden(&[("CLOTHESLINE_BIND", "127.0.0.1:4000")]);
        assert_eq!(config.bind_addr(), "127.0.0.1:4000");
    }

    #[test]
    fn should_override_interval_from_legacy_variable() {
        let config = overridden(&[("INTERVAL_MS", "250")]);
        assert_eq!(config.telemetry_interval(), Duration::from_millis(250));
    }

    #[test]
    fn should_ignore_unparsable_overrides() {
        let config = overridden(&[
            ("CLOTHESLINE_PORT", "many"),
            ("INTERVAL_MS", "-3"),
            ("CLOTHESLINE_AUTOMATION", "maybe"),
        ]);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.interval_ms, 3_000);
        assert!(config.automation.enabled);
    }

    #[test]
    fn should_read_boolean_flags() {
        let config = overridden(&[
            ("CLOTHESLINE_AUTOMATION", "off"),
            ("CLOTHESLINE_AUTOSTART", "FALSE"),
        ]);
        assert!(!config.automation.enabled);
        assert!(!config.telemetry.autostart);
    }

    #[test]
    fn should_let_rust_log_win_over_namespaced_filter() {
        let config = overridden(&[("CLOTHESLINE_LOG", "warn"), ("RUST_LOG", "trace")]);
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_interval_and_travel() {
        let mut config = Config::default();
        config.telemetry.interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.motor.travel_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_bad_store_roots() {
        for root in ["clothesline", "/", ""] {
            let mut config = Config::default();
            config.store.root = root.to_string();
            assert!(config.validate().is_err(), "{root:?} accepted");
        }
    }
}
