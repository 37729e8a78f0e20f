//! Configuration schema definitions.
//!
//! Every section carries `#[serde(default)]`, so a config file only needs the
//! keys it changes.

use super::error::{ConfigError, ConfigResult};
use crate::endpoint::{Endpoint, FirmwareProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// DUT serial console
    pub console: ConsoleConfig,
    /// HTTP probing
    pub http: HttpConfig,
    /// Which endpoints to probe and how
    pub probe: ProbeConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject values that would make a probe session meaningless.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.console.baud == 0 {
            return Err(ConfigError::validation("console.baud", "must be greater than zero"));
        }
        if self.console.timeout_ms == 0 {
            return Err(ConfigError::validation("console.timeout_ms", "must be greater than zero"));
        }
        let poll = self.console.poll_interval_ms;
        if poll == 0 || poll > self.console.timeout_ms {
            return Err(ConfigError::validation(
                "console.poll_interval_ms",
                "must be between 1 and console.timeout_ms",
            ));
        }
        if self.http.port == 0 {
            return Err(ConfigError::validation("http.port", "must be greater than zero"));
        }
        if self.http.timeout_ms == 0 {
            return Err(ConfigError::validation("http.timeout_ms", "must be greater than zero"));
        }
        if self.http.connect_timeout_ms == 0 {
            return Err(ConfigError::validation(
                "http.connect_timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.probe.repeat == 0 {
            return Err(ConfigError::validation("probe.repeat", "must be at least 1"));
        }
        Ok(())
    }
}

/// Serial console section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Console port name or alias
    pub port: Option<String>,
    pub baud: u32,
    /// How long to wait for each console marker, in milliseconds
    pub timeout_ms: u64,
    /// Granularity of each blocking read, in milliseconds
    pub poll_interval_ms: u64,
    /// Pulse DTR/RTS after opening so the DUT boots while we listen
    pub reset_on_open: bool,
    /// Discard console output buffered before the port was opened
    pub clear_on_open: bool,
    /// Port aliases for convenience
    #[serde(default)]
    pub port_aliases: HashMap<String, String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: 115_200,
            timeout_ms: 30_000,
            poll_interval_ms: 100,
            reset_on_open: false,
            clear_on_open: false,
            port_aliases: HashMap::new(),
        }
    }
}

impl ConsoleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Resolve a port name through aliases
    pub fn resolve_port(&self, name: &str) -> String {
        self.port_aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// The configured port, alias-resolved.
    pub fn port_name(&self) -> ConfigResult<String> {
        self.port
            .as_deref()
            .map(|name| self.resolve_port(name))
            .ok_or_else(|| ConfigError::MissingRequired("console.port".to_string()))
    }
}

/// HTTP section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Port the firmware's web server listens on
    pub port: u16,
    /// Whole-request timeout in milliseconds
    pub timeout_ms: u64,
    pub connect_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 80,
            timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Probe section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub profile: FirmwareProfile,
    /// Successive GETs per endpoint
    pub repeat: u32,
    /// Endpoints to probe; empty means every endpoint of the profile
    pub endpoints: Vec<Endpoint>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            profile: FirmwareProfile::Basic,
            repeat: 1,
            endpoints: Vec::new(),
        }
    }
}

impl ProbeConfig {
    pub fn selected_endpoints(&self) -> Vec<Endpoint> {
        if self.endpoints.is_empty() {
            self.profile.endpoints().to_vec()
        } else {
            self.endpoints.clone()
        }
    }
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// "trace", "debug", "info", "warn", "error"; `RUST_LOG` wins when set
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
    Compact,
}
