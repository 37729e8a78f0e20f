//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::{Config, LogFormat};
use crate::endpoint::{Endpoint, FirmwareProfile};
use clap::ValueEnum;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "DUT_PROBE";

/// Config file name
const CONFIG_FILE_NAME: &str = "dut-probe.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "DUT_PROBE_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `DUT_PROBE_CONFIG` environment variable (explicit path)
    /// 2. `./dut-probe.toml` (current directory)
    /// 3. `dut-probe.toml` in the platform config directory
    /// 4. Built-in defaults (no file required)
    ///
    /// Environment variables override file values; the result is validated.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();

        let mut config = match config_path {
            Some(ref path) => load_from_file(path)?,
            None => Config::default(),
        };

        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self { config_path, config })
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Defaults plus environment overrides, ignoring any config file.
    pub fn with_defaults() -> ConfigResult<Self> {
        let mut config = Config::default();
        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self {
            config_path: None,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(&self.config)?)
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    get_default_config_path().filter(|path| path.exists())
}

/// Platform config directory for this tool, e.g. `~/.config/dut-probe`.
pub fn get_default_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dut-probe").map(|dirs| dirs.config_dir().to_path_buf())
}

pub fn get_default_config_path() -> Option<PathBuf> {
    get_default_config_dir().map(|d| d.join(CONFIG_FILE_NAME))
}

fn load_from_file(path: &Path) -> ConfigResult<Config> {
    debug!(path = %path.display(), "loading configuration");
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigError::ParseError)
}

/// First set variable among `names`, with the name that supplied it.
fn env_value(names: &[&str]) -> Option<(String, String)> {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
}

fn env_parse<T: FromStr>(names: &[&str], what: &str) -> ConfigResult<Option<T>> {
    match env_value(names) {
        Some((var, val)) => val
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::env_parse(var, format!("Invalid {what}: '{val}'"))),
        None => Ok(None),
    }
}

fn env_flag(names: &[&str]) -> Option<bool> {
    env_value(names).map(|(_, val)| val.eq_ignore_ascii_case("true") || val == "1")
}

/// Apply environment variable overrides to the configuration.
///
/// Variables follow the pattern `DUT_PROBE_<SECTION>_<KEY>`, for example
/// `DUT_PROBE_CONSOLE_PORT=/dev/ttyUSB0` or `DUT_PROBE_PROBE_PROFILE=led`.
/// The hardware-test variables `TEST_PORT`, `TEST_BAUD` and `TEST_TIMEOUT`
/// are honoured as fallbacks.
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    let console_port = format!("{ENV_PREFIX}_CONSOLE_PORT");
    let console_baud = format!("{ENV_PREFIX}_CONSOLE_BAUD");
    let console_timeout = format!("{ENV_PREFIX}_CONSOLE_TIMEOUT_MS");
    let console_poll = format!("{ENV_PREFIX}_CONSOLE_POLL_INTERVAL_MS");
    let console_reset = format!("{ENV_PREFIX}_CONSOLE_RESET_ON_OPEN");
    let console_clear = format!("{ENV_PREFIX}_CONSOLE_CLEAR_ON_OPEN");
    let http_port = format!("{ENV_PREFIX}_HTTP_PORT");
    let http_timeout = format!("{ENV_PREFIX}_HTTP_TIMEOUT_MS");
    let http_connect_timeout = format!("{ENV_PREFIX}_HTTP_CONNECT_TIMEOUT_MS");
    let probe_profile = format!("{ENV_PREFIX}_PROBE_PROFILE");
    let probe_repeat = format!("{ENV_PREFIX}_PROBE_REPEAT");
    let probe_endpoints = format!("{ENV_PREFIX}_PROBE_ENDPOINTS");
    let log_level = format!("{ENV_PREFIX}_LOGGING_LEVEL");
    let log_format = format!("{ENV_PREFIX}_LOGGING_FORMAT");

    if let Some((_, port)) = env_value(&[console_port.as_str(), "TEST_PORT"]) {
        config.console.port = Some(port);
    }
    if let Some(baud) = env_parse(&[console_baud.as_str(), "TEST_BAUD"], "baud rate")? {
        config.console.baud = baud;
    }
    if let Some(timeout) = env_parse(&[console_timeout.as_str(), "TEST_TIMEOUT"], "timeout")? {
        config.console.timeout_ms = timeout;
    }
    if let Some(poll) = env_parse(&[console_poll.as_str()], "poll interval")? {
        config.console.poll_interval_ms = poll;
    }
    if let Some(reset) = env_flag(&[console_reset.as_str()]) {
        config.console.reset_on_open = reset;
    }
    if let Some(clear) = env_flag(&[console_clear.as_str()]) {
        config.console.clear_on_open = clear;
    }
    if let Some(port) = env_parse(&[http_port.as_str()], "port number")? {
        config.http.port = port;
    }
    if let Some(timeout) = env_parse(&[http_timeout.as_str()], "timeout")? {
        config.http.timeout_ms = timeout;
    }
    if let Some(timeout) = env_parse(&[http_connect_timeout.as_str()], "timeout")? {
        config.http.connect_timeout_ms = timeout;
    }
    if let Some(repeat) = env_parse(&[probe_repeat.as_str()], "repeat count")? {
        config.probe.repeat = repeat;
    }

    if let Some((var, val)) = env_value(&[probe_profile.as_str()]) {
        config.probe.profile = <FirmwareProfile as ValueEnum>::from_str(val.trim(), true)
            .map_err(|_| ConfigError::env_parse(var, format!("Unknown profile: '{val}'")))?;
    }
    // Comma-separated, e.g. `status,info`; empty selects the whole profile.
    if let Some((var, val)) = env_value(&[probe_endpoints.as_str()]) {
        config.probe.endpoints = val
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                <Endpoint as ValueEnum>::from_str(name, true).map_err(|_| {
                    ConfigError::env_parse(var.as_str(), format!("Unknown endpoint: '{name}'"))
                })
            })
            .collect::<ConfigResult<_>>()?;
    }

    if let Some((_, level)) = env_value(&[log_level.as_str()]) {
        config.logging.level = level;
    }
    if let Some((var, val)) = env_value(&[log_format.as_str()]) {
        config.logging.format = match val.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            "compact" => LogFormat::Compact,
            _ => return Err(ConfigError::env_parse(var, format!("Unknown log format: '{val}'"))),
        };
    }

    Ok(())
}
