//! Configuration for a probe session.
//!
//! TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! 1. `DUT_PROBE_CONFIG` environment variable (explicit path)
//! 2. `./dut-probe.toml` (current directory)
//! 3. `dut-probe.toml` in the platform config directory
//! 4. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! The pattern is `DUT_PROBE_<SECTION>_<KEY>`:
//! - `DUT_PROBE_CONSOLE_PORT=/dev/ttyUSB0`
//! - `DUT_PROBE_PROBE_PROFILE=led`
//! - `DUT_PROBE_HTTP_TIMEOUT_MS=5000`
//!
//! `TEST_PORT`, `TEST_BAUD` and `TEST_TIMEOUT` are also read, so hardware
//! tests and the CLI share one set of variables.
//!
//! # Example
//!
//! ```rust,no_run
//! use dut_probe::config::ConfigLoader;
//!
//! let config = ConfigLoader::load()?.into_config();
//! println!("console: {:?} @ {}", config.console.port, config.console.baud);
//! # Ok::<(), dut_probe::config::ConfigError>(())
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    get_default_config_dir, get_default_config_path, resolve_config_path, ConfigLoader,
};
pub use schema::{Config, ConsoleConfig, HttpConfig, LogFormat, LoggingConfig, ProbeConfig};
