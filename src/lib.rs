//! DUT probe library
//!
//! Attaches to the serial console of a device running the ESP32 web-server
//! firmware, waits for it to announce its IPv4 address, then validates the
//! firmware's HTTP endpoints.
//!
//! # Modules
//!
//! - `port`: serial port abstraction, hardware and mock implementations
//! - `console`: line reader that waits for markers and patterns
//! - `address`: extraction of the DUT address from console output
//! - `endpoint`: endpoint catalogue and body expectations per firmware profile
//! - `http`: blocking HTTP client
//! - `runner`: request/assert sequences and suite execution
//! - `report`: per-endpoint outcomes
//! - `config`: TOML configuration with environment overrides
//! - `error`: failure taxonomy
//!
//! # Example
//!
//! ```no_run
//! use dut_probe::{acquire_address, ConfigLoader, ConsoleReader, DutClient, ProbeRunner};
//!
//! let config = ConfigLoader::load()?.into_config();
//! let mut console = ConsoleReader::open(&config.console, None)?;
//! let address = acquire_address(&mut console, config.console.timeout())?;
//!
//! let runner = ProbeRunner::new(DutClient::new(&config.http)?, config.probe.profile);
//! let report = runner.run_suite(&address, &config.probe.selected_endpoints(), 1);
//! println!("{report}");
//! # Ok::<(), dut_probe::ProbeError>(())
//! ```

pub mod address;
pub mod config;
pub mod console;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod logging;
pub mod port;
pub mod report;
pub mod runner;

pub use address::{acquire_address, DutAddress, ADDRESS_PATTERN, START_MARKER};
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
pub use console::ConsoleReader;
pub use endpoint::{Endpoint, Expectation, FirmwareProfile};
pub use error::{ProbeError, ProbeResult};
pub use http::{DutClient, ProbeResponse};
pub use port::{MockSerialPort, PortConfiguration, PortError, SerialPortAdapter, SyncSerialPort};
pub use report::{ProbeOutcome, ProbeReport};
pub use runner::ProbeRunner;
