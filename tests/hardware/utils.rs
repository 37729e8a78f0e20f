//! Helpers for hardware tests.
//!
//! The DUT is selected through the same variables the CLI reads:
//!
//! ```bash
//! export TEST_PORT=/dev/ttyUSB0     # or COM3 on Windows
//! export TEST_BAUD=115200           # optional
//! export DUT_PROBE_PROBE_PROFILE=led  # when the LED firmware is flashed
//! ```
//!
//! Every test needs a fresh boot log, so the console is cleared and the DUT
//! rebooted through DTR/RTS on each open. Boards without an auto-reset circuit
//! can opt out with `DUT_PROBE_CONSOLE_RESET_ON_OPEN=false` and must be reset
//! by hand before each test.

use dut_probe::config::{Config, ConfigLoader};
use dut_probe::{acquire_address, ConsoleReader, DutAddress, DutClient, ProbeRunner};

const RESET_ENV: &str = "DUT_PROBE_CONSOLE_RESET_ON_OPEN";

/// Reset and clear on open unless `reset_override` explicitly disables the reset.
pub fn apply_hardware_defaults(config: &mut Config, reset_override: Option<&str>) {
    config.console.clear_on_open = true;
    config.console.reset_on_open = match reset_override {
        Some(val) => val.eq_ignore_ascii_case("true") || val == "1",
        None => true,
    };
}

/// Hardware configuration, or `None` (with a note) when no DUT is attached.
pub fn hardware_config() -> Option<Config> {
    let mut config = match ConfigLoader::load() {
        Ok(loader) => loader.into_config(),
        Err(e) => {
            println!("Skipping hardware test: configuration error: {e}");
            return None;
        }
    };
    if config.console.port.is_none() {
        println!("Skipping hardware test: TEST_PORT not set");
        return None;
    }
    apply_hardware_defaults(&mut config, std::env::var(RESET_ENV).ok().as_deref());
    Some(config)
}

/// Read the console until the DUT announces its address.
///
/// Every test re-derives the address itself, so tests can run in any order.
pub fn dut_address(config: &Config) -> DutAddress {
    let mut console = ConsoleReader::open(&config.console, None).expect("open DUT console");
    match acquire_address(&mut console, config.console.timeout()) {
        Ok(address) => address,
        Err(e) => {
            for line in console.transcript() {
                println!("console: {line}");
            }
            panic!("DUT did not announce its address: {e}");
        }
    }
}

pub fn runner(config: &Config) -> ProbeRunner {
    let client = DutClient::new(&config.http).expect("build HTTP client");
    ProbeRunner::new(client, config.probe.profile)
}

#[test]
fn hardware_console_reboots_dut_by_default() {
    let mut config = Config::default();
    apply_hardware_defaults(&mut config, None);
    assert!(config.console.reset_on_open);
    assert!(config.console.clear_on_open);

    apply_hardware_defaults(&mut config, Some("false"));
    assert!(!config.console.reset_on_open);
    assert!(config.console.clear_on_open);
}

#[test]
fn hardware_console_attach_reboots_dut() {
    use dut_probe::MockSerialPort;

    let mut config = Config::default();
    apply_hardware_defaults(&mut config, None);

    let port = MockSerialPort::with_lines("MOCK0", ["stale boot output"]);
    let handle = port.clone();
    ConsoleReader::attach(Box::new(port), &config.console).unwrap();

    assert!(handle.was_cleared());
    assert_eq!(handle.reset_count(), 1);
}
