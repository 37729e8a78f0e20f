//! Endpoint checks against a real DUT.
//!
//! Each test acquires the console independently; the serial port is
//! exclusive, so run them with `--test-threads=1`.

use super::utils::{dut_address, hardware_config, runner};
use dut_probe::{Endpoint, FirmwareProfile};

#[test]
#[ignore]
fn test_http_server_available() {
    let Some(config) = hardware_config() else { return };
    let address = dut_address(&config);

    let response = runner(&config)
        .probe(&address, Endpoint::Root)
        .expect("root page");
    println!("{} served {} bytes", address, response.body.len());
    assert!(response.body.contains("ESP32 Web Server"));
}

#[test]
#[ignore]
fn test_status_endpoint() {
    let Some(config) = hardware_config() else { return };
    let address = dut_address(&config);

    let data = runner(&config)
        .probe(&address, Endpoint::Status)
        .expect("status endpoint")
        .json()
        .expect("status JSON");
    println!("status: {data}");
}

#[test]
#[ignore]
fn test_info_endpoint() {
    let Some(config) = hardware_config() else { return };
    let address = dut_address(&config);

    runner(&config)
        .probe(&address, Endpoint::Info)
        .expect("info endpoint");
}

#[test]
#[ignore]
fn test_led_endpoints() {
    let Some(config) = hardware_config() else { return };
    if config.probe.profile != FirmwareProfile::Led {
        println!("Skipping LED test: profile is {}", config.probe.profile);
        return;
    }
    let address = dut_address(&config);
    let runner = runner(&config);

    for endpoint in [Endpoint::LedOn, Endpoint::LedOff, Endpoint::LedToggle] {
        runner
            .probe(&address, endpoint)
            .unwrap_or_else(|e| panic!("{endpoint}: {e}"));
    }
}

#[test]
#[ignore]
fn test_endpoints_are_repeatable() {
    let Some(config) = hardware_config() else { return };
    let address = dut_address(&config);
    let runner = runner(&config);

    for &endpoint in [Endpoint::Root, Endpoint::Status, Endpoint::Info].iter() {
        runner
            .probe_repeated(&address, endpoint, 2)
            .unwrap_or_else(|e| panic!("{endpoint}: {e}"));
    }
}
