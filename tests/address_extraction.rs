//! Property tests for address extraction from console lines.

mod common;

use dut_probe::{acquire_address, DutAddress};
use proptest::prelude::*;
use std::net::Ipv4Addr;
use std::time::Duration;

proptest! {
    #[test]
    fn announced_address_is_extracted_exactly(
        octets in any::<[u8; 4]>(),
        prefix in "[ -~]{0,24}",
        suffix in prop_oneof![
            Just(String::new()),
            Just("\x1b[0m".to_string()),
            Just(":80".to_string()),
            Just("/".to_string()),
            Just(" (AP mode)".to_string()),
        ],
    ) {
        let ip = Ipv4Addr::from(octets);
        let line = format!("{prefix}Access the web server at http://{ip}{suffix}");

        let address = DutAddress::from_line(&line).expect("line announces an address");
        prop_assert_eq!(address.ip(), ip);
        prop_assert_eq!(address.to_string(), ip.to_string());
    }

    #[test]
    fn lines_without_the_announcement_yield_nothing(line in "[a-zA-Z0-9 .:/]{0,64}") {
        prop_assume!(!line.contains("Access the web server at http://"));
        prop_assert!(DutAddress::from_line(&line).is_none());
    }
}

#[test]
fn boot_log_yields_announced_address() {
    let mut console = common::mock_console(&common::boot_log("192.168.1.50"));

    let address = acquire_address(&mut console, Duration::from_secs(2)).unwrap();
    assert_eq!(address.to_string(), "192.168.1.50");
    assert_eq!(address.url(""), "http://192.168.1.50");
}

#[test]
fn boot_log_is_kept_in_transcript() {
    let log = common::boot_log("10.0.0.7");
    let mut console = common::mock_console(&log);

    acquire_address(&mut console, Duration::from_secs(2)).unwrap();
    assert_eq!(console.transcript(), log.as_slice());
}
