//! Tests against a real DUT running the web-server firmware.

pub mod utils;
pub mod web_server_tests;
