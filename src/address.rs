//! Extraction of the DUT's IPv4 address from its console output.

use crate::console::ConsoleReader;
use crate::error::{ProbeError, ProbeResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Logged by the firmware once the HTTP server task is up.
pub const START_MARKER: &str = "Starting HTTP Server";

/// Logged by the firmware with the address it obtained.
pub static ADDRESS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Access the web server at http://(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})")
        .expect("address pattern is a valid regex")
});

/// Address of the DUT's web server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DutAddress(Ipv4Addr);

impl DutAddress {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self(ip)
    }

    /// Extract the address from a console line, if the line announces one.
    ///
    /// Captures whose octets overflow (`999.1.1.1`) are not addresses.
    pub fn from_line(line: &str) -> Option<Self> {
        let caps = ADDRESS_PATTERN.captures(line)?;
        caps.get(1)?.as_str().parse().ok().map(Self)
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.0
    }

    /// `http://<address><path>`; `path` is either empty or starts with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.0, path)
    }

    /// Like [`url`](Self::url), for a server on a non-default port.
    pub fn url_on_port(&self, port: u16, path: &str) -> String {
        match port {
            80 => self.url(path),
            _ => format!("http://{}:{}{}", self.0, port, path),
        }
    }
}

impl fmt::Display for DutAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DutAddress {
    type Err = std::net::AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl Serialize for DutAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

/// Console polls to keep listening after the marker when an address has
/// already been announced.
const ADDRESS_GRACE_POLLS: u32 = 10;

/// Wait for the server start marker, then for the address announcement.
///
/// Each step gets its own `timeout`. The firmware usually announces the
/// address before the start marker; when it has, an address following the
/// marker still wins but is only waited for during a short grace window
/// (`ADDRESS_GRACE_POLLS` poll intervals), then the most recent earlier
/// announcement is used.
pub fn acquire_address(console: &mut ConsoleReader, timeout: Duration) -> ProbeResult<DutAddress> {
    let marker_line = console.expect_line(START_MARKER, timeout)?;
    if let Some(address) = DutAddress::from_line(&marker_line) {
        info!(%address, port = console.port_name(), "DUT address acquired");
        return Ok(address);
    }

    let marker_index = console.transcript().len().saturating_sub(1);
    let earlier = console.transcript()[..marker_index]
        .iter()
        .rev()
        .find_map(|line| DutAddress::from_line(line));

    let window = match earlier {
        Some(_) => timeout.min(console.poll_interval() * ADDRESS_GRACE_POLLS),
        None => timeout,
    };
    if let Some(address) = console.expect_map(window, DutAddress::from_line)? {
        info!(%address, port = console.port_name(), "DUT address acquired");
        return Ok(address);
    }

    match earlier {
        Some(address) => {
            info!(
                %address,
                port = console.port_name(),
                "DUT address acquired before start marker"
            );
            Ok(address)
        }
        None => Err(ProbeError::PatternNotFound {
            pattern: ADDRESS_PATTERN.as_str().to_string(),
            waited: timeout,
        }),
    }
}
