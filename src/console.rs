//! Line-oriented reader for the DUT console.
//!
//! `ConsoleReader` plays the role of a test fixture: it blocks until a line
//! containing a marker (or matching a pattern) shows up, consuming every line
//! up to and including the match. Lines are split on `\n`, a trailing `\r` is
//! dropped and bytes are decoded as lossy UTF-8.

use crate::config::ConsoleConfig;
use crate::error::{ProbeError, ProbeResult};
use crate::port::{PortConfiguration, SerialPortAdapter, SyncSerialPort};
use regex::Regex;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

const READ_CHUNK: usize = 1024;

pub struct ConsoleReader {
    port: Box<dyn SerialPortAdapter>,
    /// Bytes received after the last complete line.
    pending: Vec<u8>,
    transcript: Vec<String>,
    poll_interval: Duration,
}

impl ConsoleReader {
    pub fn new(port: Box<dyn SerialPortAdapter>, poll_interval: Duration) -> Self {
        Self {
            port,
            pending: Vec::new(),
            transcript: Vec::new(),
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }

    /// Open the configured hardware port and wrap it in a reader.
    ///
    /// `port_override` takes precedence over `console.port`.
    pub fn open(config: &ConsoleConfig, port_override: Option<&str>) -> ProbeResult<Self> {
        let port_name = match port_override {
            Some(name) => config.resolve_port(name),
            None => config.port_name()?,
        };

        let port = SyncSerialPort::open(
            &port_name,
            PortConfiguration {
                baud_rate: config.baud,
                timeout: config.poll_interval(),
            },
        )?;

        Self::attach(Box::new(port), config)
    }

    /// Wrap an already open port, clearing and rebooting the DUT as
    /// `config` asks.
    pub fn attach(
        mut port: Box<dyn SerialPortAdapter>,
        config: &ConsoleConfig,
    ) -> ProbeResult<Self> {
        if config.clear_on_open {
            port.clear_buffers()?;
        }
        if config.reset_on_open {
            port.pulse_reset()?;
        }

        info!(port = port.name(), baud = config.baud, "attached to DUT console");
        Ok(Self::new(port, config.poll_interval()))
    }

    pub fn port_name(&self) -> &str {
        self.port.name()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Every complete line read so far, oldest first.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Block until a line containing `marker` arrives and return it.
    pub fn expect_line(&mut self, marker: &str, timeout: Duration) -> ProbeResult<String> {
        debug!(marker, ?timeout, "waiting for console marker");
        self.expect_map(timeout, |line| line.contains(marker).then(|| line.to_string()))?
            .ok_or_else(|| ProbeError::Timeout {
                what: format!("console marker '{marker}'"),
                waited: timeout,
            })
    }

    /// Block until a line matches `pattern` and return its capture groups,
    /// group 1 first. Groups that did not participate are returned empty.
    pub fn expect_pattern(
        &mut self,
        pattern: &Regex,
        timeout: Duration,
    ) -> ProbeResult<Vec<String>> {
        debug!(pattern = pattern.as_str(), ?timeout, "waiting for console pattern");
        self.expect_map(timeout, |line| {
            pattern.captures(line).map(|caps| {
                caps.iter()
                    .skip(1)
                    .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                    .collect()
            })
        })?
        .ok_or_else(|| ProbeError::PatternNotFound {
            pattern: pattern.as_str().to_string(),
            waited: timeout,
        })
    }

    /// Feed lines to `matcher` until it returns `Some` or `timeout` elapses.
    ///
    /// Returns `Ok(None)` on timeout. Port failures other than an empty read
    /// window abort immediately.
    pub fn expect_map<T, F>(&mut self, timeout: Duration, mut matcher: F) -> ProbeResult<Option<T>>
    where
        F: FnMut(&str) -> Option<T>,
    {
        let deadline = Instant::now() + timeout;

        loop {
            while let Some(line) = self.next_line() {
                if let Some(found) = matcher(&line) {
                    return Ok(Some(found));
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            self.fill(self.poll_interval.min(deadline - now))?;
        }
    }

    /// Read whatever arrives within `window` into the pending buffer.
    fn fill(&mut self, window: Duration) -> ProbeResult<()> {
        self.port.set_timeout(window)?;

        let mut buffer = [0u8; READ_CHUNK];
        match self.port.read_bytes(&mut buffer) {
            Ok(n) => {
                trace!(bytes = n, "console read");
                self.pending.extend_from_slice(&buffer[..n]);
                Ok(())
            }
            Err(e) if e.is_idle() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Pop the next complete line off the pending buffer.
    fn next_line(&mut self) -> Option<String> {
        let end = memchr::memchr(b'\n', &self.pending)?;
        let mut raw: Vec<u8> = self.pending.drain(..=end).collect();
        raw.pop();
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }

        let line = String::from_utf8_lossy(&raw).into_owned();
        trace!(line = %line, "console line");
        self.transcript.push(line.clone());
        Some(line)
    }
}

impl std::fmt::Debug for ConsoleReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleReader")
            .field("port", &self.port.name())
            .field("pending_bytes", &self.pending.len())
            .field("lines_read", &self.transcript.len())
            .finish()
    }
}
