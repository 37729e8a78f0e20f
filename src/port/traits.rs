//! Core traits for serial port abstraction.
//!
//! The console reader only ever talks to a [`SerialPortAdapter`], so real
//! hardware and the scripted [`super::MockSerialPort`] are interchangeable.

use super::error::PortError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Line settings for a DUT console. ESP-IDF consoles are always 8N1 without
/// flow control, so only the rate and read window are configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortConfiguration {
    /// Baud rate (bits per second).
    pub baud_rate: u32,

    /// Read timeout applied to each blocking read.
    pub timeout: Duration,
}

impl Default for PortConfiguration {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            timeout: Duration::from_millis(100),
        }
    }
}

/// Trait for reading a DUT console.
pub trait SerialPortAdapter: Send + std::fmt::Debug {
    /// Read bytes from the serial port into the provided buffer.
    ///
    /// Returns the number of bytes actually read. An empty read window is
    /// reported as an error for which [`PortError::is_idle`] is true.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Get the name/path of this serial port.
    fn name(&self) -> &str;

    /// Set the read timeout for this port.
    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError>;

    /// Discard any unread input.
    fn clear_buffers(&mut self) -> Result<(), PortError>;

    /// Reset the attached board through the DTR/RTS auto-reset circuit.
    ///
    /// Adapters without modem control lines treat this as a no-op.
    fn pulse_reset(&mut self) -> Result<(), PortError> {
        Ok(())
    }
}
