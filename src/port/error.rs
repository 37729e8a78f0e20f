//! Port-specific error types.
//!
//! Kept apart from [`crate::error::ProbeError`] so the port layer has no
//! knowledge of HTTP probing.

use thiserror::Error;

/// Errors that can occur while talking to the DUT's serial port.
#[derive(Debug, Error)]
pub enum PortError {
    /// The specified serial port was not found on the system.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// An I/O error occurred during port operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Port configuration failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation timed out.
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn timeout(duration: std::time::Duration) -> Self {
        Self::Timeout(duration)
    }

    /// Whether this error only means "nothing arrived within the read window".
    ///
    /// Console readers treat these as an empty read and keep polling.
    pub fn is_idle(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;

    #[test]
    fn test_error_display() {
        let err = PortError::not_found("/dev/ttyUSB0");
        assert_eq!(err.to_string(), "Serial port not found: /dev/ttyUSB0");

        let err = PortError::config("Invalid baud rate");
        assert_eq!(err.to_string(), "Configuration error: Invalid baud rate");
    }

    #[test]
    fn test_idle_classification() {
        assert!(PortError::timeout(Duration::from_millis(100)).is_idle());
        assert!(PortError::Io(io::Error::new(io::ErrorKind::TimedOut, "t")).is_idle());
        assert!(PortError::Io(io::Error::new(io::ErrorKind::WouldBlock, "w")).is_idle());
        assert!(!PortError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "b")).is_idle());
        assert!(!PortError::not_found("COM9").is_idle());
    }
}
