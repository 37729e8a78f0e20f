//! Failure taxonomy for a probe session.
//!
//! Every failure is surfaced to the caller as-is; nothing here is retried.

use crate::config::ConfigError;
use crate::port::PortError;
use std::time::Duration;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type ProbeResult<T> = Result<T, ProbeError>;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// A console marker or an HTTP request did not complete in time.
    #[error("Timed out after {waited:?} waiting for {what}")]
    Timeout { what: String, waited: Duration },

    /// No console line matched the pattern within the read window.
    #[error("No console line matched /{pattern}/ within {waited:?}")]
    PatternNotFound { pattern: String, waited: Duration },

    /// The HTTP request never reached the DUT.
    #[error("Could not reach {url}: {source}")]
    ConnectionFailure {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {url} returned {actual}, expected {expected}")]
    UnexpectedStatus {
        url: String,
        expected: u16,
        actual: u16,
    },

    /// The body of a JSON endpoint was not valid JSON.
    #[error("Body of {url} is not valid JSON: {source}")]
    DecodeError {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A decoded JSON object lacks a required key.
    #[error("Response from {url} is missing key '{key}'")]
    MissingKey { url: String, key: String },

    /// None of the accepted substrings appear in the body.
    #[error("Response from {url} contains none of {expected:?}")]
    MissingSubstring { url: String, expected: Vec<String> },

    /// The HTTP client itself could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ProbeError {
    /// Stable name of the failure class, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "Timeout",
            Self::PatternNotFound { .. } => "PatternNotFound",
            Self::ConnectionFailure { .. } => "ConnectionFailure",
            Self::UnexpectedStatus { .. } => "UnexpectedStatus",
            Self::DecodeError { .. } => "DecodeError",
            Self::MissingKey { .. } | Self::MissingSubstring { .. } => "AssertionFailure",
            Self::Client(_) => "ClientError",
            Self::Port(_) => "PortError",
            Self::Config(_) => "ConfigError",
        }
    }

    /// HTTP status carried by the error, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { actual, .. } => Some(*actual),
            Self::DecodeError { .. } | Self::MissingKey { .. } | Self::MissingSubstring { .. } => {
                Some(200)
            }
            _ => None,
        }
    }
}
