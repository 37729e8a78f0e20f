//! Per-endpoint outcomes of a probe run.

use crate::address::DutAddress;
use crate::endpoint::{Endpoint, FirmwareProfile};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct ProbeOutcome {
    pub endpoint: Endpoint,
    pub url: String,
    /// GET requests issued for this endpoint.
    pub attempts: u32,
    /// Last HTTP status seen, if any response arrived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub address: DutAddress,
    pub profile: FirmwareProfile,
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<ProbeOutcome>,
}

impl ProbeReport {
    pub fn new(address: DutAddress, profile: FirmwareProfile) -> Self {
        Self {
            address,
            profile,
            started_at: Utc::now(),
            outcomes: Vec::new(),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DUT {} ({} firmware)", self.address, self.profile)?;
        for outcome in &self.outcomes {
            let mark = if outcome.passed { "PASS" } else { "FAIL" };
            write!(f, "  {mark}  {:<11} {:>5}ms", outcome.endpoint, outcome.elapsed_ms)?;
            if let Some(error) = &outcome.error {
                write!(f, "  {error}")?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "{}/{} endpoints passed",
            self.passed_count(),
            self.outcomes.len()
        )
    }
}
