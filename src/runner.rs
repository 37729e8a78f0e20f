//! Request/assert sequences against a DUT whose address is known.

use crate::address::DutAddress;
use crate::endpoint::{Endpoint, FirmwareProfile};
use crate::error::{ProbeError, ProbeResult};
use crate::http::{DutClient, ProbeResponse};
use crate::report::{ProbeOutcome, ProbeReport};
use std::time::Instant;
use tracing::{info, warn};

const EXPECTED_STATUS: u16 = 200;

#[derive(Debug, Clone)]
pub struct ProbeRunner {
    client: DutClient,
    profile: FirmwareProfile,
}

impl ProbeRunner {
    pub fn new(client: DutClient, profile: FirmwareProfile) -> Self {
        Self { client, profile }
    }

    pub fn profile(&self) -> FirmwareProfile {
        self.profile
    }

    /// GET the endpoint once and assert status and body.
    pub fn probe(&self, address: &DutAddress, endpoint: Endpoint) -> ProbeResult<ProbeResponse> {
        let response = self.client.get(&self.client.url(address, endpoint.path()))?;
        self.verify(endpoint, &response)?;
        Ok(response)
    }

    /// Probe `times` times in succession; every attempt must pass.
    ///
    /// Returns the last response.
    pub fn probe_repeated(
        &self,
        address: &DutAddress,
        endpoint: Endpoint,
        times: u32,
    ) -> ProbeResult<ProbeResponse> {
        let mut last = self.probe(address, endpoint)?;
        for _ in 1..times {
            last = self.probe(address, endpoint)?;
        }
        Ok(last)
    }

    pub fn verify(&self, endpoint: Endpoint, response: &ProbeResponse) -> ProbeResult<()> {
        if response.status != EXPECTED_STATUS {
            return Err(ProbeError::UnexpectedStatus {
                url: response.url.clone(),
                expected: EXPECTED_STATUS,
                actual: response.status,
            });
        }
        endpoint.expectation(self.profile).check(response)
    }

    /// Probe each endpoint in order. A failing endpoint is recorded and the
    /// remaining endpoints still run.
    pub fn run_suite(
        &self,
        address: &DutAddress,
        endpoints: &[Endpoint],
        repeat: u32,
    ) -> ProbeReport {
        let mut report = ProbeReport::new(*address, self.profile);
        let repeat = repeat.max(1);

        for &endpoint in endpoints {
            let outcome = self.run_one(address, endpoint, repeat);
            if outcome.passed {
                info!(%endpoint, elapsed_ms = outcome.elapsed_ms, "endpoint passed");
            } else {
                warn!(
                    %endpoint,
                    kind = outcome.error_kind.unwrap_or_default(),
                    error = outcome.error.as_deref().unwrap_or_default(),
                    "endpoint failed"
                );
            }
            report.outcomes.push(outcome);
        }

        report
    }

    fn run_one(&self, address: &DutAddress, endpoint: Endpoint, repeat: u32) -> ProbeOutcome {
        let url = self.client.url(address, endpoint.path());
        let started = Instant::now();
        let mut attempts = 0;
        let mut status = None;
        let mut failure = None;

        while attempts < repeat {
            attempts += 1;
            let result = self.client.get(&url).and_then(|response| {
                status = Some(response.status);
                self.verify(endpoint, &response)
            });
            if let Err(e) = result {
                status = status.or_else(|| e.status());
                failure = Some(e);
                break;
            }
        }

        ProbeOutcome {
            endpoint,
            url,
            attempts,
            status,
            passed: failure.is_none(),
            error_kind: failure.as_ref().map(ProbeError::kind),
            error: failure.map(|e| e.to_string()),
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }
}
