//! Blocking HTTP client used to probe the DUT.

use crate::address::DutAddress;
use crate::config::HttpConfig;
use crate::error::{ProbeError, ProbeResult};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

/// A response as seen by the assertions: status plus full body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl ProbeResponse {
    /// Decode the body as JSON.
    pub fn json(&self) -> ProbeResult<serde_json::Value> {
        serde_json::from_str(&self.body).map_err(|source| ProbeError::DecodeError {
            url: self.url.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DutClient {
    client: Client,
    port: u16,
    timeout: Duration,
}

impl DutClient {
    pub fn new(config: &HttpConfig) -> ProbeResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(concat!("dut-probe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ProbeError::Client)?;

        Ok(Self {
            client,
            port: config.port,
            timeout: config.timeout(),
        })
    }

    /// URL of `path` on the DUT's web server.
    pub fn url(&self, address: &DutAddress, path: &str) -> String {
        address.url_on_port(self.port, path)
    }

    /// Issue a single GET. The status code is returned, not judged.
    pub fn get(&self, url: &str) -> ProbeResult<ProbeResponse> {
        debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| self.classify(url, e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.text().map_err(|e| self.classify(url, e))?;

        debug!(url, status, bytes = body.len(), "response received");
        Ok(ProbeResponse {
            url: url.to_string(),
            status,
            content_type,
            body,
        })
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> ProbeError {
        if err.is_timeout() {
            ProbeError::Timeout {
                what: format!("GET {url}"),
                waited: self.timeout,
            }
        } else {
            ProbeError::ConnectionFailure {
                url: url.to_string(),
                source: err,
            }
        }
    }
}
