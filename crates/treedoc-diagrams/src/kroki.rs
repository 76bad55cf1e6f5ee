//! Kroki-backed rasterizer.
//!
//! Sends the diagram source to `<kroki_url>/plantuml/<format>` with a plain
//! text POST and returns the response body.

use std::time::Duration;

use ureq::Agent;

use crate::consts::DEFAULT_TIMEOUT;
use crate::error::DiagramError;
use crate::rasterizer::{DiagramJob, Rasterizer};

/// Kroki diagram endpoint for `PlantUML` sources.
const ENDPOINT: &str = "plantuml";

/// Rasterizer using a Kroki server over HTTP.
///
/// The HTTP agent is reused across calls for connection pooling.
pub struct KrokiRasterizer {
    server_url: String,
    agent: Agent,
}

impl KrokiRasterizer {
    /// Create a rasterizer for the given Kroki server URL.
    #[must_use]
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into().trim_end_matches('/').to_owned(),
            agent: create_agent(DEFAULT_TIMEOUT),
        }
    }

    /// Set the HTTP timeout (default: 30 seconds).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    /// Endpoint URL for a job.
    fn endpoint_url(&self, job: &DiagramJob<'_>) -> String {
        format!("{}/{ENDPOINT}/{}", self.server_url, job.format)
    }
}

/// Create HTTP agent with the specified timeout.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

impl Rasterizer for KrokiRasterizer {
    fn rasterize(&self, job: &DiagramJob<'_>) -> Result<Vec<u8>, DiagramError> {
        let url = self.endpoint_url(job);
        let http_error = |message: String| DiagramError::Http {
            name: job.name.to_owned(),
            message,
        };

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "text/plain")
            .send(job.source.as_bytes())
            .map_err(|e| http_error(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(http_error(format!("HTTP {status}: {error_body}")));
        }

        let data = body.read_to_vec().map_err(|e| http_error(e.to_string()))?;
        if data.is_empty() {
            return Err(DiagramError::EmptyOutput {
                name: job.name.to_owned(),
            });
        }
        tracing::debug!(url = %url, bytes = data.len(), "Diagram rendered via Kroki");
        Ok(data)
    }
}
