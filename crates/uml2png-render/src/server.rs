//! Rendering service abstraction and the HTTP `PlantUML` client.

use std::time::Duration;

use ureq::Agent;

/// Output format segment of the server URL.
const PNG_FORMAT: &str = "png";

/// Failure to obtain an image for one diagram.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Server answered with anything other than 200.
    #[error("HTTP status {status}")]
    Status { status: u16 },
    /// Request never got a response (DNS, refused connection, timeout, TLS).
    #[error("connection error: {0}")]
    Connection(String),
    /// Response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// A service that renders encoded diagrams to PNG.
pub trait DiagramServer {
    /// URL of the PNG rendering of `token`.
    fn png_url(&self, token: &str) -> String;

    /// Fetch the PNG rendering of `token`.
    ///
    /// Returns the raw response body on HTTP 200.
    fn fetch_png(&self, token: &str) -> Result<Vec<u8>, FetchError>;
}

/// Create HTTP agent with the specified timeout.
///
/// Non-2xx statuses are returned as responses so the caller can report the
/// exact code.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// `PlantUML` server reached over HTTP(S).
///
/// Requests `GET <base_url>/png/<token>`.
pub struct PlantUmlServer {
    base_url: String,
    agent: Agent,
}

impl PlantUmlServer {
    /// Create a client for the server at `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Server root including its context path
    ///   (e.g., `https://www.plantuml.com/plantuml`)
    /// * `timeout` - Global timeout for each request
    #[must_use]
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            agent: create_agent(timeout),
        }
    }
}

impl DiagramServer for PlantUmlServer {
    fn png_url(&self, token: &str) -> String {
        format!("{}/{PNG_FORMAT}/{token}", self.base_url)
    }

    fn fetch_png(&self, token: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.png_url(token);
        tracing::debug!(url = %url, "Requesting diagram");

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| FetchError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(FetchError::Status { status });
        }

        response
            .into_body()
            .read_to_vec()
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}
