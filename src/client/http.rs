//! Request/response client binding.
//!
//! Each submission is a single authenticated `POST`; there is no retry at this
//! layer. The underlying HTTP client keeps its connection pool across calls.

use crate::collector::SUBMIT_PATH;
use crate::domain::error::{Result, SubmissionError, TracelogError};
use crate::domain::{Acknowledgment, Trace};
use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

/// Transport timeout applied to every submission unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Submits finished traces to a collector over HTTP.
///
/// The bearer token is never exposed through an accessor or `Debug`.
///
/// # Examples
///
/// ```no_run
/// use tracelog::TraceClient;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = TraceClient::new("http://localhost:8000", "token")?;
///
/// let mut trace = client.new_trace("compute_total", None);
/// trace.record_event("validated", None);
///
/// let ack = client.submit(&trace).await?;
/// assert!(ack.is_success());
/// # Ok(())
/// # }
/// ```
pub struct TraceClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl TraceClient {
    /// Creates a client using [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, token, DEFAULT_TIMEOUT)
    }

    /// Creates a client with an explicit transport timeout.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn with_timeout(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TracelogError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Starts a new trace; equivalent to [`Trace::with_args`].
    #[must_use]
    pub fn new_trace(&self, function_name: &str, function_args: Option<Map<String, Value>>) -> Trace {
        Trace::with_args(function_name, function_args.unwrap_or_default())
    }

    /// Sends `trace` and returns the collector's acknowledgment.
    ///
    /// # Errors
    ///
    /// - [`SubmissionError::Rejected`] for any non-success status, with the response body
    /// - [`SubmissionError::Transport`] if the collector cannot be reached or times out
    /// - [`SubmissionError::Protocol`] if the trace cannot be encoded or the reply is not an acknowledgment
    pub async fn submit(&self, trace: &Trace) -> std::result::Result<Acknowledgment, SubmissionError> {
        let body = trace
            .to_json()
            .map_err(|e| SubmissionError::Protocol(format!("failed to encode trace: {e}")))?;

        let url = format!("{}{SUBMIT_PATH}", self.base_url);
        tracing::debug!(url = %url, function_name = %trace.function_name(), "submitting trace");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            tracing::warn!(status = status.as_u16(), "collector rejected trace");
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Acknowledgment>()
            .await
            .map_err(|e| SubmissionError::Protocol(format!("invalid acknowledgment: {e}")))
    }
}

impl fmt::Debug for TraceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}
