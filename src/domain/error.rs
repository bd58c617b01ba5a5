//! Error types for the tracelog crate.
//!
//! This module defines the centralized error type [`TracelogError`] and a type alias
//! [`Result`] for convenient error handling throughout the crate. Client-side
//! submission failures have their own enum, [`SubmissionError`], because callers
//! usually want to branch on them (rejected vs. unreachable collector).
//! All errors are implemented using the `thiserror` crate.

use thiserror::Error;

/// The main error type for tracelog operations.
///
/// This enum consolidates all error conditions that can occur in the collector
/// and in the trace model, from storage operations to authentication failures.
/// Most variants wrapping external errors use `#[from]` for automatic conversion.
///
/// # Examples
///
/// ```
/// use tracelog::TracelogError;
///
/// fn check_token(ok: bool) -> Result<(), TracelogError> {
///     if ok {
///         Ok(())
///     } else {
///         Err(TracelogError::Unauthorized("Invalid authentication token".to_string()))
///     }
/// }
///
/// assert!(check_token(false).is_err());
/// ```
#[derive(Debug, Error)]
pub enum TracelogError {
    /// Storage operation failed.
    ///
    /// Occurs when a trace record cannot be written to or read from the
    /// archive. The string contains a description of what went wrong.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A trace tree could not be encoded or decoded as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file is not valid TOML.
    #[error("Configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Missing, malformed, or incorrect bearer token.
    ///
    /// Raised by the collector before any persistence happens.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The trace cannot be stored as submitted.
    ///
    /// Occurs when the body is not a trace tree or the function name is not
    /// usable as a grouping directory.
    #[error("Invalid trace: {0}")]
    InvalidTrace(String),

    /// A persistent-channel session broke while the collector was serving it.
    #[error("Channel error: {0}")]
    Channel(String),

    /// Submitting a trace to the collector failed.
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Failure to deliver a trace to the collector.
///
/// Surfaced to the instrumented code as a hard failure; this crate never
/// swallows tracing errors on the caller's behalf.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The collector answered but did not accept the trace.
    ///
    /// For the HTTP binding `status` is the HTTP status code; for the channel
    /// binding it is the WebSocket close code sent by the collector.
    #[error("Error submitting trace: {status} - {body}")]
    Rejected { status: u16, body: String },

    /// The collector could not be reached, or the connection broke mid-exchange.
    #[error("Error submitting trace: transport failure: {0}")]
    Transport(String),

    /// The exchange could not be carried out as a request/reply pair: the
    /// trace could not be encoded, the collector URL is unusable, or the reply
    /// is not an acknowledgment.
    #[error("Error submitting trace: {0}")]
    Protocol(String),
}

/// A specialized `Result` type for tracelog operations.
pub type Result<T> = std::result::Result<T, TracelogError>;
