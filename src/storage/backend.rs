//! Storage backend abstraction.
//!
//! This module defines the [`TraceStore`] trait that abstracts over the trace
//! archive. The collector only ever appends records; reading back is provided for
//! inspection and tests.

use crate::domain::error::Result;
use crate::domain::Trace;
use serde_json::Number;
use std::path::PathBuf;

/// Abstraction over the durable trace archive.
///
/// Implementations are shared across concurrent connection handlers, so they
/// must be `Send + Sync`. Writes for different keys are independent; writes for
/// the same key race and the outcome is backend-specific.
///
/// # Implementations
///
/// - [`JsonTraceStore`](crate::storage::JsonTraceStore): one pretty-printed JSON file per trace
pub trait TraceStore: Send + Sync {
    /// Persists a trace and returns where it was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the trace has no valid storage key or the write fails.
    fn persist(&self, trace: &Trace) -> Result<PathBuf>;

    /// Reads back a stored trace, `Ok(None)` if no record exists for the key.
    ///
    /// `time_start` must be the number as it appears on the wire, see
    /// [`StorageKey`](crate::storage::StorageKey).
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the record cannot be read or parsed.
    fn load(&self, function_name: &str, time_start: &Number) -> Result<Option<Trace>>;
}
