//! Storage keys for archived traces.
//!
//! A trace is archived at `<function_name>/<time_start>.json`. The function name
//! groups all invocations of one operation; the start timestamp names the record.
//! The record name is the timestamp exactly as it appears on the wire: an integer
//! `time_start` of `1718000000` names `1718000000.json`, a float `1718000000.5`
//! names `1718000000.5.json`. Two traces of the same function with the same
//! start timestamp share a key and the later write replaces the earlier one.

use crate::domain::error::{Result, TracelogError};
use crate::domain::Trace;
use serde_json::Number;
use std::path::PathBuf;

/// Location of one trace record inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey {
    group: String,
    record: String,
}

impl StorageKey {
    /// Derives the key for a trace.
    ///
    /// # Errors
    ///
    /// Returns [`TracelogError::InvalidTrace`] if the function name cannot be
    /// used as a single directory name.
    pub fn for_trace(trace: &Trace) -> Result<Self> {
        Self::new(trace.function_name(), trace.time_start_number())
    }

    /// Builds a key from its parts.
    ///
    /// # Errors
    ///
    /// See [`StorageKey::for_trace`].
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::Number;
    /// use tracelog::storage::StorageKey;
    ///
    /// let key = StorageKey::new("compute_total", &Number::from(1718000000))?;
    /// assert_eq!(key.record(), "1718000000.json");
    ///
    /// assert!(StorageKey::new("../escape", &Number::from(1)).is_err());
    /// # Ok::<(), tracelog::TracelogError>(())
    /// ```
    pub fn new(function_name: &str, time_start: &Number) -> Result<Self> {
        validate_group(function_name)?;

        Ok(Self {
            group: function_name.to_string(),
            record: format!("{time_start}.json"),
        })
    }

    /// Directory name shared by every trace of the same function.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// File name of this record within its group.
    #[must_use]
    pub fn record(&self) -> &str {
        &self.record
    }

    /// `<group>/<record>`, relative to the archive root.
    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.group).join(&self.record)
    }
}

fn validate_group(function_name: &str) -> Result<()> {
    let invalid = function_name.is_empty()
        || function_name == "."
        || function_name == ".."
        || function_name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(TracelogError::InvalidTrace(format!(
            "function_name {function_name:?} cannot be used as a storage group"
        )));
    }
    Ok(())
}
