//! Tracelog: minimal trace recording for instrumented functions.
//!
//! Tracelog provides:
//! - A nested trace model: timed events relative to a start instant, with child
//!   traces embedded as events
//! - Two client bindings: one-shot HTTP submission and a persistent WebSocket
//!   channel with a single reconnect on failure
//! - A collector that authenticates submissions with a static bearer token and
//!   archives each trace as a pretty-printed JSON file

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Collector Binary (main.rs)                         │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Collector Layer (collector/)                       │  ← HTTP + WebSocket
//! │  - Bearer token auth                                │
//! │  - Channel registry                                 │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Client Layer  │   │ Storage Layer │   │ Infrastructure│
//! │ (client/)     │   │ (storage/)    │   │ (paths)       │
//! │ - HTTP submit │   │ - JSON files  │   │ - Data dir    │
//! │ - WS channel  │   │ - Record keys │   │ - Token file  │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain Layer (domain/)                             │
//! │  - Trace / Event model                              │
//! │  - Error types                                      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`domain`]: Trace model, acknowledgment, and error types
//! - [`storage`]: JSON file-per-trace archive
//! - [`infrastructure`]: Data directory layout
//! - [`collector`]: Authenticating HTTP/WebSocket collector
//! - [`client`]: Submission bindings for instrumented code
//! - [`observability`]: Logging setup
//!
//! # Configuration
//!
//! The collector reads an optional TOML file:
//!
//! ```toml
//! bind_addr = "0.0.0.0:8000"
//! data_dir = "~/.local/share/tracelog"
//! trace_level = "debug"
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use tracelog::{Trace, TraceClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TraceClient::new("http://localhost:8000", "token")?;
//!
//! let mut child = Trace::new("fetch_price");
//! child.record_event("cache_miss", None);
//!
//! let mut trace = Trace::new("compute_total");
//! trace.record_event("validated", None);
//! trace.attach_subtrace(child);
//!
//! client.submit(&trace).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod collector;
pub mod domain;
pub mod infrastructure;
pub mod storage;

pub mod observability;

pub use client::{TraceChannel, TraceClient};
pub use domain::{Acknowledgment, Event, EventKind, Result, SubmissionError, Trace, TracelogError};

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Collector configuration.
///
/// Every field has a default, so an empty file (or no file) is valid.
///
/// # Example
///
/// ```rust
/// use tracelog::Config;
///
/// let config = Config::from_toml("bind_addr = \"127.0.0.1:9000\"")?;
/// assert_eq!(config.bind_addr, "127.0.0.1:9000");
/// assert_eq!(config.data_dir, ".");
/// # Ok::<(), tracelog::TracelogError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Socket address the collector listens on. Default: `"0.0.0.0:8000"`
    pub bind_addr: String,

    /// Directory holding the token file and the `traces/` archive.
    ///
    /// A leading `~` is expanded. Default: `"."`
    pub data_dir: String,

    /// Log filter used when `RUST_LOG` is not set.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`, or any `EnvFilter`
    /// directive. Default: `"info"`
    pub trace_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            data_dir: ".".to_string(),
            trace_level: None,
        }
    }
}

impl Config {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid TOML or unknown keys.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = ?path, "loading configuration");
        let contents = std::fs::read_to_string(path).map_err(|e| {
            TracelogError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    /// The data directory with `~` expanded.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(infrastructure::expand_tilde(&self.data_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn all_fields_parse() {
        let config = Config::from_toml(
            r#"
            bind_addr = "127.0.0.1:8123"
            data_dir = "/var/lib/tracelog"
            trace_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8123");
        assert_eq!(config.data_dir(), PathBuf::from("/var/lib/tracelog"));
        assert_eq!(config.trace_level.as_deref(), Some("debug"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml("port = 8000").unwrap_err();
        assert!(matches!(err, TracelogError::Toml(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, TracelogError::Config(_)));
    }
}
