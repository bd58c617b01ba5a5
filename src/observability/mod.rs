//! Structured logging for the collector and clients.
//!
//! Log output goes through `tracing` with a `tracing-subscriber` formatter
//! writing to stderr.
//!
//! # Configuration
//!
//! The log filter is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` option in the collector configuration
//! 3. Default: `"info"`
//!
//! # Usage
//!
//! Initialize logging early in process startup:
//!
//! ```rust
//! use tracelog::observability::init_tracing;
//! use tracelog::Config;
//!
//! let config = Config::default();
//! init_tracing(&config);
//!
//! tracing::info!("collector starting");
//! ```
//!
//! # Modules
//!
//! - [`init`]: Subscriber setup

mod init;

pub use init::init_tracing;
