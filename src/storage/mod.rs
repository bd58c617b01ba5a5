//! Storage layer for the trace archive.
//!
//! Accepted traces are written once and never modified. Each trace becomes one
//! JSON file grouped by function name.
//!
//! # Modules
//!
//! - `backend`: Storage trait abstraction for backend implementations
//! - `json`: JSON file-per-trace implementation
//! - `key`: Mapping from a trace to its location in the archive

pub mod backend;
pub mod json;
pub mod key;

pub use backend::TraceStore;
pub use json::JsonTraceStore;
pub use key::StorageKey;
