//! Domain layer for tracelog.
//!
//! This module contains the trace data model shared by the instrumentation
//! clients and the collector, independent of any transport or storage concern.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`trace`]: Trace and event model, serialization, and rendering
//! - [`ack`]: Collector acknowledgment body
//!
//! # Examples
//!
//! ```
//! use tracelog::domain::{Result, Trace};
//!
//! fn traced_work() -> Result<String> {
//!     let mut trace = Trace::new("traced_work");
//!     trace.record_event("loaded", None);
//!     trace.to_json()
//! }
//!
//! assert!(traced_work().is_ok());
//! ```

pub mod ack;
pub mod error;
pub mod trace;

pub use ack::Acknowledgment;
pub use error::{Result, SubmissionError, TracelogError};
pub use trace::{Event, EventKind, Trace};
