//! Client bindings used by instrumented code to ship finished traces.
//!
//! - [`TraceClient`]: one authenticated HTTP request per trace, bearer token in
//!   the `Authorization` header
//! - [`TraceChannel`]: a long-lived WebSocket with lazy connect and a single
//!   reconnect on transport failure, token in the URL query
//!
//! Both return [`SubmissionError`](crate::SubmissionError) on failure and leave
//! it to the caller to decide whether a lost trace matters.

pub mod channel;
pub mod http;

pub use channel::TraceChannel;
pub use http::{TraceClient, DEFAULT_TIMEOUT};
