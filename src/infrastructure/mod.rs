//! Infrastructure layer for filesystem and environment interactions.
//!
//! This module resolves where the collector keeps its working state on disk.

pub mod paths;

pub use paths::{expand_tilde, token_path, traces_dir};
