//! Collector acknowledgment returned for every accepted trace.

use serde::{Deserialize, Serialize};

/// Status string the collector sends once a trace is persisted.
pub const STATUS_SUCCESS: &str = "success";

/// Reply body for an accepted submission: `{"status": "success"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgment {
    pub status: String,
}

impl Acknowledgment {
    #[must_use]
    pub fn success() -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}
