//! Execution options: deadline and retry budget.
//!
//! `Options` is `Copy`. Endpoints hold a default value and every draft takes
//! its own copy at creation, so later changes to an endpoint never reach
//! drafts that already exist.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fixed pause between GET retries.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Deadline per attempt in milliseconds. Zero disables the deadline.
    pub timeout_ms: u64,
    /// Additional attempts allowed for a GET after a transport failure.
    pub retries: u32,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sub-millisecond deadlines round up to 1ms; `Duration::ZERO` disables
    /// the deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.timeout_ms = u64::try_from(millis).unwrap_or(u64::MAX);
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// The per-attempt deadline, or `None` when calls run unbounded.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}
