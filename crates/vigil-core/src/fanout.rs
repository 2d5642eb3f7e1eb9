//! Structured results for mirror-write fan-outs.
//!
//! Alert trigger/clear and batch ping responses touch one record per
//! contact, sequentially. A failed mirror write never rolls back the
//! primary write or the other mirrors; instead every per-contact outcome
//! is reported here so callers can tell "fully succeeded" from "primary
//! succeeded, some mirrors stale".

use crate::error::StoreError;

/// One failed mirror write.
#[derive(Debug)]
pub struct FanOutFailure {
    pub contact_id: String,
    pub error: StoreError,
}

/// Per-contact outcome of a fan-out.
#[derive(Debug, Default)]
pub struct FanOutReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<FanOutFailure>,
}

impl FanOutReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    pub(crate) fn record(&mut self, contact_id: &str, result: Result<(), StoreError>) {
        match result {
            Ok(()) => self.succeeded.push(contact_id.to_string()),
            Err(error) => self.failed.push(FanOutFailure {
                contact_id: contact_id.to_string(),
                error,
            }),
        }
    }
}
