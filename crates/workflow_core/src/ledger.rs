//! Status recording for every asynchronous operation: pending, then success
//! or failure. Only stage processing feeds back into the sequencer.

use shared::domain::{CheckKey, Stage};
use tracing::{debug, warn};

use crate::{sequencer::Advance, state::WorkflowState};

pub mod labels {
    pub const AWAITING: &str = "awaiting processing";
    pub const PROCESSING: &str = "processing";
    pub const PROCESSING_FAILED: &str = "processing failed";
    pub const NOT_RUN: &str = "not run";
    pub const VALIDATING: &str = "validating";
    pub const CONSOLIDATING: &str = "consolidating";
    pub const CHECK_FAILED: &str = "failed";

    pub fn processed(succeeded: usize, total: usize) -> String {
        format!("processed {succeeded}/{total} files")
    }

    pub fn passed(message: &str) -> String {
        if message.is_empty() {
            "passed".to_string()
        } else {
            format!("passed: {message}")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKey {
    Stage(Stage),
    Check(CheckKey),
}

impl WorkflowState {
    fn set_status(&mut self, key: StatusKey, label: String) {
        match key {
            StatusKey::Stage(stage) => self.entry_mut(stage).status = label,
            StatusKey::Check(check) => {
                self.validation_statuses.insert(check, label);
            }
        }
    }

    /// Marks `key` pending. A new attempt supersedes the previous error.
    pub fn begin_operation(&mut self, key: StatusKey, label: impl Into<String>) {
        self.last_error = None;
        self.set_status(key, label.into());
    }

    /// Records success. Stage keys advance the sequence; check keys never do.
    pub fn complete_success(&mut self, key: StatusKey, label: impl Into<String>) -> Option<Advance> {
        self.set_status(key, label.into());
        match key {
            StatusKey::Stage(stage) => Some(self.advance_after_success(stage)),
            StatusKey::Check(_) => None,
        }
    }

    /// Records failure without advancing; the same stage or check can be
    /// retried.
    pub fn complete_failure(
        &mut self,
        key: StatusKey,
        label: impl Into<String>,
        error: impl Into<String>,
    ) {
        let error = error.into();
        warn!(?key, %error, "operation failed");
        self.set_status(key, label.into());
        self.last_error = Some(error);
    }

    /// Failure that has no status slot of its own, such as a listing error.
    pub fn record_error(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }

    /// Puts back a label displaced by an operation that was abandoned before
    /// it completed. `last_error` is left alone.
    pub(crate) fn restore_status(&mut self, key: StatusKey, label: String) {
        debug!(?key, %label, "restoring abandoned status");
        self.set_status(key, label);
    }

    pub(crate) fn clear_error(&mut self) {
        self.last_error = None;
    }
}

#[cfg(test)]
#[path = "tests/ledger_tests.rs"]
mod tests;
