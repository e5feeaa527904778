use std::fmt;

use shared::domain::{CheckKey, Stage};
use thiserror::Error;

/// The collaborator call a session is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Listing(Stage),
    Processing(Stage),
    Check(CheckKey),
}

impl OperationKind {
    /// Listing and processing belong to the active stage and are superseded
    /// by any stage change.
    pub fn is_stage_scoped(self) -> bool {
        matches!(self, OperationKind::Listing(_) | OperationKind::Processing(_))
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Listing(stage) => write!(f, "file listing for {stage}"),
            OperationKind::Processing(stage) => write!(f, "processing of {stage}"),
            OperationKind::Check(check) if check.is_consolidation() => {
                f.write_str("report consolidation")
            }
            OperationKind::Check(check) => write!(f, "validation {check}"),
        }
    }
}

/// Command preconditions that were not met. State is left untouched and no
/// collaborator is called.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardRejection {
    #[error("select at least one file before processing")]
    EmptySelection,
    #[error("file '{0}' is not in the current listing")]
    UnknownFile(String),
    #[error("validation phase is locked until every stage has been processed")]
    ValidationPhaseLocked,
    #[error("{0} is still in progress")]
    Busy(OperationKind),
}
