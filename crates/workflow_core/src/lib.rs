//! Stage-gating workflow state machine and the controller that sequences
//! collaborator calls against it.

mod controller;
mod error;
pub mod gate;
pub mod ledger;
mod selection;
mod sequencer;
mod state;

pub use controller::WorkflowController;
pub use error::{GuardRejection, OperationKind};
pub use ledger::StatusKey;
pub use selection::{FileSelection, LoadOutcome};
pub use sequencer::Advance;
pub use state::WorkflowState;

pub use pipeline_integration::{FileLister, StageExecutor};
pub use shared::{
    domain::{CheckKey, FileDescriptor, Stage, StageEntry},
    protocol::{CheckReport, FileResult, Notice, ProcessReport, WorkflowSnapshot},
};
