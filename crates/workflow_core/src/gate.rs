//! Read-only view over whether post-pipeline checks may run.

use crate::{error::GuardRejection, state::WorkflowState};

pub fn is_open(state: &WorkflowState) -> bool {
    state.validation_phase_enabled()
}

pub fn ensure_open(state: &WorkflowState) -> Result<(), GuardRejection> {
    if is_open(state) {
        Ok(())
    } else {
        Err(GuardRejection::ValidationPhaseLocked)
    }
}
