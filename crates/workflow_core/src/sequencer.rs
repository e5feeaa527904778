use shared::domain::Stage;
use tracing::{debug, info};

use crate::state::WorkflowState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The successor was unlocked and made active.
    Moved(Stage),
    /// The final stage completed; the session is back on the first stage.
    ValidationPhaseOpened,
    /// The sequence had already moved on from the completed stage.
    Discarded,
}

impl WorkflowState {
    /// Makes `stage` active and drops the listing and selection, even when it
    /// already is the active stage. Returns `false` without touching anything
    /// when the stage is still locked.
    pub fn switch_to(&mut self, stage: Stage) -> bool {
        if !self.is_enabled(stage) {
            debug!(stage = %stage, "ignoring switch to a locked stage");
            return false;
        }
        self.active_stage = stage;
        self.selection.clear();
        self.last_error = None;
        true
    }

    /// Unlocks whatever follows `completed`. Unlocking is monotonic: stages
    /// stay enabled once reached, so every stage remains revisitable.
    pub fn advance_after_success(&mut self, completed: Stage) -> Advance {
        let already_advanced = match completed.successor() {
            Some(next) => self.is_enabled(next),
            None => self.validation_phase_enabled,
        };
        if already_advanced && self.active_stage != completed {
            debug!(
                completed = %completed,
                active = %self.active_stage,
                "discarding redundant advance"
            );
            return Advance::Discarded;
        }

        match completed.successor() {
            Some(next) => {
                self.entry_mut(next).enabled = true;
                self.switch_to(next);
                info!(completed = %completed, next = %next, "stage unlocked");
                Advance::Moved(next)
            }
            None => {
                self.validation_phase_enabled = true;
                self.switch_to(Stage::FIRST);
                info!(completed = %completed, "validation phase unlocked");
                Advance::ValidationPhaseOpened
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
        info!("workflow reset to defaults");
    }
}

#[cfg(test)]
#[path = "tests/sequencer_tests.rs"]
mod tests;
