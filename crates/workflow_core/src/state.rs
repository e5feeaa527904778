use std::collections::BTreeMap;

use shared::{
    domain::{CheckKey, FileDescriptor, Stage, StageEntry},
    protocol::{Notice, WorkflowSnapshot},
};

use crate::{ledger::labels, selection::FileSelection};

/// Everything a session knows about its progress through the pipeline.
///
/// Only the sequencer, the selection manager and the ledger write to it;
/// everything outside the crate gets read access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowState {
    pub(crate) active_stage: Stage,
    pub(crate) stage_entries: [StageEntry; 5],
    pub(crate) selection: FileSelection,
    pub(crate) validation_phase_enabled: bool,
    pub(crate) validation_statuses: BTreeMap<CheckKey, String>,
    pub(crate) last_error: Option<String>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            active_stage: Stage::FIRST,
            stage_entries: Stage::ALL.map(|stage| StageEntry {
                stage,
                enabled: stage == Stage::FIRST,
                status: labels::AWAITING.to_string(),
            }),
            selection: FileSelection::default(),
            validation_phase_enabled: false,
            validation_statuses: CheckKey::ALL
                .into_iter()
                .map(|check| (check, labels::NOT_RUN.to_string()))
                .collect(),
            last_error: None,
        }
    }
}

impl WorkflowState {
    pub fn active_stage(&self) -> Stage {
        self.active_stage
    }

    pub fn entry(&self, stage: Stage) -> &StageEntry {
        &self.stage_entries[stage.index()]
    }

    pub(crate) fn entry_mut(&mut self, stage: Stage) -> &mut StageEntry {
        &mut self.stage_entries[stage.index()]
    }

    pub fn stage_entries(&self) -> &[StageEntry] {
        &self.stage_entries
    }

    pub fn is_enabled(&self, stage: Stage) -> bool {
        self.entry(stage).enabled
    }

    pub fn selection(&self) -> &FileSelection {
        &self.selection
    }

    pub(crate) fn selection_mut(&mut self) -> &mut FileSelection {
        &mut self.selection
    }

    pub fn current_files(&self) -> &[FileDescriptor] {
        self.selection.current_files()
    }

    pub fn validation_phase_enabled(&self) -> bool {
        self.validation_phase_enabled
    }

    pub fn validation_status(&self, check: CheckKey) -> &str {
        self.validation_statuses
            .get(&check)
            .map(String::as_str)
            .unwrap_or(labels::NOT_RUN)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn to_snapshot(&self, loading: bool, notice: Option<Notice>) -> WorkflowSnapshot {
        WorkflowSnapshot {
            active_stage: self.active_stage,
            stages: self.stage_entries.to_vec(),
            current_files: self.selection.current_files().to_vec(),
            selected_file_names: self.selection.selected_names().iter().cloned().collect(),
            validation_phase_enabled: self.validation_phase_enabled,
            validation_statuses: self.validation_statuses.clone(),
            last_error: self.last_error.clone(),
            loading,
            notice,
        }
    }
}
