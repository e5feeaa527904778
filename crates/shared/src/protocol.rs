use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{CheckKey, FileDescriptor, SessionId, Stage, StageEntry};

/// Outcome for a single submitted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    pub name: String,
    pub succeeded: bool,
    pub message: String,
}

impl FileResult {
    pub fn ok(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            succeeded: true,
            message: message.into(),
        }
    }

    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            succeeded: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessReport {
    pub results: Vec<FileResult>,
}

impl ProcessReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded_count(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded).count()
    }

    /// An empty report is not a success: nothing was processed.
    pub fn all_succeeded(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|r| r.succeeded)
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileResult> {
        self.results.iter().filter(|r| !r.succeeded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl CheckReport {
    pub fn passed(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Informational outcomes that are neither errors nor state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    NoFilesFound { stage: Stage },
}

/// Read model handed to the presentation layer after every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    pub active_stage: Stage,
    pub stages: Vec<StageEntry>,
    pub current_files: Vec<FileDescriptor>,
    pub selected_file_names: Vec<String>,
    pub validation_phase_enabled: bool,
    pub validation_statuses: BTreeMap<CheckKey, String>,
    pub last_error: Option<String>,
    pub loading: bool,
    pub notice: Option<Notice>,
}

impl WorkflowSnapshot {
    pub fn entry(&self, stage: Stage) -> Option<&StageEntry> {
        self.stages.iter().find(|entry| entry.stage == stage)
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected_file_names.iter().any(|n| n == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: SessionId,
    pub snapshot: WorkflowSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchStageRequest {
    /// Parsed leniently on the server: `qpe`, `MUN-CODE` and `mun_code` all
    /// name a stage.
    pub stage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleFileRequest {
    pub name: String,
}
