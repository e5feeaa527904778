//! Collaborator contracts consumed by the workflow core, plus the two
//! implementations the server can be configured with.

use async_trait::async_trait;
use shared::{
    domain::{CheckKey, FileDescriptor, Stage},
    protocol::{CheckReport, ProcessReport},
};
use thiserror::Error;

mod folder;
mod http;

pub use folder::{ensure_stage_folders, stage_dir, FolderFileLister, FolderStageExecutor};
pub use http::HttpCollaborator;

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("stage folder for {stage} not found at {path}")]
    StageFolderMissing { stage: Stage, path: String },
    #[error("remote backend answered {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("remote backend rejected the request: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait FileLister: Send + Sync {
    /// Candidate input files for `stage`. An empty listing is a valid answer.
    async fn list(&self, stage: Stage) -> anyhow::Result<Vec<FileDescriptor>>;
}

#[async_trait]
pub trait StageExecutor: Send + Sync {
    /// Never called with an empty `files` slice.
    async fn process(&self, stage: Stage, files: &[String]) -> anyhow::Result<ProcessReport>;
    async fn validate(&self, check: CheckKey) -> anyhow::Result<CheckReport>;
    async fn consolidate(&self) -> anyhow::Result<CheckReport>;
}
