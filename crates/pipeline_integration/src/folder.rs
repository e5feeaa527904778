use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    domain::{CheckKey, FileDescriptor, Stage},
    protocol::{CheckReport, FileResult, ProcessReport},
};
use tracing::{debug, info};

use crate::{CollaboratorError, FileLister, StageExecutor};

pub fn stage_dir(root: &Path, stage: Stage) -> PathBuf {
    root.join(stage.as_str())
}

pub async fn ensure_stage_folders(root: &Path) -> Result<()> {
    for stage in Stage::ALL {
        let dir = stage_dir(root, stage);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create stage folder '{}'", dir.display()))?;
    }
    Ok(())
}

async fn read_stage_folder(root: &Path, stage: Stage) -> Result<Vec<FileDescriptor>> {
    let dir = stage_dir(root, stage);
    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(CollaboratorError::StageFolderMissing {
                stage,
                path: dir.display().to_string(),
            }
            .into());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", dir.display()));
        }
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let metadata = entry
            .metadata()
            .await
            .with_context(|| format!("failed to stat '{name}'"))?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata
            .modified()
            .with_context(|| format!("no modification time for '{name}'"))?;
        files.push(FileDescriptor {
            name,
            size_bytes: metadata.len(),
            modified_at: DateTime::<Utc>::from(modified),
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

/// Lists `<root>/<STAGE>/`.
#[derive(Debug, Clone)]
pub struct FolderFileLister {
    root: PathBuf,
}

impl FolderFileLister {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FileLister for FolderFileLister {
    async fn list(&self, stage: Stage) -> Result<Vec<FileDescriptor>> {
        let files = read_stage_folder(&self.root, stage).await?;
        debug!(stage = %stage, count = files.len(), "listed stage folder");
        Ok(files)
    }
}

/// Checks inputs against the stage folders without computing any business
/// rule: processing confirms every selected file is present, checks confirm
/// every compared stage has input files.
#[derive(Debug, Clone)]
pub struct FolderStageExecutor {
    root: PathBuf,
}

impl FolderStageExecutor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn check_inputs(&self, check: CheckKey) -> Result<CheckReport> {
        let mut missing = Vec::new();
        let mut available = Vec::new();
        for &stage in check.compared_stages() {
            let count = match read_stage_folder(&self.root, stage).await {
                Ok(files) => files.len(),
                Err(err) if err.downcast_ref::<CollaboratorError>().is_some() => 0,
                Err(err) => return Err(err),
            };
            if count == 0 {
                missing.push(stage.as_str());
            } else {
                available.push(format!("{stage} ({count})"));
            }
        }

        let report = if missing.is_empty() {
            CheckReport::passed(format!("inputs available: {}", available.join(", ")))
        } else {
            CheckReport::failed(format!("missing input files for {}", missing.join(", ")))
        };
        info!(check = %check, success = report.success, "folder check finished");
        Ok(report)
    }
}

#[async_trait]
impl StageExecutor for FolderStageExecutor {
    async fn process(&self, stage: Stage, files: &[String]) -> Result<ProcessReport> {
        let dir = stage_dir(&self.root, stage);
        let exists = tokio::fs::try_exists(&dir)
            .await
            .with_context(|| format!("failed to inspect {}", dir.display()))?;
        if !exists {
            return Err(CollaboratorError::StageFolderMissing {
                stage,
                path: dir.display().to_string(),
            }
            .into());
        }

        let mut results = Vec::with_capacity(files.len());
        for name in files {
            if !is_plain_file_name(name) {
                results.push(FileResult::failed(name, "invalid file name"));
                continue;
            }
            let is_file = tokio::fs::metadata(dir.join(name))
                .await
                .map(|metadata| metadata.is_file())
                .unwrap_or(false);
            if is_file {
                results.push(FileResult::ok(name, "processed"));
            } else {
                results.push(FileResult::failed(name, "file not found"));
            }
        }
        let report = ProcessReport { results };
        info!(
            stage = %stage,
            succeeded = report.succeeded_count(),
            total = report.total(),
            "folder processing finished"
        );
        Ok(report)
    }

    async fn validate(&self, check: CheckKey) -> Result<CheckReport> {
        self.check_inputs(check).await
    }

    async fn consolidate(&self) -> Result<CheckReport> {
        self.check_inputs(CheckKey::ConsolidateReports).await
    }
}

#[cfg(test)]
#[path = "tests/folder_tests.rs"]
mod tests;
