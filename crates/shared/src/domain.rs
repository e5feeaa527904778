use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// One step of the document pipeline. Declaration order is the only valid
/// progression path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    R189,
    Qpe,
    Spb,
    Nfserv,
    MunCode,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::R189,
        Stage::Qpe,
        Stage::Spb,
        Stage::Nfserv,
        Stage::MunCode,
    ];

    pub const FIRST: Stage = Stage::R189;

    pub fn index(self) -> usize {
        match self {
            Stage::R189 => 0,
            Stage::Qpe => 1,
            Stage::Spb => 2,
            Stage::Nfserv => 3,
            Stage::MunCode => 4,
        }
    }

    /// `None` for the final stage: completing it opens the validation phase.
    pub fn successor(self) -> Option<Stage> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::R189 => "R189",
            Stage::Qpe => "QPE",
            Stage::Spb => "SPB",
            Stage::Nfserv => "NFSERV",
            Stage::MunCode => "MUN_CODE",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stage '{0}'")]
pub struct UnknownStage(pub String);

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

/// Keys of the post-pipeline operations: five cross-stage checks plus the
/// consolidated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKey {
    MunCodeR189,
    R189,
    QpeR189,
    SpbR189,
    NfservR189,
    ConsolidateReports,
}

impl CheckKey {
    pub const ALL: [CheckKey; 6] = [
        CheckKey::MunCodeR189,
        CheckKey::R189,
        CheckKey::QpeR189,
        CheckKey::SpbR189,
        CheckKey::NfservR189,
        CheckKey::ConsolidateReports,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CheckKey::MunCodeR189 => "mun_code_r189",
            CheckKey::R189 => "r189",
            CheckKey::QpeR189 => "qpe_r189",
            CheckKey::SpbR189 => "spb_r189",
            CheckKey::NfservR189 => "nfserv_r189",
            CheckKey::ConsolidateReports => "consolidate_reports",
        }
    }

    pub fn is_consolidation(self) -> bool {
        self == CheckKey::ConsolidateReports
    }

    /// Stage inputs each operation reads.
    pub fn compared_stages(self) -> &'static [Stage] {
        match self {
            CheckKey::MunCodeR189 => &[Stage::R189, Stage::MunCode],
            CheckKey::R189 => &[Stage::R189],
            CheckKey::QpeR189 => &[Stage::Qpe, Stage::R189],
            CheckKey::SpbR189 => &[Stage::Spb, Stage::R189, Stage::Nfserv],
            CheckKey::NfservR189 => &[Stage::Nfserv, Stage::R189],
            CheckKey::ConsolidateReports => &Stage::ALL,
        }
    }
}

impl fmt::Display for CheckKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown validation check '{0}'")]
pub struct UnknownCheck(pub String);

impl FromStr for CheckKey {
    type Err = UnknownCheck;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| UnknownCheck(s.to_string()))
    }
}

/// A candidate input file as reported by a file lister.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(alias = "tamanho")]
    pub size_bytes: u64,
    #[serde(alias = "modificado")]
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEntry {
    pub stage: Stage,
    pub enabled: bool,
    pub status: String,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
