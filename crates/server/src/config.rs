use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub data_root: PathBuf,
    /// Remote backend base URL. Unset means the local stage folders are used.
    pub executor_url: Option<String>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            data_root: PathBuf::from("./data"),
            executor_url: None,
            log_filter: "info".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("server.toml").ok();
    resolve_settings(file.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then `server.toml`, then the environment. Later sources win.
pub fn resolve_settings(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
            if let Some(v) = file_cfg.get("bind_addr") {
                settings.bind_addr = v.clone();
            }
            if let Some(v) = file_cfg.get("data_root") {
                settings.data_root = PathBuf::from(v);
            }
            if let Some(v) = file_cfg.get("executor_url") {
                settings.executor_url = Some(v.clone());
            }
            if let Some(v) = file_cfg.get("log_filter") {
                settings.log_filter = v.clone();
            }
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }
    if let Some(v) = env("APP__DATA_ROOT") {
        settings.data_root = PathBuf::from(v);
    }
    if let Some(v) = env("APP__EXECUTOR_URL") {
        settings.executor_url = Some(v);
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings.executor_url = settings
        .executor_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());
    settings
}

/// Creates the data root and one folder per stage beneath it.
pub async fn prepare_data_root(raw: &Path) -> anyhow::Result<PathBuf> {
    let root = if raw.as_os_str().is_empty() {
        Settings::default().data_root
    } else {
        raw.to_path_buf()
    };
    fs::create_dir_all(&root)
        .with_context(|| format!("failed to create data root '{}'", root.display()))?;
    pipeline_integration::ensure_stage_folders(&root).await?;
    Ok(root)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
