use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared::{
    domain::{CheckKey, FileDescriptor, Stage},
    protocol::{CheckReport, FileResult, ProcessReport},
};
use tracing::{debug, warn};
use url::Url;

use crate::{CollaboratorError, FileLister, StageExecutor};

#[derive(Debug, Deserialize)]
struct ListingResponse {
    #[serde(default = "default_true")]
    success: bool,
    #[serde(default, alias = "arquivos")]
    files: Vec<FileDescriptor>,
    #[serde(default)]
    detail: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
struct ProcessRequest<'a> {
    files: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ProcessResponse {
    #[serde(alias = "processados")]
    results: Vec<RemoteFileResult>,
}

#[derive(Debug, Deserialize)]
struct RemoteFileResult {
    #[serde(alias = "arquivo", alias = "name")]
    file: String,
    status: String,
    #[serde(default, alias = "mensagem")]
    message: String,
}

impl From<RemoteFileResult> for FileResult {
    fn from(value: RemoteFileResult) -> Self {
        let status = value.status.to_ascii_lowercase();
        let succeeded = status == "success" || status == "sucesso";
        let message = if value.message.is_empty() {
            value.status
        } else {
            value.message
        };
        FileResult {
            name: value.file,
            succeeded,
            message,
        }
    }
}

/// Talks to a remote processing backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCollaborator {
    http: Client,
    base_url: Url,
}

impl HttpCollaborator {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut raw = base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url =
            Url::parse(&raw).with_context(|| format!("invalid executor url '{base_url}'"))?;
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("failed to build endpoint '{path}'"))
    }

    async fn post_check(&self, path: &str) -> Result<CheckReport> {
        let url = self.endpoint(path)?;
        debug!(%url, "posting check request");
        let response = self
            .http
            .post(url)
            .send()
            .await
            .with_context(|| format!("request to '{path}' failed"))?;
        read_json(response).await
    }
}

fn validation_route(check: CheckKey) -> String {
    check.as_str().replace('_', "-")
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "remote backend returned an error status");
        return Err(CollaboratorError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        }
        .into());
    }
    response
        .json::<T>()
        .await
        .context("failed to decode remote backend response")
}

#[async_trait]
impl FileLister for HttpCollaborator {
    async fn list(&self, stage: Stage) -> Result<Vec<FileDescriptor>> {
        let url = self.endpoint(&format!("arquivos/{}", stage.as_str()))?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("file listing request failed")?;
        let body: ListingResponse = read_json(response).await?;
        if !body.success {
            return Err(CollaboratorError::Rejected(
                body.detail
                    .unwrap_or_else(|| "file listing failed".to_string()),
            )
            .into());
        }
        Ok(body.files)
    }
}

#[async_trait]
impl StageExecutor for HttpCollaborator {
    async fn process(&self, stage: Stage, files: &[String]) -> Result<ProcessReport> {
        let url = self.endpoint(&format!(
            "{}/process",
            stage.as_str().to_ascii_lowercase()
        ))?;
        let response = self
            .http
            .post(url)
            .json(&ProcessRequest { files })
            .send()
            .await
            .context("processing request failed")?;
        let body: ProcessResponse = read_json(response).await?;
        Ok(ProcessReport {
            results: body.results.into_iter().map(FileResult::from).collect(),
        })
    }

    async fn validate(&self, check: CheckKey) -> Result<CheckReport> {
        if check.is_consolidation() {
            return self.consolidate().await;
        }
        self.post_check(&format!("validations/{}", validation_route(check)))
            .await
    }

    async fn consolidate(&self) -> Result<CheckReport> {
        self.post_check("reports/consolidate").await
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
