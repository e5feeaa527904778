use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::SessionId,
    error::{ApiError, ApiException},
    protocol::{SessionCreated, SwitchStageRequest, ToggleFileRequest, WorkflowSnapshot},
};
use tracing::debug;

/// Thin HTTP client over the workflow server's session routes.
pub struct SessionClient {
    http: Client,
    server_url: String,
}

impl SessionClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        let server_url: String = server_url.into();
        Self {
            http: Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    fn session_url(&self, session_id: SessionId, path: &str) -> String {
        format!("{}/sessions/{session_id}{path}", self.server_url)
    }

    pub async fn create_session(&self) -> Result<SessionCreated> {
        let response = self
            .http
            .post(format!("{}/sessions", self.server_url))
            .send()
            .await
            .context("failed to reach workflow server")?;
        read_json(response).await
    }

    pub async fn snapshot(&self, session_id: SessionId) -> Result<WorkflowSnapshot> {
        let response = self
            .http
            .get(self.session_url(session_id, ""))
            .send()
            .await
            .context("failed to reach workflow server")?;
        read_json(response).await
    }

    pub async fn delete_session(&self, session_id: SessionId) -> Result<()> {
        let response = self
            .http
            .delete(self.session_url(session_id, ""))
            .send()
            .await
            .context("failed to reach workflow server")?;
        check_status(response).await?;
        Ok(())
    }

    pub async fn switch_stage(&self, session_id: SessionId, stage: &str) -> Result<WorkflowSnapshot> {
        let response = self
            .http
            .post(self.session_url(session_id, "/stage"))
            .json(&SwitchStageRequest {
                stage: stage.to_string(),
            })
            .send()
            .await
            .context("failed to reach workflow server")?;
        read_json(response).await
    }

    pub async fn toggle_file(&self, session_id: SessionId, name: &str) -> Result<WorkflowSnapshot> {
        let response = self
            .http
            .post(self.session_url(session_id, "/files/toggle"))
            .json(&ToggleFileRequest {
                name: name.to_string(),
            })
            .send()
            .await
            .context("failed to reach workflow server")?;
        read_json(response).await
    }

    pub async fn list_files(&self, session_id: SessionId) -> Result<WorkflowSnapshot> {
        self.command(session_id, "/files/list").await
    }

    pub async fn toggle_select_all(&self, session_id: SessionId) -> Result<WorkflowSnapshot> {
        self.command(session_id, "/files/toggle_all").await
    }

    pub async fn process(&self, session_id: SessionId) -> Result<WorkflowSnapshot> {
        self.command(session_id, "/process").await
    }

    pub async fn validate(&self, session_id: SessionId, check: &str) -> Result<WorkflowSnapshot> {
        self.command(session_id, &format!("/validations/{check}"))
            .await
    }

    pub async fn consolidate(&self, session_id: SessionId) -> Result<WorkflowSnapshot> {
        self.command(session_id, "/consolidate").await
    }

    pub async fn reset(&self, session_id: SessionId) -> Result<WorkflowSnapshot> {
        self.command(session_id, "/reset").await
    }

    /// Body-less POST returning the refreshed snapshot.
    async fn command(&self, session_id: SessionId, path: &str) -> Result<WorkflowSnapshot> {
        let url = self.session_url(session_id, path);
        debug!(%url, "sending command");
        let response = self
            .http
            .post(url)
            .send()
            .await
            .context("failed to reach workflow server")?;
        read_json(response).await
    }
}

/// Surfaces the server's `ApiError` body instead of a bare status code.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => Err(ApiException::from(api_error).into()),
        Err(_) => anyhow::bail!("server answered {status}: {body}"),
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    response
        .json()
        .await
        .context("server returned an unreadable body")
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
