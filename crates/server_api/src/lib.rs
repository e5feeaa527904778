use std::{collections::HashMap, sync::Arc};

use pipeline_integration::{FileLister, StageExecutor};
use shared::{
    domain::{CheckKey, SessionId, Stage},
    error::{ApiError, ErrorCode},
    protocol::{SessionCreated, WorkflowSnapshot},
};
use tokio::sync::RwLock;
use tracing::info;
use workflow_core::{GuardRejection, WorkflowController};

/// Registry of live workflow sessions. Every session shares the same
/// collaborators but owns its own state.
#[derive(Clone)]
pub struct ApiContext {
    sessions: Arc<RwLock<HashMap<SessionId, Arc<WorkflowController>>>>,
    lister: Arc<dyn FileLister>,
    executor: Arc<dyn StageExecutor>,
}

impl ApiContext {
    pub fn new(lister: Arc<dyn FileLister>, executor: Arc<dyn StageExecutor>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            lister,
            executor,
        }
    }

    async fn controller(&self, session_id: SessionId) -> Result<Arc<WorkflowController>, ApiError> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or_else(|| ApiError::new(ErrorCode::NotFound, format!("session {session_id} not found")))
    }
}

pub async fn create_session(ctx: &ApiContext) -> SessionCreated {
    let session_id = SessionId::new();
    let controller = Arc::new(WorkflowController::new(
        ctx.lister.clone(),
        ctx.executor.clone(),
    ));
    let snapshot = controller.snapshot().await;
    ctx.sessions.write().await.insert(session_id, controller);
    info!(session = %session_id, "session created");
    SessionCreated {
        session_id,
        snapshot,
    }
}

pub async fn get_snapshot(
    ctx: &ApiContext,
    session_id: SessionId,
) -> Result<WorkflowSnapshot, ApiError> {
    Ok(ctx.controller(session_id).await?.snapshot().await)
}

/// Operations still in flight for the session finish against a detached
/// controller and their results go nowhere.
pub async fn delete_session(ctx: &ApiContext, session_id: SessionId) -> Result<(), ApiError> {
    if ctx.sessions.write().await.remove(&session_id).is_none() {
        return Err(ApiError::new(
            ErrorCode::NotFound,
            format!("session {session_id} not found"),
        ));
    }
    info!(session = %session_id, "session deleted");
    Ok(())
}

pub async fn switch_stage(
    ctx: &ApiContext,
    session_id: SessionId,
    stage: &str,
) -> Result<WorkflowSnapshot, ApiError> {
    let stage: Stage = stage
        .parse()
        .map_err(|e| ApiError::new(ErrorCode::Validation, format!("{e}")))?;
    Ok(ctx.controller(session_id).await?.switch_stage(stage).await)
}

pub async fn request_file_listing(
    ctx: &ApiContext,
    session_id: SessionId,
) -> Result<WorkflowSnapshot, ApiError> {
    ctx.controller(session_id)
        .await?
        .request_file_listing()
        .await
        .map_err(rejected)
}

pub async fn toggle_file(
    ctx: &ApiContext,
    session_id: SessionId,
    name: &str,
) -> Result<WorkflowSnapshot, ApiError> {
    ctx.controller(session_id)
        .await?
        .toggle_file(name)
        .await
        .map_err(rejected)
}

pub async fn toggle_select_all(
    ctx: &ApiContext,
    session_id: SessionId,
) -> Result<WorkflowSnapshot, ApiError> {
    Ok(ctx.controller(session_id).await?.toggle_select_all().await)
}

pub async fn submit_processing(
    ctx: &ApiContext,
    session_id: SessionId,
) -> Result<WorkflowSnapshot, ApiError> {
    ctx.controller(session_id)
        .await?
        .submit_processing()
        .await
        .map_err(rejected)
}

pub async fn run_validation(
    ctx: &ApiContext,
    session_id: SessionId,
    check: &str,
) -> Result<WorkflowSnapshot, ApiError> {
    let check: CheckKey = check
        .parse()
        .map_err(|e| ApiError::new(ErrorCode::Validation, format!("{e}")))?;
    ctx.controller(session_id)
        .await?
        .run_validation(check)
        .await
        .map_err(rejected)
}

pub async fn run_consolidation(
    ctx: &ApiContext,
    session_id: SessionId,
) -> Result<WorkflowSnapshot, ApiError> {
    ctx.controller(session_id)
        .await?
        .run_consolidation()
        .await
        .map_err(rejected)
}

pub async fn reset_workflow(
    ctx: &ApiContext,
    session_id: SessionId,
) -> Result<WorkflowSnapshot, ApiError> {
    Ok(ctx.controller(session_id).await?.reset_workflow().await)
}

fn rejected(rejection: GuardRejection) -> ApiError {
    let code = match rejection {
        GuardRejection::Busy(_) => ErrorCode::Conflict,
        _ => ErrorCode::Validation,
    };
    ApiError::new(code, rejection.to_string())
}
