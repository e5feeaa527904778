use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use pipeline_integration::{
    FileLister, FolderFileLister, FolderStageExecutor, HttpCollaborator, StageExecutor,
};
use server_api::ApiContext;
use shared::{
    domain::SessionId,
    error::{ApiError, ErrorCode},
    protocol::{SessionCreated, SwitchStageRequest, ToggleFileRequest, WorkflowSnapshot},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod config;

use config::{load_settings, prepare_data_root, Settings};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|error| {
        eprintln!("invalid log filter '{}': {error}", settings.log_filter);
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (lister, executor) = build_collaborators(&settings).await?;
    let app = build_router(Arc::new(AppState {
        api: ApiContext::new(lister, executor),
    }));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_collaborators(
    settings: &Settings,
) -> anyhow::Result<(Arc<dyn FileLister>, Arc<dyn StageExecutor>)> {
    if let Some(url) = &settings.executor_url {
        let remote = Arc::new(HttpCollaborator::new(url)?);
        info!(executor_url = %url, "using remote pipeline backend");
        return Ok((remote.clone(), remote));
    }

    let root = prepare_data_root(&settings.data_root).await?;
    info!(data_root = %root.display(), "using local stage folders");
    Ok((
        Arc::new(FolderFileLister::new(root.clone())),
        Arc::new(FolderStageExecutor::new(root)),
    ))
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/sessions", post(http_create_session))
        .route(
            "/sessions/:session_id",
            get(http_get_snapshot).delete(http_delete_session),
        )
        .route("/sessions/:session_id/stage", post(http_switch_stage))
        .route("/sessions/:session_id/files/list", post(http_list_files))
        .route("/sessions/:session_id/files/toggle", post(http_toggle_file))
        .route(
            "/sessions/:session_id/files/toggle_all",
            post(http_toggle_select_all),
        )
        .route("/sessions/:session_id/process", post(http_process))
        .route(
            "/sessions/:session_id/validations/:check",
            post(http_run_validation),
        )
        .route("/sessions/:session_id/consolidate", post(http_consolidate))
        .route("/sessions/:session_id/reset", post(http_reset))
        .with_state(state)
}

fn error_response(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Conflict => StatusCode::CONFLICT,
    };
    debug!(code = ?err.code, message = %err.message, "request rejected");
    (status, Json(err))
}

fn respond(result: Result<WorkflowSnapshot, ApiError>) -> ApiResult<WorkflowSnapshot> {
    result.map(Json).map_err(error_response)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_create_session(State(state): State<Arc<AppState>>) -> Json<SessionCreated> {
    Json(server_api::create_session(&state.api).await)
}

async fn http_get_snapshot(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<WorkflowSnapshot> {
    respond(server_api::get_snapshot(&state.api, SessionId(session_id)).await)
}

async fn http_delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    server_api::delete_session(&state.api, SessionId(session_id))
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn http_switch_stage(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SwitchStageRequest>,
) -> ApiResult<WorkflowSnapshot> {
    respond(server_api::switch_stage(&state.api, SessionId(session_id), &req.stage).await)
}

async fn http_list_files(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<WorkflowSnapshot> {
    respond(server_api::request_file_listing(&state.api, SessionId(session_id)).await)
}

async fn http_toggle_file(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<ToggleFileRequest>,
) -> ApiResult<WorkflowSnapshot> {
    respond(server_api::toggle_file(&state.api, SessionId(session_id), &req.name).await)
}

async fn http_toggle_select_all(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<WorkflowSnapshot> {
    respond(server_api::toggle_select_all(&state.api, SessionId(session_id)).await)
}

async fn http_process(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<WorkflowSnapshot> {
    respond(server_api::submit_processing(&state.api, SessionId(session_id)).await)
}

async fn http_run_validation(
    State(state): State<Arc<AppState>>,
    Path((session_id, check)): Path<(Uuid, String)>,
) -> ApiResult<WorkflowSnapshot> {
    respond(server_api::run_validation(&state.api, SessionId(session_id), &check).await)
}

async fn http_consolidate(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<WorkflowSnapshot> {
    respond(server_api::run_consolidation(&state.api, SessionId(session_id)).await)
}

async fn http_reset(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<WorkflowSnapshot> {
    respond(server_api::reset_workflow(&state.api, SessionId(session_id)).await)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
