use super::*;

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use shared::{domain::Stage, error::ErrorCode};
use tokio::net::TcpListener;

fn snapshot_on(stage: Stage) -> WorkflowSnapshot {
    WorkflowSnapshot {
        active_stage: stage,
        stages: Vec::new(),
        current_files: Vec::new(),
        selected_file_names: Vec::new(),
        validation_phase_enabled: false,
        validation_statuses: BTreeMap::new(),
        last_error: None,
        loading: false,
        notice: None,
    }
}

type Seen = Arc<Mutex<Vec<String>>>;

async fn spawn_server() -> (String, Seen) {
    async fn create() -> Json<SessionCreated> {
        Json(SessionCreated {
            session_id: SessionId::new(),
            snapshot: snapshot_on(Stage::R189),
        })
    }

    async fn switch(
        State(seen): State<Seen>,
        Path(id): Path<String>,
        Json(req): Json<SwitchStageRequest>,
    ) -> Json<WorkflowSnapshot> {
        if let Ok(mut seen) = seen.lock() {
            seen.push(format!("{id}:{}", req.stage));
        }
        Json(snapshot_on(Stage::Qpe))
    }

    async fn process() -> (StatusCode, Json<ApiError>) {
        (
            StatusCode::CONFLICT,
            Json(ApiError::new(
                ErrorCode::Conflict,
                "an operation is already in flight: processing QPE",
            )),
        )
    }

    async fn reset() -> (StatusCode, &'static str) {
        (StatusCode::BAD_GATEWAY, "upstream down")
    }

    async fn remove() -> StatusCode {
        StatusCode::NO_CONTENT
    }

    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/sessions", post(create))
        .route("/sessions/:id", delete(remove))
        .route("/sessions/:id/stage", post(switch))
        .route("/sessions/:id/process", post(process))
        .route("/sessions/:id/reset", post(reset))
        .with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/"), seen)
}

#[tokio::test]
async fn creates_session_and_switches_stage() {
    let (url, seen) = spawn_server().await;
    let client = SessionClient::new(url);

    let created = client.create_session().await.expect("create");
    assert_eq!(created.snapshot.active_stage, Stage::R189);

    let switched = client
        .switch_stage(created.session_id, "qpe")
        .await
        .expect("switch");
    assert_eq!(switched.active_stage, Stage::Qpe);
    assert_eq!(
        *seen.lock().expect("seen"),
        vec![format!("{}:qpe", created.session_id)]
    );

    client
        .delete_session(created.session_id)
        .await
        .expect("delete");
}

#[tokio::test]
async fn api_errors_surface_code_and_message() {
    let (url, _) = spawn_server().await;
    let client = SessionClient::new(url);

    let err = client
        .process(SessionId::new())
        .await
        .expect_err("conflict");
    let api = err.downcast_ref::<ApiException>().expect("api exception");
    assert_eq!(api.code, ErrorCode::Conflict);
    assert!(api.message.contains("already in flight"));
}

#[tokio::test]
async fn non_json_errors_keep_status_and_body() {
    let (url, _) = spawn_server().await;
    let client = SessionClient::new(url);

    let err = client.reset(SessionId::new()).await.expect_err("bad gateway");
    let text = err.to_string();
    assert!(text.contains("502"), "{text}");
    assert!(text.contains("upstream down"), "{text}");
}
