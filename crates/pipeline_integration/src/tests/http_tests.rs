use super::*;

use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;

async fn spawn_backend() -> String {
    async fn list(Path(stage): Path<String>) -> Json<serde_json::Value> {
        if stage == "QPE" {
            return Json(serde_json::json!({ "success": true, "arquivos": [] }));
        }
        Json(serde_json::json!({
            "success": true,
            "arquivos": [
                { "nome": "r189.xlsb", "tamanho": 10, "modificado": "2024-05-02T08:30:00Z" }
            ]
        }))
    }

    async fn process(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
        let results: Vec<_> = body["files"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|name| {
                let status = if name == "bad.xlsb" { "erro" } else { "success" };
                serde_json::json!({ "arquivo": name, "status": status, "mensagem": "" })
            })
            .collect();
        Json(serde_json::json!({ "results": results }))
    }

    async fn validation(Path(route): Path<String>) -> Result<Json<CheckReport>, StatusCode> {
        match route.as_str() {
            "qpe-r189" => Ok(Json(CheckReport::passed("no divergences"))),
            "spb-r189" => Err(StatusCode::INTERNAL_SERVER_ERROR),
            _ => Ok(Json(CheckReport::failed(format!("divergences in {route}")))),
        }
    }

    async fn consolidate() -> Json<CheckReport> {
        Json(CheckReport::passed("consolidated"))
    }

    let app = Router::new()
        .route("/api/arquivos/:stage", get(list))
        .route("/api/r189/process", post(process))
        .route("/api/validations/:route", post(validation))
        .route("/api/reports/consolidate", post(consolidate));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/api")
}

#[tokio::test]
async fn lists_files_using_legacy_field_names() {
    let base = spawn_backend().await;
    let client = HttpCollaborator::new(&base).expect("client");

    let files = client.list(Stage::R189).await.expect("files");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "r189.xlsb");
    assert_eq!(files[0].size_bytes, 10);

    let empty = client.list(Stage::Qpe).await.expect("files");
    assert!(empty.is_empty());
}

#[tokio::test]
async fn process_maps_per_file_status() {
    let base = spawn_backend().await;
    let client = HttpCollaborator::new(&base).expect("client");

    let report = client
        .process(
            Stage::R189,
            &["ok.xlsb".to_string(), "bad.xlsb".to_string()],
        )
        .await
        .expect("report");
    assert_eq!(report.succeeded_count(), 1);
    assert_eq!(report.failures().next().map(|r| r.name.as_str()), Some("bad.xlsb"));
}

#[tokio::test]
async fn missing_route_is_an_unexpected_status() {
    let base = spawn_backend().await;
    let client = HttpCollaborator::new(&base).expect("client");

    let err = client
        .process(Stage::Qpe, &["x".to_string()])
        .await
        .expect_err("no qpe route");
    assert!(matches!(
        err.downcast_ref::<CollaboratorError>(),
        Some(CollaboratorError::UnexpectedStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn validations_and_consolidation_use_their_routes() {
    let base = spawn_backend().await;
    let client = HttpCollaborator::new(&base).expect("client");

    assert!(client.validate(CheckKey::QpeR189).await.expect("qpe").success);
    assert!(!client.validate(CheckKey::MunCodeR189).await.expect("mun").success);
    assert!(client.validate(CheckKey::SpbR189).await.is_err());
    let consolidated = client
        .validate(CheckKey::ConsolidateReports)
        .await
        .expect("consolidate");
    assert_eq!(consolidated.message, "consolidated");
}

#[test]
fn rejects_malformed_base_url() {
    assert!(HttpCollaborator::new("not a url").is_err());
}
