use super::*;

use std::collections::HashMap;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_use_local_folders() {
    let settings = resolve_settings(None, env_of(&[]));
    assert_eq!(settings, Settings::default());
    assert!(settings.executor_url.is_none());
}

#[test]
fn file_values_override_defaults() {
    let file = r#"
        bind_addr = "0.0.0.0:9000"
        data_root = "/srv/pipeline"
        executor_url = "http://backend:5000/api"
    "#;
    let settings = resolve_settings(Some(file), env_of(&[]));

    assert_eq!(settings.bind_addr, "0.0.0.0:9000");
    assert_eq!(settings.data_root, PathBuf::from("/srv/pipeline"));
    assert_eq!(
        settings.executor_url.as_deref(),
        Some("http://backend:5000/api")
    );
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn app_prefixed_env_wins_over_file_and_plain_env() {
    let file = r#"bind_addr = "0.0.0.0:9000""#;
    let settings = resolve_settings(
        Some(file),
        env_of(&[
            ("SERVER_BIND", "127.0.0.1:7000"),
            ("APP__BIND_ADDR", "127.0.0.1:7001"),
            ("APP__LOG_FILTER", "workflow_core=debug"),
        ]),
    );

    assert_eq!(settings.bind_addr, "127.0.0.1:7001");
    assert_eq!(settings.log_filter, "workflow_core=debug");
}

#[test]
fn blank_executor_url_falls_back_to_folders() {
    let settings = resolve_settings(None, env_of(&[("APP__EXECUTOR_URL", "  ")]));
    assert!(settings.executor_url.is_none());
}

#[test]
fn malformed_file_is_ignored() {
    let settings = resolve_settings(Some("bind_addr = ["), env_of(&[]));
    assert_eq!(settings, Settings::default());
}

#[tokio::test]
async fn prepare_data_root_creates_stage_folders() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("nested").join("data");

    let prepared = prepare_data_root(&root).await.expect("prepare");

    assert_eq!(prepared, root);
    for stage in shared::domain::Stage::ALL {
        assert!(root.join(stage.as_str()).is_dir(), "{stage} folder missing");
    }
}
