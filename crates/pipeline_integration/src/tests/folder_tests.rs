use super::*;

use tempfile::TempDir;

async fn seeded_root(files: &[(Stage, &str)]) -> TempDir {
    let root = tempfile::tempdir().expect("tempdir");
    ensure_stage_folders(root.path()).await.expect("folders");
    for (stage, name) in files {
        tokio::fs::write(stage_dir(root.path(), *stage).join(name), b"data")
            .await
            .expect("write");
    }
    root
}

#[tokio::test]
async fn lists_regular_files_sorted_by_name() {
    let root = seeded_root(&[(Stage::R189, "b.xlsb"), (Stage::R189, "a.xlsb")]).await;
    tokio::fs::write(stage_dir(root.path(), Stage::R189).join(".hidden"), b"x")
        .await
        .expect("hidden");
    tokio::fs::create_dir(stage_dir(root.path(), Stage::R189).join("nested"))
        .await
        .expect("nested");

    let lister = FolderFileLister::new(root.path());
    let files = lister.list(Stage::R189).await.expect("listing");

    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.xlsb", "b.xlsb"]);
    assert!(files.iter().all(|f| f.size_bytes == 4));
}

#[tokio::test]
async fn empty_stage_folder_is_a_valid_empty_listing() {
    let root = seeded_root(&[]).await;
    let files = FolderFileLister::new(root.path())
        .list(Stage::Qpe)
        .await
        .expect("listing");
    assert!(files.is_empty());
}

#[tokio::test]
async fn missing_stage_folder_is_a_failure() {
    let root = tempfile::tempdir().expect("tempdir");
    let err = FolderFileLister::new(root.path())
        .list(Stage::Spb)
        .await
        .expect_err("missing folder");
    assert!(matches!(
        err.downcast_ref::<CollaboratorError>(),
        Some(CollaboratorError::StageFolderMissing {
            stage: Stage::Spb,
            ..
        })
    ));
}

#[tokio::test]
async fn process_without_stage_folder_is_a_failure() {
    let root = tempfile::tempdir().expect("tempdir");
    let err = FolderStageExecutor::new(root.path())
        .process(Stage::Qpe, &["a.csv".to_string()])
        .await
        .expect_err("missing folder");
    assert!(matches!(
        err.downcast_ref::<CollaboratorError>(),
        Some(CollaboratorError::StageFolderMissing {
            stage: Stage::Qpe,
            ..
        })
    ));
}

#[tokio::test]
async fn process_surfaces_io_errors_on_the_stage_folder() {
    let temp = tempfile::tempdir().expect("tempdir");
    let not_a_dir = temp.path().join("data_root");
    tokio::fs::write(&not_a_dir, b"file").await.expect("write");

    let err = FolderStageExecutor::new(not_a_dir.clone())
        .process(Stage::R189, &["a.csv".to_string()])
        .await
        .expect_err("io error");
    assert!(err.downcast_ref::<CollaboratorError>().is_none());
    let text = format!("{err:#}");
    assert!(text.contains("failed to inspect"), "{text}");
}

#[tokio::test]
async fn process_reports_each_file() {
    let root = seeded_root(&[(Stage::R189, "a.csv")]).await;
    let executor = FolderStageExecutor::new(root.path());

    let report = executor
        .process(
            Stage::R189,
            &["a.csv".to_string(), "gone.csv".to_string(), "../a.csv".to_string()],
        )
        .await
        .expect("report");

    assert_eq!(report.total(), 3);
    assert_eq!(report.succeeded_count(), 1);
    assert!(!report.all_succeeded());
    let failed: Vec<_> = report.failures().map(|r| r.message.as_str()).collect();
    assert_eq!(failed, vec!["file not found", "invalid file name"]);
}

#[tokio::test]
async fn checks_require_every_compared_stage_to_have_inputs() {
    let root = seeded_root(&[(Stage::R189, "r.xlsb")]).await;
    let executor = FolderStageExecutor::new(root.path());

    let single = executor.validate(CheckKey::R189).await.expect("report");
    assert!(single.success, "{}", single.message);

    let cross = executor.validate(CheckKey::QpeR189).await.expect("report");
    assert!(!cross.success);
    assert!(cross.message.contains("QPE"));

    let consolidated = executor.consolidate().await.expect("report");
    assert!(!consolidated.success);
}
