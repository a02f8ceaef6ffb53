mod common;

use std::path::PathBuf;
use std::sync::Arc;

use common::{image, EchoVision, ScriptedGrader};
use essay_grader::error::{AppError, NotFound};
use essay_grader::models::{load_submission_manifest, SubmissionRequest};
use essay_grader::orchestrator::process_submission;
use essay_grader::{EssayStore, SqliteEssayStore, SubmissionCtx, SubmissionFlow};

struct Harness {
    vision: Arc<EchoVision>,
    grader: Arc<ScriptedGrader>,
    flow: SubmissionFlow,
    store: SqliteEssayStore,
}

fn harness() -> Harness {
    let vision = Arc::new(EchoVision::new());
    let grader = Arc::new(ScriptedGrader::constant(4));
    let flow = SubmissionFlow::with_providers(vision.clone(), grader.clone());
    let store = SqliteEssayStore::in_memory().expect("in-memory database");
    Harness {
        vision,
        grader,
        flow,
        store,
    }
}

fn ctx(authorname: &str, title: &str) -> SubmissionCtx {
    SubmissionCtx::new(1, authorname.to_string(), title.to_string())
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "essay_grader_it_{}_{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn test_texts_joined_in_upload_order() {
    let h = harness();
    // 第一张最慢，结果仍按上传顺序
    let images = vec![image("p1.jpg", "A", 60), image("p2.jpg", "B", 30), image("p3.jpg", "C", 0)];

    let texts = h.flow.extract_texts(&images).await.unwrap();
    assert_eq!(texts, vec!["A", "B", "C"]);

    let request = SubmissionRequest {
        authorname: "jdoe".to_string(),
        title: "Pages".to_string(),
        images,
    };
    let outcome = h.flow.submit(&h.store, request, &ctx("jdoe", "Pages")).await.unwrap();
    assert_eq!(outcome.text, "A B C");
}

#[tokio::test]
async fn test_extraction_failure_skips_grading_and_persistence() {
    let h = harness();
    let request = SubmissionRequest {
        authorname: "jdoe".to_string(),
        title: "Broken".to_string(),
        images: vec![image("ok.jpg", "fine", 0), image("blurry.png", "FAIL", 0)],
    };

    let err = h
        .flow
        .submit(&h.store, request, &ctx("jdoe", "Broken"))
        .await
        .unwrap_err();

    match err {
        AppError::Extraction(e) => assert_eq!(e.filename(), "blurry.png"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(h.grader.calls(), 0);
    assert!(h.store.list_authors().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_first_failure_in_upload_order_is_reported() {
    let h = harness();
    // 第二张先失败，但报告的是上传顺序中的第一张
    let images = vec![image("first.jpg", "FAIL", 50), image("second.jpg", "FAIL", 0)];

    let err = h.flow.extract_texts(&images).await.unwrap_err();
    assert_eq!(err.filename(), "first.jpg");
}

#[tokio::test]
async fn test_submission_end_to_end() {
    let h = harness();
    let request = SubmissionRequest {
        authorname: "jdoe".to_string(),
        title: "My Summer".to_string(),
        images: vec![image("page1.jpg", "I went to the beach.", 0)],
    };

    let outcome = h
        .flow
        .submit(&h.store, request, &ctx("jdoe", "My Summer"))
        .await
        .unwrap();

    assert_eq!(outcome.text, "I went to the beach.");
    assert_eq!(outcome.grades.len(), 6);
    assert!(outcome.grades.iter().all(|g| g.grade == Some(4)));
    assert_eq!(h.vision.calls(), 1);
    assert_eq!(h.grader.calls(), 6);

    let essays = h.store.author_grades("jdoe").await.unwrap();
    assert_eq!(essays.len(), 1);
    let stored = &essays[0];
    assert_eq!(stored.id, outcome.essay_id);
    assert_eq!(stored.title, "My Summer");
    assert_eq!(stored.text, "I went to the beach.");
    assert_eq!(stored.images, vec!["page1.jpg"]);
    assert_eq!(stored.grades, outcome.grades);

    let by_id = h.store.essay(outcome.essay_id).await.unwrap();
    assert_eq!(by_id, *stored);
}

#[tokio::test]
async fn test_empty_transcription_is_still_graded() {
    let h = harness();
    let request = SubmissionRequest {
        authorname: "jdoe".to_string(),
        title: "Blank Page".to_string(),
        images: vec![image("blank.png", "", 0)],
    };

    let outcome = h
        .flow
        .submit(&h.store, request, &ctx("jdoe", "Blank Page"))
        .await
        .unwrap();

    assert_eq!(outcome.text, "");
    assert_eq!(outcome.grades.len(), 6);
    assert_eq!(h.grader.calls(), 6);

    let stored = h.store.essay(outcome.essay_id).await.unwrap();
    assert_eq!(stored.text, "");
    assert_eq!(stored.grades.len(), 6);
}

#[tokio::test]
async fn test_repeat_submissions_reuse_author() {
    let h = harness();
    for title in ["First", "Second"] {
        let request = SubmissionRequest {
            authorname: "jdoe".to_string(),
            title: title.to_string(),
            images: vec![image("page.jpg", title, 0)],
        };
        h.flow.submit(&h.store, request, &ctx("jdoe", title)).await.unwrap();
    }

    let authors = h.store.list_authors().await.unwrap();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].essays.len(), 2);
}

#[tokio::test]
async fn test_unknown_author_is_not_found() {
    let h = harness();
    let err = h.store.author_grades("nobody").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::NotFound(NotFound::Author(ref name)) if name == "nobody"
    ));
}

#[tokio::test]
async fn test_process_submission_marks_manifest_done() {
    let h = harness();
    let dir = temp_dir("process");
    std::fs::write(dir.join("page1.png"), "0|Dear diary.").unwrap();
    std::fs::write(dir.join("page2.png"), "0|The end.").unwrap();
    let manifest_path = dir.join("diary.toml");
    std::fs::write(
        &manifest_path,
        "author = \"asmith\"\ntitle = \"Diary\"\nimages = [\"page1.png\", \"page2.png\"]\n",
    )
    .unwrap();

    let manifest = load_submission_manifest(&manifest_path).await.unwrap();
    let outcome = process_submission(&h.flow, &h.store, manifest, 1).await.unwrap();

    assert_eq!(outcome.text, "Dear diary. The end.");
    assert!(!manifest_path.exists());
    assert!(dir.join("diary.toml.done").exists());

    let essays = h.store.author_grades("asmith").await.unwrap();
    assert_eq!(essays[0].images.len(), 2);
    assert!(essays[0].images[0].ends_with("page1.png"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_missing_image_file_fails_before_any_call() {
    let h = harness();
    let dir = temp_dir("missing");
    let manifest_path = dir.join("lost.toml");
    std::fs::write(
        &manifest_path,
        "author = \"asmith\"\ntitle = \"Lost\"\nimages = [\"nowhere.jpg\"]\n",
    )
    .unwrap();

    let manifest = load_submission_manifest(&manifest_path).await.unwrap();
    let err = process_submission(&h.flow, &h.store, manifest, 1).await.unwrap_err();

    assert!(matches!(err, AppError::Extraction(_)));
    assert_eq!(h.vision.calls(), 0);
    assert!(manifest_path.exists());

    let _ = std::fs::remove_dir_all(&dir);
}
