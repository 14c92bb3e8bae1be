use std::path::PathBuf;

use storage::repository::{QuestionProvider, StorageError};
use storage::JsonQuestionProvider;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("quiz-json-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn reads_subject_file_from_root() {
    let dir = scratch_dir("reads");
    std::fs::write(
        dir.join("modul_3_criptografie.json"),
        r#"[
            {"question": "Which cipher is symmetric?", "answers": ["AES", "RSA", "ECDSA"], "correct_answer": 0},
            {"question": "Block size of AES?\n\t(bits)", "answers": ["64", "128"], "correct_answer": 1, "image": "/images/aes.png"}
        ]"#,
    )
    .unwrap();

    let provider = JsonQuestionProvider::new(&dir);
    let questions = provider
        .fetch_by_subject("modul_3_criptografie")
        .await
        .unwrap();

    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].answer(0), Some("AES"));
    assert_eq!(questions[1].prompt(), "Block size of AES?\n\t(bits)");
    assert_eq!(questions[1].image(), Some("/images/aes.png"));

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn missing_file_is_not_found_and_garbage_is_serialization() {
    let dir = scratch_dir("errors");
    std::fs::write(dir.join("broken.json"), "<!doctype html>").unwrap();
    let provider = JsonQuestionProvider::new(&dir);

    assert!(matches!(
        provider.fetch_by_subject("absent").await,
        Err(StorageError::NotFound)
    ));
    assert!(matches!(
        provider.fetch_by_subject("broken").await,
        Err(StorageError::Serialization(_))
    ));

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn positioned_fetch_counts_skipped_records() {
    let dir = scratch_dir("positioned");
    std::fs::write(
        dir.join("s.json"),
        r#"[
            {"question": "no second answer", "answers": ["only"], "correct_answer": 0},
            {"question": "second in file", "answers": ["a", "b"], "correct_answer": 1}
        ]"#,
    )
    .unwrap();
    let provider = JsonQuestionProvider::new(&dir);

    let positioned = provider.fetch_positioned("s").await.unwrap();
    assert_eq!(positioned.len(), 1);
    assert_eq!(positioned[0].0, 1);
    assert_eq!(positioned[0].1.prompt(), "second in file");
    assert_eq!(provider.fetch_by_subject("s").await.unwrap().len(), 1);

    std::fs::remove_dir_all(dir).ok();
}
