use serde_json::json;
use storage::repository::{KeyValueStore, Storage, StoreKey};
use storage::sqlite::SqliteStore;

#[tokio::test]
async fn sqlite_set_get_remove() {
    let store = SqliteStore::connect("sqlite::memory:")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    assert!(store.get(StoreKey::UserProgress).await.unwrap().is_none());

    store
        .set(StoreKey::UserProgress, json!({"totalQuizzes": 1}))
        .await
        .unwrap();
    store
        .set(StoreKey::UserProgress, json!({"totalQuizzes": 2}))
        .await
        .unwrap();
    let value = store.get(StoreKey::UserProgress).await.unwrap().unwrap();
    assert_eq!(value["totalQuizzes"], 2);

    store.remove(StoreKey::UserProgress).await.unwrap();
    assert!(store.get(StoreKey::UserProgress).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_keys_are_independent() {
    let store = SqliteStore::connect("sqlite::memory:")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    store
        .set(StoreKey::QuizConfig, json!({"questionCount": 10}))
        .await
        .unwrap();
    store
        .set(StoreKey::QuizResults, json!({"score": 80}))
        .await
        .unwrap();
    store.remove(StoreKey::QuizConfig).await.unwrap();

    assert!(store.get(StoreKey::QuizConfig).await.unwrap().is_none());
    assert_eq!(
        store.get(StoreKey::QuizResults).await.unwrap().unwrap()["score"],
        80
    );
}

#[tokio::test]
async fn sqlite_file_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("quiz.sqlite3").display());

    {
        let storage = Storage::sqlite(&url).await.expect("open");
        storage
            .save(StoreKey::QuizConfig, &json!({"topics": ["thorax"], "questionCount": 3}))
            .await
            .unwrap();
    }

    let reopened = Storage::sqlite(&url).await.expect("reopen");
    let value: serde_json::Value = reopened
        .load(StoreKey::QuizConfig)
        .await
        .unwrap()
        .expect("config persisted");
    assert_eq!(value["questionCount"], 3);
}
