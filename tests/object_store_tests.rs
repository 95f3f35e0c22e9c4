use atelier::object_store::{object_name_from_url, LocalStore, ObjectStore};
use bytes::Bytes;

const BASE_URL: &str = "http://localhost:8000";

fn test_store(dir: &tempfile::TempDir) -> LocalStore {
    LocalStore::new(dir.path(), BASE_URL).unwrap()
}

#[tokio::test]
async fn test_local_store_put_returns_media_url() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    let url = store
        .put("abc-photo.png", Bytes::from("hello"), Some("image/png"))
        .await
        .unwrap();

    assert_eq!(url, format!("{BASE_URL}/media/abc-photo.png"));
    assert_eq!(object_name_from_url(&url), Some("abc-photo.png"));
}

#[tokio::test]
async fn test_local_store_put_get_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    let data = Bytes::from("hello world");
    store.put("test-key", data.clone(), None).await.unwrap();

    let retrieved = store.get("test-key").await.unwrap();
    assert_eq!(retrieved, data);
}

#[tokio::test]
async fn test_local_store_delete() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    store
        .put("to-delete", Bytes::from("data"), None)
        .await
        .unwrap();
    store.delete("to-delete").await.unwrap();

    let result = store.get("to-delete").await;
    assert!(matches!(
        result.unwrap_err(),
        atelier::object_store::ObjectStoreError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_local_store_delete_nonexistent() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    // Deleting a nonexistent key should not error
    store.delete("nonexistent").await.unwrap();
}

#[tokio::test]
async fn test_local_store_get_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    let result = store.get("missing").await;
    assert!(result.is_err());
    assert!(matches!(
        result.unwrap_err(),
        atelier::object_store::ObjectStoreError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_local_store_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    store.put("key", Bytes::from("first"), None).await.unwrap();
    store.put("key", Bytes::from("second"), None).await.unwrap();

    let data = store.get("key").await.unwrap();
    assert_eq!(data, Bytes::from("second"));
}
