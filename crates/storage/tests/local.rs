use storage::{BlobStore, LocalStorage, StorageError, Upload, Visibility, discard};
use tempfile::TempDir;

fn upload(name: &str, bytes: &[u8]) -> Upload {
    Upload {
        file_name: name.to_owned(),
        content_type: Some("application/pdf".to_owned()),
        bytes: bytes.to_vec(),
    }
}

async fn storage(temp: &TempDir) -> LocalStorage {
    LocalStorage::open(temp.path(), "http://localhost:3000/")
        .await
        .unwrap()
}

#[tokio::test]
async fn test_put_read_delete() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;

    let path = storage
        .put("modules", &upload("cours.pdf", b"%PDF"), Visibility::Private)
        .await
        .unwrap();
    assert!(path.starts_with("private/modules/"));
    assert!(path.ends_with(".pdf"));
    assert!(storage.exists(&path).await.unwrap());
    assert_eq!(storage.read(&path).await.unwrap(), b"%PDF");

    storage.delete(&path).await.unwrap();
    assert!(!storage.exists(&path).await.unwrap());
    assert!(matches!(
        storage.read(&path).await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_only_public_files_have_urls() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;

    let public = storage
        .put("articles", &upload("cover.png", b"png"), Visibility::Public)
        .await
        .unwrap();
    let private = storage
        .put("certificates", &upload("c.pdf", b"pdf"), Visibility::Private)
        .await
        .unwrap();

    let url = storage.url(&public).unwrap();
    assert!(url.starts_with("http://localhost:3000/storage/articles/"));
    assert!(storage.public_root().join(public.trim_start_matches("public/")).exists());
    assert_eq!(storage.url(&private), None);
}

#[tokio::test]
async fn test_path_traversal_blocked() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;

    assert!(matches!(
        storage.read("../etc/passwd").await,
        Err(StorageError::PathTraversal(_))
    ));
    assert!(matches!(
        storage.delete("/etc/passwd").await,
        Err(StorageError::PathTraversal(_))
    ));
}

#[tokio::test]
async fn test_discard_ignores_missing_files() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp).await;

    discard(&storage, Some("public/missing.png")).await;
    discard(&storage, None).await;
}
