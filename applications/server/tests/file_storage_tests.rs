/// File storage service tests
/// Tests bucket layout, returned URLs and path validation
use freetunes_server::services::{
    file_storage::{BUCKET_AUDIOS, BUCKET_COVERS, BUCKET_PICTURES},
    FileStorage,
};
use tempfile::TempDir;

const PUBLIC_URL: &str = "http://localhost:5000";

async fn create_storage() -> (FileStorage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileStorage::new(temp_dir.path().to_path_buf(), format!("{PUBLIC_URL}/"));
    storage.initialize().await.unwrap();
    (storage, temp_dir)
}

/// Test file storage initialization creates one directory per bucket
#[tokio::test]
async fn test_file_storage_initialization() {
    let (_storage, temp_dir) = create_storage().await;

    for bucket in [BUCKET_PICTURES, BUCKET_COVERS, BUCKET_AUDIOS] {
        assert!(
            temp_dir.path().join(bucket).is_dir(),
            "Bucket {bucket} should be created"
        );
    }
}

/// Test writing a file returns a URL that maps back to its contents
#[tokio::test]
async fn test_write_file_returns_public_url() {
    let (storage, temp_dir) = create_storage().await;
    let data = b"fake cover bytes";

    let url = storage
        .write_file(BUCKET_COVERS, "cover.png", data)
        .await
        .unwrap();

    assert!(url.starts_with(&format!("{PUBLIC_URL}/uploads/covers/")));
    assert!(url.ends_with("cover.png"));

    let path = storage.path_for_url(&url).unwrap();
    assert!(path.starts_with(temp_dir.path().join(BUCKET_COVERS)));
    assert_eq!(std::fs::read(path).unwrap(), data);
}

/// Test uploads with the same name never overwrite each other
#[tokio::test]
async fn test_same_filename_twice() {
    let (storage, _temp_dir) = create_storage().await;

    let first = storage
        .write_file(BUCKET_AUDIOS, "song.mp3", b"first")
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let second = storage
        .write_file(BUCKET_AUDIOS, "song.mp3", b"second")
        .await
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(std::fs::read(storage.path_for_url(&first).unwrap()).unwrap(), b"first");
    assert_eq!(std::fs::read(storage.path_for_url(&second).unwrap()).unwrap(), b"second");
}

/// Test client filenames cannot escape the bucket
#[tokio::test]
async fn test_filename_directory_traversal() {
    let (storage, temp_dir) = create_storage().await;

    let url = storage
        .write_file(BUCKET_PICTURES, "../../escape.png", b"x")
        .await
        .unwrap();

    let path = storage.path_for_url(&url).unwrap();
    assert!(path.starts_with(temp_dir.path().join(BUCKET_PICTURES)));
    assert!(url.ends_with("escape.png"));
}

/// Test invalid buckets are rejected
#[tokio::test]
async fn test_invalid_bucket() {
    let (storage, _temp_dir) = create_storage().await;

    assert!(storage.write_file("../outside", "a.png", b"x").await.is_err());
    assert!(storage.write_file("", "a.png", b"x").await.is_err());
}

/// Test URLs from elsewhere do not map to local paths
#[tokio::test]
async fn test_path_for_foreign_url() {
    let (storage, _temp_dir) = create_storage().await;

    assert!(storage
        .path_for_url("https://cdn.example.com/uploads/covers/a.png")
        .is_none());
    assert!(storage
        .path_for_url(&format!("{PUBLIC_URL}/uploads/../secret"))
        .is_none());
}

/// Test storing an empty file
#[tokio::test]
async fn test_store_empty_file() {
    let (storage, _temp_dir) = create_storage().await;

    let url = storage.write_file(BUCKET_COVERS, "empty.png", b"").await.unwrap();

    let path = storage.path_for_url(&url).unwrap();
    assert_eq!(std::fs::metadata(path).unwrap().len(), 0);
}

/// Test concurrent writes to the same bucket
#[tokio::test]
async fn test_concurrent_file_storage() {
    let (storage, _temp_dir) = create_storage().await;
    let storage = std::sync::Arc::new(storage);

    let mut handles = Vec::new();
    for i in 0..10 {
        let storage = storage.clone();
        handles.push(tokio::spawn(async move {
            storage
                .write_file(BUCKET_AUDIOS, &format!("track-{i}.mp3"), format!("data {i}").as_bytes())
                .await
                .unwrap()
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let url = handle.await.unwrap();
        let contents = std::fs::read(storage.path_for_url(&url).unwrap()).unwrap();
        assert_eq!(contents, format!("data {i}").as_bytes());
    }
}
