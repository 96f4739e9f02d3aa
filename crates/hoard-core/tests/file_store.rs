//! End-to-end tests for the file-backed engine

use std::path::PathBuf;

use hoard_core::{
    CacheConfig, Config, FileBackend, LruCache, SizeLimitedCache, StorageEngine, StorageError,
    TimeBasedCache,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    name: String,
    age: u32,
}

fn test_config(temp_dir: &TempDir) -> Config {
    Config {
        data_dir: temp_dir.path().join("store"),
        cache: CacheConfig::Lru { capacity: 8 },
    }
}

#[tokio::test]
async fn test_init_creates_directory_once() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("nested").join("store");

    let engine = StorageEngine::new(FileBackend::new());
    engine.init(&data_dir).await.unwrap();
    assert!(data_dir.is_dir());

    // Later calls keep the first location
    engine.init(temp_dir.path().join("other")).await.unwrap();
    assert_eq!(engine.base_path(), Some(data_dir.as_path()));
    assert!(!temp_dir.path().join("other").exists());
}

#[tokio::test]
async fn test_init_failure_is_a_filesystem_error() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let engine = StorageEngine::new(FileBackend::new());
    let err = engine.init(blocker.join("store")).await.unwrap_err();

    assert!(matches!(err, StorageError::CreateDirectory { .. }));
    assert!(err.is_filesystem());
    assert!(!engine.is_initialized());
}

#[tokio::test]
async fn test_document_names_stay_inside_data_dir() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let engine = StorageEngine::open_with_config(&config).await.unwrap();

    let err = engine.write("../outside", "k", 1, None).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidName { .. }));
    assert!(!err.is_filesystem());

    assert!(matches!(
        engine.clear_document("nested/doc").await,
        Err(StorageError::InvalidName { .. })
    ));
    assert!(!temp_dir.path().join("outside.json").exists());
    assert!(!config.data_dir.join("nested").exists());
}

#[tokio::test]
async fn test_plaintext_layout() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let engine = StorageEngine::open_with_config(&config).await.unwrap();

    let profile = Profile {
        name: "Ada".to_string(),
        age: 36,
    };
    engine.write("users", "ada", &profile, None).await.unwrap();

    let path = config.data_dir.join("users.json");
    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, json!({"ada": {"name": "Ada", "age": 36}}));

    assert_eq!(
        engine.read::<Profile>("users", "ada", None).await.unwrap(),
        Some(profile)
    );
}

#[tokio::test]
async fn test_encrypted_layout_and_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);

    {
        let engine = StorageEngine::open_with_config(&config).await.unwrap();
        engine
            .write("secrets", "token", "abc123", Some("correct horse"))
            .await
            .unwrap();
    }

    let path = config.data_dir.join("secrets.txt");
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("ENCRYPTED:"));
    assert!(!config.data_dir.join("secrets.json").exists());

    // A fresh engine derives the same key from the same password
    let engine = StorageEngine::open_with_config(&config).await.unwrap();
    assert_eq!(
        engine
            .read::<String>("secrets", "token", Some("correct horse"))
            .await
            .unwrap(),
        Some("abc123".to_string())
    );

    engine
        .delete_document("secrets", Some("correct horse"))
        .await
        .unwrap();
    assert!(!path.exists());
}

#[tokio::test]
async fn test_corrupt_file_reads_as_empty_and_recovers() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    std::fs::create_dir_all(&config.data_dir).unwrap();
    std::fs::write(config.data_dir.join("broken.json"), "{\"half\": ").unwrap();

    let engine = StorageEngine::open_with_config(&config).await.unwrap();
    assert!(engine.get_keys("broken").await.unwrap().is_empty());

    engine.write("broken", "fixed", true, None).await.unwrap();
    let reopened = StorageEngine::open_with_config(&config).await.unwrap();
    assert_eq!(
        reopened.read::<bool>("broken", "fixed", None).await.unwrap(),
        Some(true)
    );
}

#[tokio::test]
async fn test_batch_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let engine = StorageEngine::open_with_config(&config).await.unwrap();

    engine.write("inventory", "widgets", 4, None).await.unwrap();
    engine
        .batch("inventory", None, |batch| {
            let widgets: u32 = batch.read("widgets").unwrap_or(0);
            batch.write("widgets", widgets + 6)?;
            batch.write("gadgets", 1)?;
            Ok::<_, StorageError>(())
        })
        .await
        .unwrap();

    let reopened = StorageEngine::open_with_config(&config).await.unwrap();
    assert_eq!(
        reopened.read::<u32>("inventory", "widgets", None).await.unwrap(),
        Some(10)
    );
    assert_eq!(reopened.get_keys("inventory").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_every_cache_strategy_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let engines = [
        StorageEngine::new(FileBackend::new()),
        StorageEngine::new(FileBackend::new()).with_cache(LruCache::new(2)),
        StorageEngine::new(FileBackend::new()).with_cache(SizeLimitedCache::new(2)),
        StorageEngine::new(FileBackend::new())
            .with_cache(TimeBasedCache::new(std::time::Duration::from_secs(60))),
    ];

    for (i, engine) in engines.iter().enumerate() {
        let dir: PathBuf = temp_dir.path().join(format!("store{}", i));
        engine.init(&dir).await.unwrap();

        for doc in ["a", "b", "c"] {
            engine.write(doc, "k", doc, None).await.unwrap();
        }
        for doc in ["a", "b", "c"] {
            assert_eq!(
                engine.read::<String>(doc, "k", None).await.unwrap(),
                Some(doc.to_string())
            );
        }
    }
}

#[tokio::test]
async fn test_concurrent_writers_on_one_document() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let engine = std::sync::Arc::new(StorageEngine::open_with_config(&config).await.unwrap());

    let writes = (0..20).map(|i| {
        let engine = engine.clone();
        async move { engine.write("events", &format!("e{}", i), i, None).await }
    });
    for result in futures_util::future::join_all(writes).await {
        result.unwrap();
    }

    let reopened = StorageEngine::open_with_config(&config).await.unwrap();
    assert_eq!(reopened.get_keys("events").await.unwrap().len(), 20);
}
