//! Proxy test utilities.

use bytes::Bytes;
use drydock_core::config::{ProxyAppConfig, ServerConfig, StorageConfig};
use drydock_proxy::{AppState, create_router};
use drydock_storage::{FilesystemBackend, ObjectStore};
use std::sync::Arc;
use tempfile::TempDir;

/// A test proxy with temporary filesystem storage standing in for S3.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestProxy {
    pub router: axum::Router,
    pub storage: Arc<dyn ObjectStore>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestProxy {
    /// Create a new test proxy over an empty store.
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp directory");

        let storage_path = temp_dir.path().join("store");
        let storage: Arc<dyn ObjectStore> = Arc::new(
            FilesystemBackend::new(&storage_path)
                .await
                .expect("failed to create storage backend"),
        );

        let config = ProxyAppConfig {
            server: ServerConfig::default(),
            storage: StorageConfig::Filesystem {
                path: storage_path,
            },
        };

        let state = AppState::new(config, storage.clone());
        let router = create_router(state);

        Self {
            router,
            storage,
            _temp_dir: temp_dir,
        }
    }

    /// Publish an object directly into the backing store.
    pub async fn seed(&self, key: &str, body: &str, content_type: &str) {
        self.storage
            .put(key, Bytes::from(body.to_string()), content_type)
            .await
            .expect("failed to seed object");
    }
}
