//! The deployment pipeline: build, resolve the output directory, publish.
//!
//! The build result gates everything after it. A toolchain that exits
//! non-zero or times out returns before any store call is made, leaving
//! previously published artifacts untouched.

use crate::publish::{PublishReport, publish_tree};
use crate::toolchain::{BuildError, run_toolchain};
use drydock_core::config::BuildConfig;
use drydock_storage::ObjectStore;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors from a deployment run.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("build output directory not found: {0}")]
    MissingOutputDir(PathBuf),

    #[error("failed to enumerate build output: {0}")]
    Io(#[from] std::io::Error),
}

/// Run one deployment against `storage`.
///
/// A single configured output directory is assumed; a toolchain that
/// emits elsewhere is unsupported rather than guessed at.
pub async fn build_and_publish(
    build: &BuildConfig,
    storage: Arc<dyn ObjectStore>,
) -> Result<PublishReport, DeployError> {
    run_toolchain(
        &build.source_dir,
        &build.install_command,
        &build.build_command,
        build.build_timeout(),
    )
    .await?;

    let output_dir = build.source_dir.join(&build.output_dir);
    if !output_dir.is_dir() {
        return Err(DeployError::MissingOutputDir(output_dir));
    }

    publish_tree(
        storage,
        &build.project,
        &output_dir,
        build.max_parallel_uploads,
        build.upload_timeout(),
    )
    .await
    .map_err(DeployError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use drydock_core::ProjectId;
    use drydock_storage::{
        ByteStream, FilesystemBackend, ObjectMeta, StorageResult,
    };
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store that counts every put it receives.
    struct CountingStore {
        inner: FilesystemBackend,
        puts: AtomicUsize,
    }

    #[async_trait]
    impl ObjectStore for CountingStore {
        async fn exists(&self, key: &str) -> StorageResult<bool> {
            self.inner.exists(key).await
        }
        async fn head(&self, key: &str) -> StorageResult<ObjectMeta> {
            self.inner.head(key).await
        }
        async fn get(&self, key: &str) -> StorageResult<Bytes> {
            self.inner.get(key).await
        }
        async fn get_stream(&self, key: &str) -> StorageResult<(ObjectMeta, ByteStream)> {
            self.inner.get_stream(key).await
        }
        async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.inner.put(key, data, content_type).await
        }
        async fn delete(&self, key: &str) -> StorageResult<()> {
            self.inner.delete(key).await
        }
        async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
            self.inner.list(prefix).await
        }
        fn backend_name(&self) -> &'static str {
            "counting"
        }
    }

    async fn counting_store(dir: &Path) -> Arc<CountingStore> {
        Arc::new(CountingStore {
            inner: FilesystemBackend::new(dir).await.unwrap(),
            puts: AtomicUsize::new(0),
        })
    }

    fn config(source: &Path, build_command: &str) -> BuildConfig {
        BuildConfig {
            project: ProjectId::new("acme").unwrap(),
            source_dir: source.to_path_buf(),
            output_dir: "dist".to_string(),
            install_command: "true".to_string(),
            build_command: build_command.to_string(),
            build_timeout_secs: 30,
            max_parallel_uploads: 4,
            upload_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn failed_build_publishes_nothing() {
        let source = tempfile::tempdir().unwrap();
        let store_dir = tempfile::tempdir().unwrap();
        let store = counting_store(store_dir.path()).await;

        // The command produces output and then fails; none of it may
        // reach the store.
        let result = build_and_publish(
            &config(source.path(), "mkdir -p dist && echo stale > dist/index.html && exit 1"),
            store.clone(),
        )
        .await;

        assert!(matches!(
            result,
            Err(DeployError::Build(BuildError::Failed(_)))
        ));
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_build_publishes_the_output_tree() {
        let source = tempfile::tempdir().unwrap();
        let store_dir = tempfile::tempdir().unwrap();
        let store = counting_store(store_dir.path()).await;

        let report = build_and_publish(
            &config(source.path(), "mkdir -p dist && echo '<html>' > dist/index.html"),
            store.clone(),
        )
        .await
        .unwrap();

        assert!(report.is_success());
        assert_eq!(report.uploaded, 1);
        assert_eq!(store.puts.load(Ordering::SeqCst), 1);
        assert!(store.exists("builds/acme/index.html").await.unwrap());
    }

    #[tokio::test]
    async fn build_that_emits_no_output_dir_is_an_error() {
        let source = tempfile::tempdir().unwrap();
        let store_dir = tempfile::tempdir().unwrap();
        let store = counting_store(store_dir.path()).await;

        let result = build_and_publish(&config(source.path(), "true"), store.clone()).await;

        assert!(matches!(result, Err(DeployError::MissingOutputDir(_))));
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }
}
