//! The publish pass: upload one build output tree to the object store.
//!
//! Uploads are independent (every key is distinct), so they run
//! concurrently up to a configured bound, and a single failure never
//! aborts its siblings. The pass is best-effort, with failures surfaced
//! in the final report. A re-run fully re-publishes the current tree, so
//! partial failure is recoverable by running again.

use crate::walk::enumerate_files;
use bytes::Bytes;
use drydock_core::{ProjectId, artifact_key, content_type_for};
use drydock_storage::ObjectStore;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Attempts per object before recording the upload as failed.
const MAX_UPLOAD_ATTEMPTS: u32 = 3;

/// Outcome of one publish pass.
#[derive(Debug, Default)]
pub struct PublishReport {
    /// Number of objects uploaded successfully.
    pub uploaded: usize,
    /// Keys that could not be published, with the last error seen.
    pub failed: Vec<PublishFailure>,
}

/// One file that could not be published.
#[derive(Debug)]
pub struct PublishFailure {
    pub key: String,
    pub error: String,
}

impl PublishReport {
    /// Whether every enumerated file was published.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Publish every regular file under `output_dir` to
/// `builds/<project>/<relative_path>`.
pub async fn publish_tree(
    storage: Arc<dyn ObjectStore>,
    project: &ProjectId,
    output_dir: &Path,
    max_parallel: u32,
    upload_timeout: Duration,
) -> std::io::Result<PublishReport> {
    let files = enumerate_files(output_dir).await?;
    tracing::info!(
        project = %project,
        count = files.len(),
        backend = storage.backend_name(),
        "publishing build output"
    );

    let parallel = std::cmp::max(1, max_parallel as usize);
    let mut in_flight = FuturesUnordered::new();
    let mut report = PublishReport::default();

    for file in files {
        let storage = storage.clone();
        let project = project.clone();

        in_flight.push(async move {
            let key = match artifact_key(&project, &file.relative) {
                Ok(key) => key,
                Err(e) => {
                    return Err(PublishFailure {
                        key: file.relative.to_string_lossy().to_string(),
                        error: e.to_string(),
                    });
                }
            };

            let data = match tokio::fs::read(&file.absolute).await {
                Ok(data) => Bytes::from(data),
                Err(e) => {
                    return Err(PublishFailure {
                        key,
                        error: format!("failed to read {}: {e}", file.absolute.display()),
                    });
                }
            };

            let content_type = content_type_for(&file.relative);
            match upload_with_retry(storage.as_ref(), &key, data, content_type, upload_timeout)
                .await
            {
                Ok(()) => {
                    tracing::info!(key = %key, "uploaded");
                    Ok(key)
                }
                Err(error) => Err(PublishFailure { key, error }),
            }
        });

        if in_flight.len() >= parallel {
            if let Some(result) = in_flight.next().await {
                record(&mut report, result);
            }
        }
    }

    while let Some(result) = in_flight.next().await {
        record(&mut report, result);
    }

    Ok(report)
}

fn record(report: &mut PublishReport, result: Result<String, PublishFailure>) {
    match result {
        Ok(_) => report.uploaded += 1,
        Err(failure) => {
            tracing::error!(key = %failure.key, error = %failure.error, "upload failed");
            report.failed.push(failure);
        }
    }
}

/// Upload one object, retrying transient failures with exponential
/// backoff. Each attempt is bounded by `timeout` so a hung connection
/// cannot stall the whole pass.
async fn upload_with_retry(
    storage: &dyn ObjectStore,
    key: &str,
    data: Bytes,
    content_type: &str,
    timeout: Duration,
) -> Result<(), String> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let error = match tokio::time::timeout(
            timeout,
            storage.put(key, data.clone(), content_type),
        )
        .await
        {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("upload timed out after {}s", timeout.as_secs()),
        };

        if attempt >= MAX_UPLOAD_ATTEMPTS {
            return Err(error);
        }

        let delay = Duration::from_secs(1 << (attempt - 1));
        tracing::warn!(
            key = %key,
            attempt,
            error = %error,
            "upload failed, retrying in {}s",
            delay.as_secs()
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use drydock_storage::{ByteStream, FilesystemBackend, ObjectMeta, StorageError, StorageResult};
    use std::path::PathBuf;

    async fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.unwrap();
        }
        tokio::fs::write(path, contents).await.unwrap();
    }

    fn project(id: &str) -> ProjectId {
        ProjectId::new(id).unwrap()
    }

    async fn store_in(dir: &Path) -> Arc<dyn ObjectStore> {
        Arc::new(FilesystemBackend::new(dir).await.unwrap())
    }

    #[tokio::test]
    async fn publishes_whole_tree_under_project_prefix() {
        let out = tempfile::tempdir().unwrap();
        write(&out.path().join("index.html"), "<html>home</html>").await;
        write(&out.path().join("js/app.js"), "console.log('hi')").await;

        let store_dir = tempfile::tempdir().unwrap();
        let storage = store_in(store_dir.path()).await;

        let report = publish_tree(
            storage.clone(),
            &project("acme"),
            out.path(),
            4,
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert!(report.is_success());
        assert_eq!(report.uploaded, 2);
        assert_eq!(
            storage.get("builds/acme/index.html").await.unwrap(),
            Bytes::from("<html>home</html>")
        );
        assert_eq!(
            storage.get("builds/acme/js/app.js").await.unwrap(),
            Bytes::from("console.log('hi')")
        );
    }

    #[tokio::test]
    async fn missing_output_dir_is_fatal() {
        let store_dir = tempfile::tempdir().unwrap();
        let storage = store_in(store_dir.path()).await;

        let result = publish_tree(
            storage,
            &project("acme"),
            &PathBuf::from("/nonexistent/dist"),
            4,
            Duration::from_secs(5),
        )
        .await;
        assert!(result.is_err());
    }

    /// Store that always rejects puts for keys containing a marker,
    /// simulating one object behind a broken connection.
    struct FlakyStore {
        inner: FilesystemBackend,
        poison: &'static str,
    }

    #[async_trait]
    impl ObjectStore for FlakyStore {
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
            if key.contains(self.poison) {
                return Err(StorageError::Io(std::io::Error::other("connection reset")));
            }
            self.inner.put(key, data, content_type).await
        }
        async fn delete(&self, key: &str) -> StorageResult<()> {
            self.inner.delete(key).await
        }
        async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
            self.inner.list(prefix).await
        }
        fn backend_name(&self) -> &'static str {
            "flaky"
        }
    }

    #[tokio::test]
    async fn single_failure_does_not_abort_siblings() {
        let out = tempfile::tempdir().unwrap();
        for i in 0..9 {
            write(&out.path().join(format!("file{i}.txt")), "ok").await;
        }
        write(&out.path().join("broken.txt"), "never arrives").await;

        let store_dir = tempfile::tempdir().unwrap();
        let storage: Arc<dyn ObjectStore> = Arc::new(FlakyStore {
            inner: FilesystemBackend::new(store_dir.path()).await.unwrap(),
            poison: "broken",
        });

        let report = publish_tree(
            storage.clone(),
            &project("acme"),
            out.path(),
            4,
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(report.uploaded, 9);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].key, "builds/acme/broken.txt");
        assert!(!report.is_success());

        // The nine good files are retrievable despite the failure.
        for i in 0..9 {
            assert!(
                storage
                    .exists(&format!("builds/acme/file{i}.txt"))
                    .await
                    .unwrap()
            );
        }
        assert!(!storage.exists("builds/acme/broken.txt").await.unwrap());
    }
}
