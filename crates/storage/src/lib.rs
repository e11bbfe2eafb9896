//! Object storage abstraction and backends for drydock.
//!
//! Both the builder and the edge proxy talk to the artifact store through
//! the [`ObjectStore`] trait: the builder writes `builds/<project>/...`
//! keys, the proxy reads them back. The trait is the test seam: the
//! filesystem backend stands in for S3 in development and tests.

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::{filesystem::FilesystemBackend, s3::S3Backend};
pub use error::{StorageError, StorageResult};
pub use traits::{ByteStream, ObjectMeta, ObjectStore};

use drydock_core::config::StorageConfig;
use std::sync::Arc;

/// Create an object store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    config.validate().map_err(StorageError::Config)?;

    match config {
        StorageConfig::Filesystem { path } => {
            let backend = FilesystemBackend::new(path).await?;
            Ok(Arc::new(backend))
        }
        StorageConfig::S3 {
            bucket,
            endpoint,
            region,
            prefix,
            access_key_id,
            secret_access_key,
            force_path_style,
        } => {
            let backend = S3Backend::new(
                bucket,
                endpoint.clone(),
                region.clone(),
                prefix.clone(),
                access_key_id.clone(),
                secret_access_key.clone(),
                *force_path_style,
            )
            .await?;
            Ok(Arc::new(backend))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn from_config_builds_filesystem_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::Filesystem {
            path: dir.path().to_path_buf(),
        };

        let store = from_config(&config).await.unwrap();
        assert_eq!(store.backend_name(), "filesystem");
    }

    #[tokio::test]
    async fn from_config_rejects_invalid_s3_credentials() {
        let config = StorageConfig::S3 {
            bucket: "builds".to_string(),
            endpoint: None,
            region: None,
            prefix: None,
            access_key_id: Some("AKIA".to_string()),
            secret_access_key: None,
            force_path_style: false,
        };

        let result = from_config(&config).await;
        assert!(matches!(result, Err(StorageError::Config(_))));
    }
}
