//! Configuration types shared across crates.

use crate::project::ProjectId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for the builder binary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuilderAppConfig {
    pub build: BuildConfig,
    pub storage: StorageConfig,
}

impl BuilderAppConfig {
    /// Validate configuration invariants across sections.
    pub fn validate(&self) -> Result<(), String> {
        self.build.validate()?;
        self.storage.validate()
    }
}

/// Top-level configuration for the proxy binary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProxyAppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

impl ProxyAppConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.storage.validate()
    }
}

/// Builder run configuration.
///
/// `project` and `source_dir` have no defaults: a run without them is a
/// configuration error before any subprocess is spawned.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Identity of the project being published.
    pub project: ProjectId,
    /// Path to the checked-out source tree.
    pub source_dir: PathBuf,
    /// Name of the toolchain's output directory under `source_dir`.
    /// A single configured name is assumed; no candidate probing.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Dependency-install command, run through the shell.
    #[serde(default = "default_install_command")]
    pub install_command: String,
    /// Build command, run through the shell after install succeeds.
    #[serde(default = "default_build_command")]
    pub build_command: String,
    /// Hard wall-clock limit for the whole toolchain invocation.
    #[serde(default = "default_build_timeout_secs")]
    pub build_timeout_secs: u64,
    /// Upper bound on concurrent uploads during a publish pass.
    #[serde(default = "default_max_parallel_uploads")]
    pub max_parallel_uploads: u32,
    /// Per-attempt timeout for a single object upload.
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
}

impl BuildConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.output_dir.is_empty() {
            return Err("build.output_dir must not be empty".to_string());
        }
        if self.build_timeout_secs == 0 {
            return Err("build.build_timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

fn default_output_dir() -> String {
    "dist".to_string()
}

fn default_install_command() -> String {
    "npm install".to_string()
}

fn default_build_command() -> String {
    "npm run build".to_string()
}

fn default_build_timeout_secs() -> u64 {
    900
}

fn default_max_parallel_uploads() -> u32 {
    8
}

fn default_upload_timeout_secs() -> u64 {
    60
}

/// Proxy server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Timeout for a single upstream store read.
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,
}

impl ServerConfig {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            upstream_timeout_secs: default_upstream_timeout_secs(),
        }
    }
}

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory for storage.
        path: PathBuf,
    },
    /// S3-compatible storage.
    S3 {
        /// Bucket name.
        bucket: String,
        /// Optional endpoint URL (for MinIO, etc.).
        endpoint: Option<String>,
        /// AWS region.
        region: Option<String>,
        /// Optional key prefix inside the bucket.
        prefix: Option<String>,
        /// AWS access key ID. Falls back to the ambient credential chain if unset.
        access_key_id: Option<String>,
        /// AWS secret access key. Falls back to the ambient credential chain if unset.
        secret_access_key: Option<String>,
        /// Force path-style URLs (`endpoint/bucket/key`). Required for MinIO.
        #[serde(default)]
        force_path_style: bool,
    },
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::S3 {
                bucket,
                access_key_id,
                secret_access_key,
                ..
            } => {
                if bucket.is_empty() {
                    return Err("s3 config requires a bucket name".to_string());
                }
                match (access_key_id.as_ref(), secret_access_key.as_ref()) {
                    (Some(_), Some(_)) | (None, None) => Ok(()),
                    _ => Err(
                        "s3 config requires both access_key_id and secret_access_key when either is set"
                            .to_string(),
                    ),
                }
            }
            StorageConfig::Filesystem { .. } => Ok(()),
        }
    }
}
