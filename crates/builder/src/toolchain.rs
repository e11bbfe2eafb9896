//! Build toolchain invocation.
//!
//! The toolchain is an opaque external process: exit code 0 means the
//! output directory is present and complete, anything else means no
//! publish may happen. Its stdout and stderr are forwarded to the log
//! line-by-line while the build runs, not buffered until completion.
//! Operators watch long builds through these lines.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Errors from a toolchain run.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to spawn build toolchain: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("build toolchain failed with {0}")]
    Failed(ExitStatus),

    #[error("build toolchain exceeded the {}s time limit", .0.as_secs())]
    TimedOut(Duration),

    #[error("I/O error while running build toolchain: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the install and build commands against `source_dir`.
///
/// Both commands run through the shell as one `install && build` pipeline
/// so the install step gates the build step, mirroring how the toolchain
/// is invoked by hand. The whole invocation is bounded by `timeout`;
/// on expiry the child is killed and the run fails without publishing.
pub async fn run_toolchain(
    source_dir: &Path,
    install_command: &str,
    build_command: &str,
    timeout: Duration,
) -> Result<(), BuildError> {
    let script = format!("{install_command} && {build_command}");
    tracing::info!(source_dir = %source_dir.display(), script = %script, "running build toolchain");

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(&script)
        .current_dir(source_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(BuildError::Spawn)?;

    // Forward output as it arrives. The reader tasks end on EOF, which
    // also happens when the child is killed on timeout.
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let stdout_task = tokio::spawn(async move {
        if let Some(stdout) = stdout {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::info!(target: "toolchain", "{line}");
            }
        }
    });
    let stderr_task = tokio::spawn(async move {
        if let Some(stderr) = stderr {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::warn!(target: "toolchain", "{line}");
            }
        }
    });

    let status = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(status) => status?,
        Err(_) => {
            let _ = child.kill().await;
            let _ = stdout_task.await;
            let _ = stderr_task.await;
            return Err(BuildError::TimedOut(timeout));
        }
    };

    let _ = stdout_task.await;
    let _ = stderr_task.await;

    if !status.success() {
        return Err(BuildError::Failed(status));
    }

    tracing::info!("build toolchain completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn succeeds_when_both_commands_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_toolchain(
            dir.path(),
            "true",
            "echo built",
            Duration::from_secs(10),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn install_failure_gates_the_build() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("built");
        let build = format!("touch {}", marker.display());

        let result = run_toolchain(dir.path(), "false", &build, Duration::from_secs(10)).await;

        assert!(matches!(result, Err(BuildError::Failed(_))));
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn nonzero_exit_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_toolchain(dir.path(), "true", "exit 3", Duration::from_secs(10)).await;

        match result {
            Err(BuildError::Failed(status)) => assert_eq!(status.code(), Some(3)),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn hung_build_is_killed_on_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let result =
            run_toolchain(dir.path(), "true", "sleep 30", Duration::from_millis(200)).await;

        assert!(matches!(result, Err(BuildError::TimedOut(_))));
    }
}
