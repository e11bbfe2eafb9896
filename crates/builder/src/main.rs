//! Drydock builder binary.
//!
//! Runs once per deployment: build, publish, exit. Failures surface
//! through the exit code and the log; there is no caller to report to.

use anyhow::{Context, Result};
use clap::Parser;
use drydock_builder::{BuildError, DeployError, build_and_publish};
use drydock_core::config::BuilderAppConfig;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// drydock-build - build a project and publish its static output
#[derive(Parser, Debug)]
#[command(name = "drydock-build")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "DRYDOCK_CONFIG",
        default_value = "config/builder.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("drydock-build v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file is optional, env vars can provide/override
    // everything). Missing required values fail here, before any
    // subprocess runs or byte is uploaded.
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    if config_path.exists() {
        tracing::info!(config_path = %args.config, "loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("no config file found at {}", args.config);
    }

    let config: BuilderAppConfig = figment
        .merge(Env::prefixed("DRYDOCK_").split("__"))
        .extract()
        .context("failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    // Initialize storage and verify connectivity before building, so a
    // misconfigured store fails the run in seconds instead of after a
    // long toolchain invocation.
    let storage = drydock_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    storage
        .health_check()
        .await
        .context("storage health check failed")?;
    tracing::info!(backend = storage.backend_name(), "storage backend initialized");

    let build = &config.build;
    let report = match build_and_publish(build, storage).await {
        Ok(report) => report,
        Err(DeployError::Build(e @ (BuildError::Failed(_) | BuildError::TimedOut(_)))) => {
            // Previously published artifacts stay live; publish is skipped.
            anyhow::bail!("build failed, skipping publish: {e}");
        }
        Err(DeployError::Build(e)) => return Err(e).context("build toolchain error"),
        Err(e) => return Err(e).context("publish failed"),
    };

    tracing::info!(
        project = %build.project,
        uploaded = report.uploaded,
        failed = report.failed.len(),
        "publish pass finished"
    );

    if !report.is_success() {
        anyhow::bail!(
            "publish completed with {} failed upload(s) out of {}",
            report.failed.len(),
            report.uploaded + report.failed.len()
        );
    }

    Ok(())
}
