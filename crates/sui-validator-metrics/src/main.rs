// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use prometheus::Registry;
use sui_validator_metrics::config::ReporterConfig;
use sui_validator_metrics::events::TracingEventSink;
use sui_validator_metrics::metrics::{MetricsService, ValidatorMetrics};
use sui_validator_metrics::reporter::ValidatorSnapshotReporter;
use sui_validator_metrics::source::FullnodeSnapshotSource;
use sui_validator_metrics::SUI_SYSTEM_STATE_OBJECT_ID;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Clone, Debug)]
#[clap(rename_all = "kebab-case")]
#[clap(name = env!("CARGO_BIN_NAME"))]
struct Args {
    /// Path to a yaml config
    #[clap(long, short)]
    config_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = match args.config_path {
        Some(path) => ReporterConfig::load(path)?,
        None => {
            let path = env::current_dir()?.join("config.yaml");
            if path.exists() {
                ReporterConfig::load(path)?
            } else {
                ReporterConfig::default()
            }
        }
    };

    let cancel = CancellationToken::new();
    let registry = Registry::new();

    let metrics_handle =
        MetricsService::new(config.metrics_address, registry.clone(), cancel.clone())
            .run()
            .await?;
    info!("Metrics server started at {}", config.metrics_address);

    let reporter = ValidatorSnapshotReporter::new(
        Arc::new(FullnodeSnapshotSource::new(
            config.fullnode_rpc_url.clone(),
            SUI_SYSTEM_STATE_OBJECT_ID,
        )),
        ValidatorMetrics::new(&registry),
        Arc::new(TracingEventSink),
        Duration::from_secs(config.poll_interval_secs),
    );

    let shutdown_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received ctrl-c, shutting down");
            shutdown_cancel.cancel();
        }
    });

    reporter.run(cancel).await?;
    metrics_handle.await?;

    Ok(())
}
