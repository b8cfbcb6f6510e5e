//! Swing analysis worker binary.
//!
//! Usage: `swing-worker <job.json> <output.json>`

use std::path::PathBuf;

use anyhow::Context;
use swing_models::JobStatus;
use tracing::{error, info};

use swing_worker::{init_tracing, metrics, SwingProcessor, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = WorkerConfig::from_env();
    init_tracing(config.json_logs)?;

    let mut args = std::env::args().skip(1);
    let (input, output) = match (args.next(), args.next()) {
        (Some(input), Some(output)) => (PathBuf::from(input), PathBuf::from(output)),
        _ => anyhow::bail!("usage: swing-worker <job.json> <output.json>"),
    };

    let metrics_handle = if config.metrics_enabled {
        Some(metrics::init_metrics()?)
    } else {
        None
    };

    info!("Starting swing-worker");
    info!("Worker config: {:?}", config);

    // Setup signal handler
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            let _ = shutdown_tx.send(true);
        }
    });

    let processor = SwingProcessor::new(config.clone());
    let result = processor
        .process_file(&input, &output, shutdown_rx)
        .await
        .with_context(|| format!("failed to process {}", input.display()));

    if let (Some(handle), Some(path)) = (&metrics_handle, &config.metrics_dump_path) {
        if let Err(e) = metrics::dump_metrics(handle, path).await {
            error!("Failed to write metrics snapshot: {}", e);
        }
    }

    let job_output = result?;
    info!("Worker shutdown complete");

    if job_output.status != JobStatus::Completed {
        std::process::exit(2);
    }
    Ok(())
}
