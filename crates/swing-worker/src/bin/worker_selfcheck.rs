use swing_analysis::synthetic::SyntheticSwing;
use swing_models::{JobStatus, SwingJob};
use swing_worker::{SwingProcessor, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WorkerConfig::from_env();

    println!(
        "worker-selfcheck: starting with job_timeout={:?} detector_timeout={:?}",
        config.job_timeout, config.detector_timeout
    );
    ensure_metrics_dump_dir(&config).await?;
    ensure_synthetic_swing_scores(config).await?;

    println!("worker-selfcheck: ok");
    Ok(())
}

async fn ensure_metrics_dump_dir(config: &WorkerConfig) -> anyhow::Result<()> {
    if let Some(parent) = config.metrics_dump_path.as_deref().and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

async fn ensure_synthetic_swing_scores(config: WorkerConfig) -> anyhow::Result<()> {
    let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let processor = SwingProcessor::new(config);
    let output = processor
        .process(SwingJob::new(SyntheticSwing::default().build()), shutdown_rx)
        .await;

    if output.status != JobStatus::Completed {
        return Err(anyhow::anyhow!(
            "synthetic swing did not score: {:?}",
            output.error
        ));
    }
    let result = output
        .result
        .ok_or_else(|| anyhow::anyhow!("completed job carried no result"))?;
    println!(
        "worker-selfcheck: synthetic swing composite={} band={}",
        result.composite_score, result.band
    );
    Ok(())
}
