//! Analyze an uploaded practice video.

use std::path::PathBuf;

use fretcoach_common::config::AppConfig;
use fretcoach_pipeline::Orchestrator;
use fretcoach_session_model::InputDescriptor;

pub async fn run(
    mut config: AppConfig,
    video: PathBuf,
    stride: Option<usize>,
    max_frames: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    if !video.exists() {
        anyhow::bail!("Video not found: {}", video.display());
    }
    if let Some(stride) = stride {
        config.sampling.stride = stride;
    }
    if let Some(max_frames) = max_frames {
        config.sampling.max_frames = max_frames;
    }

    if !json {
        println!("Analyzing {}", video.display());
    }

    let orchestrator = Orchestrator::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to set up pipeline: {e}"))?;
    let result = orchestrator
        .run(InputDescriptor::upload(&video))
        .await
        .map_err(|e| anyhow::anyhow!("Pipeline failed: {e}"))?;

    tracing::debug!(logs = ?result.logs, "Pipeline stage log");
    super::print_result(&result, json)
}
