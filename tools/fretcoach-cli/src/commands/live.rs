//! Run the pipeline on a simulated live burst.

use fretcoach_common::config::AppConfig;
use fretcoach_pipeline::Orchestrator;
use fretcoach_session_model::InputDescriptor;

pub async fn run(config: AppConfig, payload: String, json: bool) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to set up pipeline: {e}"))?;
    let result = orchestrator
        .run(InputDescriptor::live_burst(payload))
        .await
        .map_err(|e| anyhow::anyhow!("Pipeline failed: {e}"))?;

    super::print_result(&result, json)
}
