//! Decode a saved model reply without calling any service.

use std::path::PathBuf;

use fretcoach_coaching_core::{decode_reply, statistician, Coach};
use fretcoach_common::config::AppConfig;
use fretcoach_common::error::FretcoachError;
use fretcoach_pipeline::metrics_for_error;

pub fn run(config: &AppConfig, reply_file: PathBuf, json: bool) -> anyhow::Result<()> {
    let reply = std::fs::read_to_string(&reply_file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", reply_file.display()))?;

    let metrics = match decode_reply(&reply) {
        Ok(metrics) => metrics,
        Err(e @ FretcoachError::ParseFailure { .. }) => {
            if !json {
                println!("Reply could not be decoded: {e}");
            }
            metrics_for_error(e)
        }
        Err(e) => return Err(e.into()),
    };

    let stats = statistician::derive(&metrics);
    let coach = Coach::from_config(&config.coach).advise(&stats, &metrics);

    if json {
        let preview = serde_json::json!({
            "metrics": metrics,
            "stats": stats,
            "coach": coach,
        });
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    super::print_metrics(&metrics);
    println!();
    println!("Errors: {}", stats.error_count);
    println!("Feedback: {}", coach.feedback_text);
    println!("Navigate skills: {}", coach.navigate_skills);
    Ok(())
}
