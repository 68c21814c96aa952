//! Orchestrator: Analyzer, Statistician, Coach, Automator, in order.

use std::sync::Arc;

use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use fretcoach_coaching_core::{statistician, Coach};
use fretcoach_common::config::AppConfig;
use fretcoach_common::error::FretcoachResult;
use fretcoach_common::retry::RetryPolicy;
use fretcoach_evidence::FrameSampler;
use fretcoach_model_client::GeminiClient;
use fretcoach_session_model::{InputDescriptor, PipelineResult};
use fretcoach_speech::{GoogleTtsClient, LocalAudioStore};

use crate::analyzer::Analyzer;
use crate::automator::Automator;
use crate::stats_sink::{JsonlStatsSink, NoopStatsSink, StatsSink};

/// Runs one input through every stage and collects a per-stage log.
pub struct Orchestrator {
    analyzer: Analyzer,
    coach: Coach,
    automator: Automator,
    stats_sink: Arc<dyn StatsSink>,
    user_id: String,
}

impl Orchestrator {
    pub fn new(analyzer: Analyzer, coach: Coach, automator: Automator) -> Self {
        Self {
            analyzer,
            coach,
            automator,
            stats_sink: Arc::new(NoopStatsSink),
            user_id: "anon".to_string(),
        }
    }

    /// Record statistics for `user_id` after every run.
    pub fn with_stats_sink(mut self, sink: Arc<dyn StatsSink>, user_id: impl Into<String>) -> Self {
        self.stats_sink = sink;
        self.user_id = user_id.into();
        self
    }

    /// Production wiring: ffmpeg sampling, Gemini, Google TTS, local audio
    /// files, and a JSONL stats file when one is configured.
    pub fn from_config(config: &AppConfig) -> FretcoachResult<Self> {
        let retry = RetryPolicy::from(&config.retry);

        let analyzer = Analyzer::new(
            FrameSampler::from_config(&config.sampling),
            Arc::new(GeminiClient::new(&config.model, retry)?),
        );
        let automator = Automator::new(
            Arc::new(GoogleTtsClient::new(&config.speech, retry)?),
            Arc::new(LocalAudioStore::from_config(&config.storage)),
            &config.speech,
        );

        let orchestrator = Self::new(analyzer, Coach::from_config(&config.coach), automator);
        Ok(match &config.stats.sink_path {
            Some(path) => orchestrator
                .with_stats_sink(Arc::new(JsonlStatsSink::new(path)), config.stats.user_id.clone()),
            None => orchestrator,
        })
    }

    /// Run the whole pipeline for one input.
    ///
    /// Analysis problems never fail the run; they surface as error-tagged
    /// metrics and the no-detection feedback. Failing to produce audio does.
    pub async fn run(&self, input: InputDescriptor) -> FretcoachResult<PipelineResult> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline_run", run_id = %run_id, kind = %input.kind());
        self.run_stages(input).instrument(span).await
    }

    async fn run_stages(&self, input: InputDescriptor) -> FretcoachResult<PipelineResult> {
        let mut logs = Vec::with_capacity(4);

        let metrics = self.analyzer.analyze(&input).await;
        logs.push(stage_line("Analyzer", &metrics)?);
        tracing::info!(
            chord = %metrics.chord,
            accuracy = metrics.accuracy,
            error = metrics.error.as_deref().unwrap_or(""),
            "Analyzer finished"
        );

        let stats = statistician::derive(&metrics);
        logs.push(stage_line("Statistician", &stats)?);
        tracing::info!(
            error_count = stats.error_count,
            improvement_pct = stats.improvement_pct,
            "Statistician finished"
        );
        if let Err(e) = self.stats_sink.record(&self.user_id, &stats).await {
            tracing::warn!(error = %e, "Failed to record statistics");
        }

        let coach = self.coach.advise(&stats, &metrics);
        logs.push(stage_line("Coach", &coach)?);
        tracing::info!(navigate_skills = coach.navigate_skills, "Coach finished");

        let audio = match self.automator.synthesize(&coach).await {
            Ok(audio) => audio,
            Err(e) => {
                tracing::error!(error = %e, "Automator failed");
                return Err(e);
            }
        };
        logs.push(stage_line("Automator", &audio)?);

        Ok(PipelineResult {
            metrics,
            stats,
            coach,
            audio_url: audio.audio_url,
            logs,
        })
    }
}

fn stage_line<T: Serialize>(stage: &str, output: &T) -> FretcoachResult<String> {
    Ok(format!("{stage}: {}", serde_json::to_string(output)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fretcoach_session_model::Stats;

    #[test]
    fn test_stage_line_format() {
        let stats = Stats {
            error_count: 1,
            improvement_pct: 80,
        };
        assert_eq!(
            stage_line("Statistician", &stats).unwrap(),
            r#"Statistician: {"error_count":1,"improvement_pct":80}"#
        );
    }
}
