//! Analyzer stage.

use std::sync::Arc;

use fretcoach_coaching_core::prompt::{build_analysis_prompt, PromptContext};
use fretcoach_coaching_core::response::decode_reply;
use fretcoach_common::error::{FretcoachError, FretcoachResult};
use fretcoach_evidence::{encode_frames, FrameSampler};
use fretcoach_model_client::GenerativeModel;
use fretcoach_session_model::{
    FlawDetail, InputDescriptor, InputKind, Metrics, ERROR_INSUFFICIENT_EVIDENCE,
    ERROR_MODEL_UNAVAILABLE, ERROR_PARSE_FAILURE, ERROR_UNKNOWN_INPUT,
};

/// Turns an [`InputDescriptor`] into [`Metrics`].
///
/// Never fails: every recoverable problem becomes error-tagged metrics so
/// later stages still run.
pub struct Analyzer {
    sampler: FrameSampler,
    model: Arc<dyn GenerativeModel>,
}

impl Analyzer {
    pub fn new(sampler: FrameSampler, model: Arc<dyn GenerativeModel>) -> Self {
        Self { sampler, model }
    }

    pub async fn analyze(&self, input: &InputDescriptor) -> Metrics {
        match input.kind() {
            InputKind::Upload => match self.analyze_upload(input).await {
                Ok(metrics) => metrics,
                Err(e) => {
                    tracing::warn!(error = %e, payload = input.payload(), "Upload analysis degraded");
                    metrics_for_error(e)
                }
            },
            InputKind::LiveBurst => {
                tracing::info!("Live burst analysis is simulated");
                simulated_live_metrics()
            }
            InputKind::Other(kind) => {
                tracing::warn!(kind = %kind, "Unknown input kind");
                metrics_for_error(FretcoachError::unknown_input_kind(kind.as_str()))
            }
        }
    }

    async fn analyze_upload(&self, input: &InputDescriptor) -> FretcoachResult<Metrics> {
        let path = input
            .video_path()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(FretcoachError::EmptyEvidence)?
            .to_path_buf();

        // Decoding and JPEG encoding are CPU-bound.
        let sampler = self.sampler.clone();
        let images = match tokio::task::spawn_blocking(move || encode_frames(&sampler.sample(&path)))
            .await
        {
            Ok(images) => images,
            Err(e) => {
                tracing::error!(error = %e, "Frame sampling task failed");
                Vec::new()
            }
        };

        if images.is_empty() {
            return Err(FretcoachError::EmptyEvidence);
        }

        let prompt = build_analysis_prompt(&PromptContext {
            frame_count: images.len(),
            stride: self.sampler.stride(),
        });

        let reply = self.model.generate(&prompt, &images).await?;
        let metrics = decode_reply(&reply)?;

        tracing::info!(
            model = self.model.name(),
            frames = images.len(),
            chord = %metrics.chord,
            flaws = metrics.flaws.len(),
            accuracy = metrics.accuracy,
            "Upload analyzed"
        );
        Ok(metrics)
    }
}

/// Map an analysis failure to error-tagged metrics.
pub fn metrics_for_error(error: FretcoachError) -> Metrics {
    match error {
        FretcoachError::EmptyEvidence => Metrics::failed(ERROR_INSUFFICIENT_EVIDENCE, None),
        FretcoachError::ParseFailure { raw, .. } => Metrics::failed(ERROR_PARSE_FAILURE, Some(raw)),
        FretcoachError::UnknownInputKind { .. } => Metrics::failed(ERROR_UNKNOWN_INPUT, None),
        _ => Metrics::failed(ERROR_MODEL_UNAVAILABLE, None),
    }
}

/// Fixed result for live bursts. There is no live capture analysis yet;
/// this keeps the path demoable end to end without a model call.
pub fn simulated_live_metrics() -> Metrics {
    Metrics {
        chord: "C".to_string(),
        flaws: vec![FlawDetail::from_description("timing off")],
        accuracy: 60,
        drill: String::new(),
        drill_context: String::new(),
        progress_history: Vec::new(),
        error: None,
        raw: None,
    }
}
