//! Automator stage.

use std::sync::Arc;

use fretcoach_common::config::{AudioEncoding, SpeechConfig};
use fretcoach_common::error::{FretcoachError, FretcoachResult};
use fretcoach_session_model::{AudioResult, CoachOutput};
use fretcoach_speech::{AudioStore, SpeechSynthesizer, SynthesisRequest, VoiceSelection};

/// Speaks coaching feedback and stores the audio.
pub struct Automator {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    store: Arc<dyn AudioStore>,
    voice: VoiceSelection,
    encoding: AudioEncoding,
}

impl Automator {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        store: Arc<dyn AudioStore>,
        config: &SpeechConfig,
    ) -> Self {
        Self {
            synthesizer,
            store,
            voice: VoiceSelection::from_config(config),
            encoding: config.audio_encoding,
        }
    }

    /// Synthesize `output.feedback_text` and return the stored audio's
    /// locator. Synthesis and storage failures are returned, not masked.
    pub async fn synthesize(&self, output: &CoachOutput) -> FretcoachResult<AudioResult> {
        let request =
            SynthesisRequest::new(&output.feedback_text, self.voice.clone(), self.encoding);

        let audio = self
            .synthesizer
            .synthesize(&request)
            .await
            .map_err(|e| match e {
                FretcoachError::SynthesisFailure { .. } => e,
                other => FretcoachError::synthesis(other.to_string()),
            })?;

        if audio.is_empty() {
            return Err(FretcoachError::synthesis(format!(
                "{} returned no audio",
                self.synthesizer.name()
            )));
        }

        let audio_url = self.store.put(&audio, self.encoding).await?;
        tracing::info!(
            synthesizer = self.synthesizer.name(),
            bytes = audio.len(),
            audio_url = %audio_url,
            "Feedback audio ready"
        );

        Ok(AudioResult { audio_url })
    }
}
