//! FretCoach Speech
//!
//! Turns feedback text into a persisted audio asset:
//! - **SSML:** Markup envelope around the feedback text
//! - **Google TTS:** HTTP implementation of [`SpeechSynthesizer`]
//! - **Store:** Collision-free persistence behind [`AudioStore`]

pub mod google;
pub mod ssml;
pub mod store;

use fretcoach_common::config::{AudioEncoding, SpeechConfig};
use fretcoach_common::error::FretcoachResult;

pub use google::GoogleTtsClient;
pub use ssml::wrap_ssml;
pub use store::{AudioStore, LocalAudioStore};

/// Voice used for synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSelection {
    pub language_code: String,
    pub name: String,
}

impl VoiceSelection {
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            language_code: config.language_code.clone(),
            name: config.voice_name.clone(),
        }
    }
}

/// One synthesis call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    /// Complete `<speak>` document.
    pub ssml: String,
    pub voice: VoiceSelection,
    pub encoding: AudioEncoding,
}

impl SynthesisRequest {
    /// Wrap plain text in SSML for the given voice and encoding.
    pub fn new(text: &str, voice: VoiceSelection, encoding: AudioEncoding) -> Self {
        Self {
            ssml: wrap_ssml(text),
            voice,
            encoding,
        }
    }
}

/// Text-to-speech service.
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize the request, returning encoded audio bytes.
    async fn synthesize(&self, request: &SynthesisRequest) -> FretcoachResult<Vec<u8>>;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_config_voice() {
        let config = SpeechConfig {
            language_code: "en-GB".to_string(),
            voice_name: "en-GB-Neural2-B".to_string(),
            ..SpeechConfig::default()
        };
        let request = SynthesisRequest::new(
            "Nice <work>",
            VoiceSelection::from_config(&config),
            AudioEncoding::OggOpus,
        );

        assert_eq!(request.ssml, "<speak>Nice &lt;work&gt;</speak>");
        assert_eq!(request.voice.language_code, "en-GB");
        assert_eq!(request.voice.name, "en-GB-Neural2-B");
        assert_eq!(request.encoding, AudioEncoding::OggOpus);
    }
}
