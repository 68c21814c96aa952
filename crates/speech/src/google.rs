//! Google Cloud Text-to-Speech client.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use fretcoach_common::config::SpeechConfig;
use fretcoach_common::error::{FretcoachError, FretcoachResult};
use fretcoach_common::retry::{retry_with_backoff, RetryPolicy};

use crate::{SpeechSynthesizer, SynthesisRequest};

/// Header carrying the API key. Keeps the key out of URLs and error text.
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeBody<'a> {
    input: SsmlInput<'a>,
    voice: VoiceParams<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SsmlInput<'a> {
    ssml: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceParams<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
}

/// HTTP client for `text:synthesize`.
#[derive(Debug, Clone)]
pub struct GoogleTtsClient {
    client: Client,
    endpoint: String,
    api_key: String,
    retry: RetryPolicy,
}

impl GoogleTtsClient {
    pub fn new(config: &SpeechConfig, retry: RetryPolicy) -> FretcoachResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| FretcoachError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            retry,
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn send_once(&self, body: &SynthesizeBody<'_>) -> FretcoachResult<Vec<u8>> {
        let response = self
            .client
            .post(format!("{}/v1/text:synthesize", self.endpoint))
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(FretcoachError::http(Some(status.as_u16()), text));
        }

        decode_audio(&text)
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for GoogleTtsClient {
    async fn synthesize(&self, request: &SynthesisRequest) -> FretcoachResult<Vec<u8>> {
        if !self.is_configured() {
            return Err(FretcoachError::synthesis("Speech API key is not configured"));
        }

        let body = build_body(request);
        retry_with_backoff("text:synthesize", &self.retry, || self.send_once(&body))
            .await
            .map_err(|e| match e {
                FretcoachError::SynthesisFailure { .. } => e,
                other => FretcoachError::synthesis(other.to_string()),
            })
    }

    fn name(&self) -> &str {
        "google-tts"
    }
}

fn build_body(request: &SynthesisRequest) -> SynthesizeBody<'_> {
    SynthesizeBody {
        input: SsmlInput {
            ssml: &request.ssml,
        },
        voice: VoiceParams {
            language_code: &request.voice.language_code,
            name: &request.voice.name,
        },
        audio_config: AudioConfig {
            audio_encoding: request.encoding.as_api_str(),
        },
    }
}

fn map_transport_error(error: reqwest::Error) -> FretcoachError {
    let status = error.status().map(|s| s.as_u16());
    FretcoachError::http(status, error.without_url().to_string())
}

fn decode_audio(body: &str) -> FretcoachResult<Vec<u8>> {
    let response: SynthesizeResponse = serde_json::from_str(body)
        .map_err(|e| FretcoachError::synthesis(format!("Unexpected response body: {e}")))?;

    let content = response
        .audio_content
        .filter(|c| !c.is_empty())
        .ok_or_else(|| FretcoachError::synthesis("Response contained no audio"))?;

    BASE64
        .decode(content.as_bytes())
        .map_err(|e| FretcoachError::synthesis(format!("Invalid audio encoding: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VoiceSelection;
    use fretcoach_common::config::AudioEncoding;

    #[test]
    fn test_body_shape() {
        let request = SynthesisRequest::new(
            "Keep going",
            VoiceSelection::from_config(&SpeechConfig::default()),
            AudioEncoding::Mp3,
        );
        let body = serde_json::to_value(build_body(&request)).unwrap();

        assert_eq!(body["input"]["ssml"], "<speak>Keep going</speak>");
        assert_eq!(body["voice"]["languageCode"], "en-US");
        assert_eq!(body["voice"]["name"], "en-US-Wavenet-D");
        assert_eq!(body["audioConfig"]["audioEncoding"], "MP3");
    }

    #[test]
    fn test_body_uses_configured_encoding() {
        let config = SpeechConfig {
            audio_encoding: AudioEncoding::OggOpus,
            ..SpeechConfig::default()
        };
        let request = SynthesisRequest::new(
            "hi",
            VoiceSelection::from_config(&config),
            config.audio_encoding,
        );
        let body = serde_json::to_value(build_body(&request)).unwrap();
        assert_eq!(body["audioConfig"]["audioEncoding"], "OGG_OPUS");
    }

    #[test]
    fn test_decode_audio() {
        let body = format!(r#"{{"audioContent":"{}"}}"#, BASE64.encode(b"RIFFdata"));
        assert_eq!(decode_audio(&body).unwrap(), b"RIFFdata");
    }

    #[test]
    fn test_decode_audio_failures_are_synthesis_errors() {
        for body in [r#"{}"#, r#"{"audioContent":"%%%"}"#, "not json"] {
            assert!(matches!(
                decode_audio(body),
                Err(FretcoachError::SynthesisFailure { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_missing_key_is_synthesis_failure() {
        let client = GoogleTtsClient::new(&SpeechConfig::default(), RetryPolicy::none()).unwrap();
        let config = SpeechConfig::default();
        let request = SynthesisRequest::new(
            "hi",
            VoiceSelection::from_config(&config),
            config.audio_encoding,
        );
        assert!(matches!(
            client.synthesize(&request).await,
            Err(FretcoachError::SynthesisFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_transport_errors_do_not_expose_the_api_key() {
        let config = SpeechConfig {
            endpoint: "http://127.0.0.1:1".to_string(),
            api_key: "SENTINEL-TTS-KEY-4410".to_string(),
            timeout_secs: 5,
            ..SpeechConfig::default()
        };
        let client = GoogleTtsClient::new(&config, RetryPolicy::none()).unwrap();
        let request = SynthesisRequest::new(
            "hi",
            VoiceSelection::from_config(&config),
            config.audio_encoding,
        );

        let err = client.synthesize(&request).await.unwrap_err();
        assert!(matches!(err, FretcoachError::SynthesisFailure { .. }));
        assert!(!err.to_string().contains("SENTINEL-TTS-KEY-4410"));
        assert!(!format!("{err:?}").contains("SENTINEL-TTS-KEY-4410"));
    }
}
