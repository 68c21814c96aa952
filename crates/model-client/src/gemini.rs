//! Gemini `generateContent` client.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use fretcoach_common::config::ModelConfig;
use fretcoach_common::error::{FretcoachError, FretcoachResult};
use fretcoach_common::retry::{retry_with_backoff, RetryPolicy};
use fretcoach_evidence::EncodedImage;

use crate::GenerativeModel;

/// Upper bound on error body text carried into error messages.
const MAX_ERROR_BODY: usize = 512;

/// Header carrying the API key. Keeps the key out of URLs and error text.
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// HTTP client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(config: &ModelConfig, retry: RetryPolicy) -> FretcoachResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| FretcoachError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            retry,
        })
    }

    /// Whether an API key is present.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }

    async fn send_once(&self, body: &GenerateRequest<'_>) -> FretcoachResult<String> {
        let response = self
            .client
            .post(self.url())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body_text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(FretcoachError::http(
                Some(status.as_u16()),
                truncate(&body_text, MAX_ERROR_BODY),
            ));
        }

        extract_reply(&body_text)
    }
}

#[async_trait::async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, prompt: &str, images: &[EncodedImage]) -> FretcoachResult<String> {
        if !self.is_configured() {
            return Err(FretcoachError::config("Model API key is not configured"));
        }

        let body = build_request(prompt, images, self.temperature);
        tracing::debug!(model = %self.model, images = images.len(), "Sending generateContent request");

        let reply = retry_with_backoff("generateContent", &self.retry, || self.send_once(&body)).await?;

        tracing::debug!(model = %self.model, reply_len = reply.len(), "Model replied");
        Ok(reply)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

fn build_request<'a>(
    prompt: &'a str,
    images: &'a [EncodedImage],
    temperature: f32,
) -> GenerateRequest<'a> {
    let mut parts = Vec::with_capacity(images.len() + 1);
    parts.push(RequestPart::Text { text: prompt });
    parts.extend(images.iter().map(|image| RequestPart::Image {
        inline_data: InlineData {
            mime_type: &image.mime_type,
            data: &image.data,
        },
    }));

    GenerateRequest {
        contents: vec![RequestContent {
            role: "user",
            parts,
        }],
        generation_config: GenerationConfig {
            temperature,
            response_mime_type: "application/json",
        },
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_reply(body: &str) -> FretcoachResult<String> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| FretcoachError::model(format!("Unexpected response body: {e}")))?;

    let text: String = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if !text.is_empty() {
        return Ok(text);
    }

    match response.prompt_feedback.and_then(|f| f.block_reason) {
        Some(reason) => Err(FretcoachError::model(format!("Request blocked: {reason}"))),
        None => Err(FretcoachError::model("Response contained no text")),
    }
}

fn map_transport_error(error: reqwest::Error) -> FretcoachError {
    let status = error.status().map(|s| s.as_u16());
    FretcoachError::http(status, error.without_url().to_string())
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
