//! Application configuration.
//!
//! Credentials live here too. They are filled from the config file or the
//! environment once at startup, then handed explicitly to the clients that
//! need them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FretcoachError, FretcoachResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Frame sampling parameters.
    pub sampling: SamplingConfig,

    /// Generative model endpoint and credentials.
    pub model: ModelConfig,

    /// Speech synthesis endpoint, voice, and credentials.
    pub speech: SpeechConfig,

    /// Where synthesized audio is written and how it is addressed.
    pub storage: StorageConfig,

    /// Coaching thresholds.
    pub coach: CoachConfig,

    /// Backoff policy for outbound calls.
    pub retry: RetryConfig,

    /// Optional session statistics persistence.
    pub stats: StatsConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Frame sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Sample every Nth decoded frame.
    pub stride: usize,

    /// Hard cap on sampled frames per video.
    pub max_frames: usize,

    /// Edge length of the square frames handed to the model.
    pub frame_size: u32,

    /// ffmpeg binary used for decoding.
    pub ffmpeg_path: String,
}

/// Generative model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// API base URL.
    pub endpoint: String,

    /// Model identifier (e.g., "gemini-1.5-flash").
    pub model: String,

    /// API key. Empty means "not configured".
    pub api_key: String,

    /// Per-request timeout.
    pub timeout_secs: u64,

    /// Sampling temperature.
    pub temperature: f32,
}

/// Speech synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// API base URL.
    pub endpoint: String,

    /// API key. Empty means "not configured".
    pub api_key: String,

    /// BCP-47 language code.
    pub language_code: String,

    /// Voice name within the language.
    pub voice_name: String,

    /// Output audio encoding.
    pub audio_encoding: AudioEncoding,

    /// Per-request timeout.
    pub timeout_secs: u64,
}

/// Audio container/codec produced by the synthesis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    Mp3,
    OggOpus,
    Linear16,
}

impl AudioEncoding {
    /// File extension for persisted audio.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "mp3",
            AudioEncoding::OggOpus => "ogg",
            AudioEncoding::Linear16 => "wav",
        }
    }

    /// Wire name used by the synthesis API.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "MP3",
            AudioEncoding::OggOpus => "OGG_OPUS",
            AudioEncoding::Linear16 => "LINEAR16",
        }
    }
}

/// Audio persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory synthesized audio files are written to.
    pub audio_dir: PathBuf,

    /// Prefix of the locator returned to callers (served by the web layer).
    pub url_prefix: String,
}

/// Coaching thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    /// Suggest browsing the skills catalog when error count exceeds this.
    pub navigate_threshold: usize,
}

/// Exponential backoff for outbound network calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,

    /// Delay before the first retry.
    pub initial_backoff_ms: u64,

    /// Upper bound on any single delay.
    pub max_backoff_ms: u64,
}

/// Session statistics persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// JSONL file stats records are appended to. `None` disables the sink.
    pub sink_path: Option<PathBuf>,

    /// Opaque user/session key attached to each record.
    pub user_id: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "fretcoach=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            stride: 5,
            max_frames: 20,
            frame_size: 224,
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: String::new(),
            timeout_secs: 60,
            temperature: 0.2,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://texttospeech.googleapis.com".to_string(),
            api_key: String::new(),
            language_code: "en-US".to_string(),
            voice_name: "en-US-Wavenet-D".to_string(),
            audio_encoding: AudioEncoding::Mp3,
            timeout_secs: 30,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            audio_dir: dirs_default_audio(),
            url_prefix: "/feedback".to_string(),
        }
    }
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            navigate_threshold: 2,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            sink_path: None,
            user_id: "anon".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Unlike [`AppConfig::load`], a
    /// missing or malformed file is an error.
    pub fn load_from(path: &Path) -> FretcoachResult<Self> {
        if !path.exists() {
            return Err(FretcoachError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            FretcoachError::config(format!("Invalid config at {}: {e}", path.display()))
        })
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Fill empty API keys from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let first_set = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(*key))
                .find(|value| !value.trim().is_empty())
        };

        if self.model.api_key.is_empty() {
            if let Some(key) = first_set(&["FRETCOACH_MODEL_API_KEY", "GEMINI_API_KEY"]) {
                self.model.api_key = key;
            }
        }
        if self.speech.api_key.is_empty() {
            if let Some(key) = first_set(&["FRETCOACH_SPEECH_API_KEY", "GOOGLE_TTS_API_KEY"]) {
                self.speech.api_key = key;
            }
        }
        self
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("fretcoach").join("config.json")
}

/// Default directory for synthesized feedback audio.
fn dirs_default_audio() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("fretcoach").join("audio")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"sampling": {"stride": 3}, "coach": {}}"#).unwrap();
        assert_eq!(config.sampling.stride, 3);
        assert_eq!(config.sampling.max_frames, 20);
        assert_eq!(config.sampling.frame_size, 224);
        assert_eq!(config.coach.navigate_threshold, 2);
        assert_eq!(config.speech.audio_encoding, AudioEncoding::Mp3);
        assert_eq!(config.storage.url_prefix, "/feedback");
    }

    #[test]
    fn test_env_overrides_fill_only_empty_keys() {
        let mut config = AppConfig::default();
        config.speech.api_key = "from-file".to_string();

        let config = config.with_overrides_from(|key| match key {
            "GEMINI_API_KEY" => Some("gemini-key".to_string()),
            "FRETCOACH_SPEECH_API_KEY" => Some("env-speech".to_string()),
            _ => None,
        });

        assert_eq!(config.model.api_key, "gemini-key");
        assert_eq!(config.speech.api_key, "from-file");
    }

    #[test]
    fn test_env_override_precedence() {
        let config = AppConfig::default().with_overrides_from(|key| match key {
            "FRETCOACH_MODEL_API_KEY" => Some("primary".to_string()),
            "GEMINI_API_KEY" => Some("secondary".to_string()),
            "GOOGLE_TTS_API_KEY" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.model.api_key, "primary");
        assert!(config.speech.api_key.is_empty());
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = std::env::temp_dir().join("fretcoach_missing_config.json");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(FretcoachError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_save_to_then_load_from() {
        let path = std::env::temp_dir()
            .join(format!("fretcoach_config_{}", std::process::id()))
            .join("config.json");

        let mut config = AppConfig::default();
        config.sampling.stride = 7;
        config.stats.user_id = "player-3".to_string();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.sampling.stride, 7);
        assert_eq!(loaded.stats.user_id, "player-3");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_audio_encoding_names() {
        assert_eq!(AudioEncoding::Mp3.extension(), "mp3");
        assert_eq!(AudioEncoding::OggOpus.as_api_str(), "OGG_OPUS");
        let json = serde_json::to_string(&AudioEncoding::Linear16).unwrap();
        assert_eq!(json, "\"LINEAR16\"");
    }
}
