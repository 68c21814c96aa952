//! Error types shared across FretCoach crates.

use std::path::PathBuf;

/// Top-level error type for FretCoach operations.
#[derive(Debug, thiserror::Error)]
pub enum FretcoachError {
    /// The frame sampler produced no frames to analyze.
    #[error("Insufficient evidence: no frames could be sampled")]
    EmptyEvidence,

    /// The model reply held no decodable JSON object.
    #[error("Parse failure: {reason}")]
    ParseFailure { reason: String, raw: String },

    #[error("Unknown input type: {kind}")]
    UnknownInputKind { kind: String },

    #[error("Speech synthesis failed: {message}")]
    SynthesisFailure { message: String },

    #[error("Model invocation failed: {message}")]
    ModelInvocation { message: String },

    #[error("HTTP error{}: {message}", status_suffix(.status))]
    Http {
        status: Option<u16>,
        message: String,
    },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" ({code})")).unwrap_or_default()
}

/// Result type alias using FretcoachError.
pub type FretcoachResult<T> = Result<T, FretcoachError>;

impl FretcoachError {
    pub fn parse_failure(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::ParseFailure {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    pub fn unknown_input_kind(kind: impl Into<String>) -> Self {
        Self::UnknownInputKind { kind: kind.into() }
    }

    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::SynthesisFailure {
            message: msg.into(),
        }
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::ModelInvocation {
            message: msg.into(),
        }
    }

    pub fn http(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: msg.into(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether retrying the failed operation could succeed.
    ///
    /// Connection failures and timeouts carry no status. Rate limiting
    /// (429) and server-side errors (5xx) are transient; other 4xx are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { status: None, .. } => true,
            Self::Http {
                status: Some(code), ..
            } => *code == 429 || (500..600).contains(code),
            _ => false,
        }
    }
}
