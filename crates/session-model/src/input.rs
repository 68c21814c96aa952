//! Pipeline input descriptors.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Kind of input a pipeline run analyzes.
///
/// Kinds arrive as strings from the intake layer (`"upload"`,
/// `"live_burst"`). Anything else is kept as [`InputKind::Other`] so the
/// Analyzer can answer with an "unknown input type" result instead of the
/// request being rejected before it reaches the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InputKind {
    /// A recorded practice video on disk.
    Upload,
    /// A short webcam burst. No capture exists yet; analysis is simulated.
    LiveBurst,
    /// An unrecognized kind, carried verbatim.
    Other(String),
}

impl InputKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "upload" => InputKind::Upload,
            "live_burst" | "live-burst" | "liveburst" => InputKind::LiveBurst,
            _ => InputKind::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InputKind::Upload => "upload",
            InputKind::LiveBurst => "live_burst",
            InputKind::Other(raw) => raw,
        }
    }
}

impl From<String> for InputKind {
    fn from(raw: String) -> Self {
        InputKind::parse(&raw)
    }
}

impl From<InputKind> for String {
    fn from(kind: InputKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request's input. Built once by the intake layer and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDescriptor {
    kind: InputKind,
    payload: String,
}

impl InputDescriptor {
    pub fn new(kind: InputKind, payload: impl Into<String>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// An uploaded video at `path`.
    pub fn upload(path: impl AsRef<Path>) -> Self {
        Self::new(
            InputKind::Upload,
            path.as_ref().to_string_lossy().into_owned(),
        )
    }

    /// A simulated live capture. The payload is opaque.
    pub fn live_burst(payload: impl Into<String>) -> Self {
        Self::new(InputKind::LiveBurst, payload)
    }

    pub fn kind(&self) -> &InputKind {
        &self.kind
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Path of the video resource, for uploads only.
    pub fn video_path(&self) -> Option<&Path> {
        match self.kind {
            InputKind::Upload => Some(Path::new(&self.payload)),
            _ => None,
        }
    }
}
