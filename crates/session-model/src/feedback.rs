//! Downstream stage outputs and the composite pipeline result.

use serde::{Deserialize, Serialize};

use crate::metrics::Metrics;

/// Session statistics derived from one [`Metrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of normalized flaws.
    pub error_count: usize,

    /// Improvement signal. Currently the attempt's accuracy.
    pub improvement_pct: u8,
}

/// Coaching feedback for the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachOutput {
    /// Text spoken back to the player.
    pub feedback_text: String,

    /// Practice exercise, as tablature. Never empty.
    pub drill: String,

    /// UI hint: suggest browsing the skills catalog.
    pub navigate_skills: bool,
}

/// Locator of synthesized feedback audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioResult {
    pub audio_url: String,
}

/// Terminal output of one orchestrated run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub metrics: Metrics,
    pub stats: Stats,
    pub coach: CoachOutput,
    pub audio_url: String,

    /// One human-readable line per stage, in execution order.
    pub logs: Vec<String>,
}
