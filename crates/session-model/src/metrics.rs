//! Performance metrics for one analyzed playing attempt.

use serde::{Deserialize, Serialize};

/// Chord value used when nothing could be detected.
pub const INDETERMINATE_CHORD: &str = "indeterminate";

/// Error tag: the model reply held no decodable JSON object.
pub const ERROR_PARSE_FAILURE: &str = "parse failure";

/// Error tag: the input kind is not one the Analyzer handles.
pub const ERROR_UNKNOWN_INPUT: &str = "unknown input type";

/// Error tag: no frames could be sampled from the video.
pub const ERROR_INSUFFICIENT_EVIDENCE: &str = "insufficient evidence";

/// Error tag: the model could not be reached or refused the request.
pub const ERROR_MODEL_UNAVAILABLE: &str = "model unavailable";

/// A detected technique deficiency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlawDetail {
    /// Short description, e.g. "sloppy fretting".
    pub description: String,

    /// Why it happens.
    #[serde(default)]
    pub reason: String,

    /// How to fix it.
    #[serde(default)]
    pub tip: String,

    /// Position in the video where the flaw is visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_seconds: Option<f64>,

    /// Link to a lesson or reference clip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
}

impl FlawDetail {
    /// A flaw known only by its description (the legacy bare-string shape).
    pub fn from_description(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            reason: String::new(),
            tip: String::new(),
            timestamp_seconds: None,
            reference_url: None,
        }
    }
}

/// Typed analysis result.
///
/// `accuracy` and `progress_history` entries are always within `[0, 100]`.
/// When `error` is set the remaining fields hold neutral values and `raw`
/// may carry the unparseable model reply for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub chord: String,

    /// Flaws in detection order.
    pub flaws: Vec<FlawDetail>,

    pub accuracy: u8,

    pub drill: String,

    /// Why the drill was chosen.
    pub drill_context: String,

    /// Past accuracy scores, most recent last.
    #[serde(default)]
    pub progress_history: Vec<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl Metrics {
    /// An error-tagged result. Downstream stages keep running on it.
    pub fn failed(error: impl Into<String>, raw: Option<String>) -> Self {
        Self {
            chord: INDETERMINATE_CHORD.to_string(),
            flaws: Vec::new(),
            accuracy: 0,
            drill: String::new(),
            drill_context: String::new(),
            progress_history: Vec::new(),
            error: Some(error.into()),
            raw,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Whether a chord was actually recognized.
    pub fn has_detection(&self) -> bool {
        let chord = self.chord.trim();
        !chord.is_empty() && !chord.eq_ignore_ascii_case(INDETERMINATE_CHORD)
    }
}

/// Clamp a model-reported score into `[0, 100]`.
pub fn clamp_score(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_metrics_are_neutral() {
        let metrics = Metrics::failed(ERROR_PARSE_FAILURE, Some("garbage".to_string()));
        assert!(metrics.is_error());
        assert!(!metrics.has_detection());
        assert_eq!(metrics.accuracy, 0);
        assert!(metrics.flaws.is_empty());
        assert_eq!(metrics.raw.as_deref(), Some("garbage"));
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(-5), 0);
        assert_eq!(clamp_score(42), 42);
        assert_eq!(clamp_score(250), 100);
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let metrics = Metrics {
            chord: "G".to_string(),
            flaws: vec![FlawDetail::from_description("muted string")],
            accuracy: 70,
            drill: String::new(),
            drill_context: String::new(),
            progress_history: vec![60, 70],
            error: None,
            raw: None,
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert!(json.get("error").is_none());
        assert!(json.get("raw").is_none());
        assert!(json["flaws"][0].get("timestamp_seconds").is_none());
        assert_eq!(json["flaws"][0]["description"], "muted string");
    }

    #[test]
    fn test_chord_detection() {
        let mut metrics = Metrics::failed("x", None);
        metrics.error = None;
        metrics.chord = "Indeterminate".to_string();
        assert!(!metrics.has_detection());
        metrics.chord = "Em".to_string();
        assert!(metrics.has_detection());
    }
}
