//! Deterministic coaching feedback.

use fretcoach_common::config::CoachConfig;
use fretcoach_session_model::{CoachOutput, Metrics, Stats};

/// Spoken when nothing usable was detected.
pub const NO_DETECTION_MESSAGE: &str =
    "Sorry, I couldn't analyze your playing this time. Please try again with your fretting hand clearly in view.";

/// Fallback drill when the analysis did not suggest one.
pub const DEFAULT_DRILL: &str = "E|-----0-----|";

/// Maps statistics and metrics to feedback.
#[derive(Debug, Clone)]
pub struct Coach {
    navigate_threshold: usize,
}

impl Coach {
    pub fn new(navigate_threshold: usize) -> Self {
        Self { navigate_threshold }
    }

    pub fn from_config(config: &CoachConfig) -> Self {
        Self::new(config.navigate_threshold)
    }

    /// Compose feedback for one attempt.
    ///
    /// An undetected chord, zero accuracy, or error-tagged metrics produce
    /// the fixed [`NO_DETECTION_MESSAGE`] without any flaw narration.
    pub fn advise(&self, stats: &Stats, metrics: &Metrics) -> CoachOutput {
        let navigate_skills = stats.error_count > self.navigate_threshold;

        if metrics.is_error() || !metrics.has_detection() || metrics.accuracy == 0 {
            return CoachOutput {
                feedback_text: NO_DETECTION_MESSAGE.to_string(),
                drill: DEFAULT_DRILL.to_string(),
                navigate_skills,
            };
        }

        let mut feedback = format!("Nice work playing the {} chord!", metrics.chord.trim());
        let descriptions: Vec<&str> = metrics
            .flaws
            .iter()
            .map(|flaw| flaw.description.trim())
            .filter(|description| !description.is_empty())
            .collect();
        if !descriptions.is_empty() {
            feedback.push_str(&format!(" Watch out for: {}.", descriptions.join("; ")));
        }
        feedback.push_str(&format!(
            " Your accuracy was {}%. Keep practicing, every session makes your playing cleaner!",
            metrics.accuracy
        ));

        let drill = match metrics.drill.trim() {
            "" => DEFAULT_DRILL.to_string(),
            drill => drill.to_string(),
        };

        CoachOutput {
            feedback_text: feedback,
            drill,
            navigate_skills,
        }
    }
}

impl Default for Coach {
    fn default() -> Self {
        Self::from_config(&CoachConfig::default())
    }
}
