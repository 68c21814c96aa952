//! Structured prompt sent to the multimodal model.

/// What the model is told about the attached frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptContext {
    /// Number of images attached to the request.
    pub frame_count: usize,

    /// Source frames between consecutive images.
    pub stride: usize,
}

/// Example object embedded in the prompt. Keys must match what
/// [`crate::response::decode_reply`] reads.
const RESPONSE_SCHEMA: &str = r#"{
  "chord": "Am",
  "flaws": [
    {
      "description": "sloppy fretting",
      "reason": "index finger lands too far behind the fret",
      "tip": "press just behind the fret wire with the fingertip",
      "timestamp_seconds": 2.5,
      "reference_url": "https://example.com/lessons/fretting"
    }
  ],
  "accuracy": 80,
  "drill": "e|-----0-----|\nB|-----1-----|\nG|-----2-----|",
  "drill_context": "Slow chord changes to build clean fretting",
  "progress_history": [62, 70, 80]
}"#;

/// Build the analysis prompt for one call carrying every sampled frame.
pub fn build_analysis_prompt(context: &PromptContext) -> String {
    format!(
        r#"You are an expert guitar teacher reviewing a student's practice video.

You will receive {frames} still frames sampled in order from the video, one every {stride} source frames. Together they show a single playing attempt. Look at the fretting hand, the strumming hand, posture, and chord shapes.

Identify the chord being played, every technique flaw you can see, and how accurately the chord is played overall.

Respond with ONLY a JSON object in exactly this format (no markdown, no explanation outside the JSON):
{schema}

Rules:
- "chord": chord name such as "Am" or "G7". Use "indeterminate" if no chord can be identified.
- "flaws": every flaw, in the order it appears in the frames. Each one has "description", "reason", and "tip". Add "timestamp_seconds" if you can estimate when it happens and "reference_url" only if you know a relevant lesson. Use [] if the playing is clean.
- "accuracy": integer from 0 to 100. Use 0 if the guitar or hands are not visible.
- "drill": a short practice exercise written as guitar tablature targeting the worst flaw.
- "drill_context": one sentence explaining why the drill helps.
- "progress_history": integer accuracy estimates (0 to 100) for successive parts of the attempt, earliest first."#,
        frames = context.frame_count,
        stride = context.stride,
        schema = RESPONSE_SCHEMA,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::decode_reply;

    #[test]
    fn test_prompt_names_every_field() {
        let prompt = build_analysis_prompt(&PromptContext {
            frame_count: 20,
            stride: 5,
        });
        for key in [
            "\"chord\"",
            "\"flaws\"",
            "\"description\"",
            "\"reason\"",
            "\"tip\"",
            "\"timestamp_seconds\"",
            "\"reference_url\"",
            "\"accuracy\"",
            "\"drill\"",
            "\"drill_context\"",
            "\"progress_history\"",
        ] {
            assert!(prompt.contains(key), "prompt is missing {key}");
        }
        assert!(prompt.contains("20 still frames"));
        assert!(prompt.contains("every 5 source frames"));
    }

    #[test]
    fn test_schema_example_decodes() {
        let metrics = decode_reply(RESPONSE_SCHEMA).unwrap();
        assert_eq!(metrics.chord, "Am");
        assert_eq!(metrics.flaws.len(), 1);
        assert_eq!(metrics.accuracy, 80);
        assert_eq!(metrics.progress_history, vec![62, 70, 80]);
    }
}
