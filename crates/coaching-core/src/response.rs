//! Decoding of free-text model replies into [`Metrics`].
//!
//! The model is trusted for content, not format. Replies may wrap the JSON
//! in prose or markdown fences, report numbers as strings, or list flaws
//! either as bare strings (legacy) or as detail objects. Everything is
//! normalized here, once; downstream code only ever sees [`FlawDetail`].
//!
//! String fields are carried verbatim. The only values dropped are blank
//! legacy string flaws, blank `error` tags, negative or non-numeric
//! timestamps, and non-numeric scores.

use serde::Deserialize;
use serde_json::Value;

use fretcoach_common::error::{FretcoachError, FretcoachResult};
use fretcoach_session_model::metrics::{clamp_score, FlawDetail, Metrics, INDETERMINATE_CHORD};

/// Decode a model reply.
///
/// The JSON object is located with a greedy match (first `{` to last `}`).
/// If that span does not decode, the balanced `{...}` span starting at each
/// `{` is tried in order; these fallbacks must carry at least one of
/// `chord`, `accuracy` or `flaws`. Failure is reported as
/// [`FretcoachError::ParseFailure`] carrying the reply verbatim.
pub fn decode_reply(reply: &str) -> FretcoachResult<Metrics> {
    let Some(greedy) = greedy_span(reply) else {
        return Err(FretcoachError::parse_failure(
            "reply contains no JSON object",
            reply,
        ));
    };

    let mut last_error = match serde_json::from_str::<WireMetrics>(greedy) {
        Ok(wire) => return Ok(wire.normalize()),
        Err(e) => {
            tracing::debug!(error = %e, span_len = greedy.len(), "Greedy JSON span rejected");
            e.to_string()
        }
    };

    for span in balanced_spans(reply).filter(|span| *span != greedy) {
        match serde_json::from_str::<WireMetrics>(span) {
            Ok(wire) if wire.has_metrics() => return Ok(wire.normalize()),
            Ok(_) => {
                tracing::debug!(span_len = span.len(), "Balanced JSON span has no metrics keys");
            }
            Err(e) => {
                tracing::debug!(error = %e, span_len = span.len(), "Balanced JSON span rejected");
                last_error = e.to_string();
            }
        }
    }

    Err(FretcoachError::parse_failure(
        format!("invalid metrics JSON: {last_error}"),
        reply,
    ))
}

/// First `{` through last `}`.
fn greedy_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Balanced spans starting at each `{` in the text, in order.
fn balanced_spans(text: &str) -> impl Iterator<Item = &str> {
    text.match_indices('{')
        .filter_map(move |(start, _)| balanced_span_from(text, start))
}

/// The `{` at `start` through its matching `}`, skipping braces inside
/// strings.
fn balanced_span_from(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Deserialize)]
struct WireMetrics {
    chord: Option<Value>,
    flaws: Option<Vec<WireFlaw>>,
    accuracy: Option<LooseNumber>,
    drill: Option<Value>,
    drill_context: Option<Value>,
    progress_history: Option<Vec<LooseNumber>>,
    error: Option<String>,
    raw: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireFlaw {
    Text(String),
    Detail(WireFlawDetail),
}

#[derive(Debug, Deserialize)]
struct WireFlawDetail {
    #[serde(alias = "flaw", alias = "name")]
    description: Option<String>,
    reason: Option<String>,
    tip: Option<String>,
    #[serde(alias = "timestamp")]
    timestamp_seconds: Option<LooseNumber>,
    #[serde(alias = "url")]
    reference_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseNumber {
    fn as_f64(&self) -> Option<f64> {
        let value = match self {
            LooseNumber::Int(v) => *v as f64,
            LooseNumber::Float(v) => *v,
            LooseNumber::Text(s) => s.trim().trim_end_matches('%').trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }

    fn as_score(&self) -> Option<u8> {
        match self {
            LooseNumber::Int(v) => Some(clamp_score(*v)),
            _ => self.as_f64().map(|v| clamp_score(v.round() as i64)),
        }
    }
}

impl WireMetrics {
    fn has_metrics(&self) -> bool {
        self.chord.is_some() || self.accuracy.is_some() || self.flaws.is_some()
    }

    fn normalize(self) -> Metrics {
        let chord = match self.chord {
            None | Some(Value::Null) => INDETERMINATE_CHORD.to_string(),
            Some(value) => text_of(value),
        };

        let flaws = self
            .flaws
            .unwrap_or_default()
            .into_iter()
            .filter_map(WireFlaw::normalize)
            .collect();

        let progress_history = self
            .progress_history
            .unwrap_or_default()
            .iter()
            .filter_map(LooseNumber::as_score)
            .collect();

        Metrics {
            chord,
            flaws,
            accuracy: self.accuracy.and_then(|a| a.as_score()).unwrap_or(0),
            drill: self.drill.map(text_of).unwrap_or_default(),
            drill_context: self.drill_context.map(text_of).unwrap_or_default(),
            progress_history,
            error: self.error.filter(|e| !e.trim().is_empty()),
            raw: self.raw,
        }
    }
}

impl WireFlaw {
    /// Blank legacy strings are skipped; detail objects are always kept.
    fn normalize(self) -> Option<FlawDetail> {
        match self {
            WireFlaw::Text(text) => {
                (!text.trim().is_empty()).then(|| FlawDetail::from_description(text))
            }
            WireFlaw::Detail(detail) => {
                let reason = detail.reason.unwrap_or_default();
                let description = detail.description.unwrap_or_else(|| reason.clone());

                Some(FlawDetail {
                    description,
                    reason,
                    tip: detail.tip.unwrap_or_default(),
                    timestamp_seconds: detail
                        .timestamp_seconds
                        .and_then(|t| t.as_f64())
                        .filter(|t| *t >= 0.0),
                    reference_url: detail.reference_url,
                })
            }
        }
    }
}

/// Strings pass through verbatim; anything else is rendered as compact JSON.
fn text_of(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
