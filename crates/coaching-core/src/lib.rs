//! FretCoach Coaching Core
//!
//! The decision-making half of the pipeline:
//! - **Prompt:** Instructions sent to the multimodal model with the sampled frames
//! - **Response:** Strict decode boundary turning free-text replies into [`Metrics`]
//! - **Statistician:** Session statistics derived from metrics
//! - **Coach:** Deterministic feedback text, drill, and navigation hint
//!
//! This crate is pure computation. No I/O, no network.
//! All inputs are data; all outputs are data.
//!
//! [`Metrics`]: fretcoach_session_model::Metrics

pub mod coach;
pub mod prompt;
pub mod response;
pub mod statistician;

pub use coach::{Coach, DEFAULT_DRILL, NO_DETECTION_MESSAGE};
pub use prompt::{build_analysis_prompt, PromptContext};
pub use response::decode_reply;
