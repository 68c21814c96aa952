//! FretCoach Pipeline
//!
//! Stages, in execution order:
//! - **Analyzer:** input descriptor to [`Metrics`] (one model call per upload)
//! - **Statistician / Coach:** pure steps from `fretcoach-coaching-core`
//! - **Automator:** feedback text to a stored audio asset
//!
//! [`Orchestrator`] runs them strictly in sequence and returns one
//! [`PipelineResult`](fretcoach_session_model::PipelineResult).
//!
//! [`Metrics`]: fretcoach_session_model::Metrics

pub mod analyzer;
pub mod automator;
pub mod orchestrator;
pub mod stats_sink;

pub use analyzer::{metrics_for_error, simulated_live_metrics, Analyzer};
pub use automator::Automator;
pub use orchestrator::Orchestrator;
pub use stats_sink::{JsonlStatsSink, NoopStatsSink, StatsSink};
