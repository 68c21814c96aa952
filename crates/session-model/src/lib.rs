//! FretCoach Session Model
//!
//! Defines the data contracts passed between pipeline stages:
//! - **Input:** What a run analyzes (an uploaded video or a simulated live burst)
//! - **Metrics:** The Analyzer's typed view of one playing attempt
//! - **Feedback:** Statistics, coaching output, audio locator, and the composite result
//!
//! Every record is plain data, created once per run and passed by value
//! from one stage to the next.

pub mod feedback;
pub mod input;
pub mod metrics;

pub use feedback::*;
pub use input::*;
pub use metrics::*;
