//! Session statistics.

use fretcoach_session_model::{Metrics, Stats};

/// Derive statistics from one attempt's metrics.
///
/// Accuracy doubles as the improvement signal. Error-tagged metrics report
/// zero improvement.
pub fn derive(metrics: &Metrics) -> Stats {
    let improvement_pct = if metrics.is_error() {
        0
    } else {
        metrics.accuracy
    };

    Stats {
        error_count: metrics.flaws.len(),
        improvement_pct,
    }
}
