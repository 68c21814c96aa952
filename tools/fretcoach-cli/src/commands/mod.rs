pub mod analyze;
pub mod check;
pub mod init;
pub mod live;
pub mod parse;

use fretcoach_session_model::{Metrics, PipelineResult};

/// Print a pipeline result, as pretty JSON or as a short report.
pub fn print_result(result: &PipelineResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    print_metrics(&result.metrics);
    println!();
    println!("Errors: {}", result.stats.error_count);
    println!("Improvement: {}%", result.stats.improvement_pct);
    println!();
    println!("Feedback: {}", result.coach.feedback_text);
    println!("Drill:");
    for line in result.coach.drill.lines() {
        println!("  {line}");
    }
    if result.coach.navigate_skills {
        println!("Suggestion: browse the skills catalog for targeted drills.");
    }
    println!();
    println!("Audio: {}", result.audio_url);
    Ok(())
}

pub fn print_metrics(metrics: &Metrics) {
    if let Some(error) = &metrics.error {
        println!("Analysis error: {error}");
    }
    println!("Chord: {}", metrics.chord);
    println!("Accuracy: {}%", metrics.accuracy);
    if metrics.flaws.is_empty() {
        println!("Flaws: none");
    } else {
        println!("Flaws:");
        for flaw in &metrics.flaws {
            match flaw.timestamp_seconds {
                Some(t) => println!("  - {} (at {t:.1}s)", flaw.description),
                None => println!("  - {}", flaw.description),
            }
            if !flaw.tip.is_empty() {
                println!("      tip: {}", flaw.tip);
            }
        }
    }
    if !metrics.progress_history.is_empty() {
        let history: Vec<String> = metrics
            .progress_history
            .iter()
            .map(|v| v.to_string())
            .collect();
        println!("Progress: {}", history.join(" -> "));
    }
}
