//! Check that the pipeline's collaborators are usable.

use std::path::PathBuf;

use fretcoach_common::config::{config_file_path, AppConfig};
use fretcoach_evidence::{FfmpegFrameSource, FrameSource};

pub fn run(config: &AppConfig, explicit_path: Option<PathBuf>) -> anyhow::Result<()> {
    println!("FretCoach System Check");
    println!("{}", "=".repeat(50));

    let config_path = explicit_path.unwrap_or_else(config_file_path);
    if config_path.exists() {
        println!("[OK] Config: {}", config_path.display());
    } else {
        println!("[INFO] Config: defaults (run `fretcoach init` to create one)");
    }

    let ffmpeg = FfmpegFrameSource::new(config.sampling.ffmpeg_path.clone());
    let ffmpeg_ok = ffmpeg.is_available();
    if ffmpeg_ok {
        println!("[OK] Video decoder: {}", config.sampling.ffmpeg_path);
    } else {
        println!(
            "[FAIL] Video decoder: '{}' not found. Install ffmpeg or set sampling.ffmpeg_path.",
            config.sampling.ffmpeg_path
        );
    }

    let model_ok = !config.model.api_key.trim().is_empty();
    if model_ok {
        println!("[OK] Model: {} ({})", config.model.model, config.model.endpoint);
    } else {
        println!("[FAIL] Model: no API key. Set GEMINI_API_KEY or model.api_key.");
    }

    let speech_ok = !config.speech.api_key.trim().is_empty();
    if speech_ok {
        println!(
            "[OK] Speech: {} / {}",
            config.speech.language_code, config.speech.voice_name
        );
    } else {
        println!("[FAIL] Speech: no API key. Set GOOGLE_TTS_API_KEY or speech.api_key.");
    }

    println!("[INFO] Audio directory: {}", config.storage.audio_dir.display());
    match &config.stats.sink_path {
        Some(path) => println!("[INFO] Stats file: {}", path.display()),
        None => println!("[INFO] Stats file: disabled"),
    }

    println!();
    if ffmpeg_ok && model_ok && speech_ok {
        println!("All required capabilities are available. FretCoach is ready.");
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
    }

    Ok(())
}
