//! Write a default config file.

use std::path::PathBuf;

use fretcoach_common::config::{config_file_path, AppConfig};

pub fn run(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config_file_path);
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    AppConfig::default()
        .save_to(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;

    println!("Config written to {}", path.display());
    println!("Set model.api_key and speech.api_key, or export GEMINI_API_KEY and GOOGLE_TTS_API_KEY.");
    Ok(())
}
