//! Optional persistence of per-run statistics.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use fretcoach_common::error::{FretcoachError, FretcoachResult};
use fretcoach_session_model::Stats;

/// Receives statistics after each run. Failures are logged by the caller
/// and never abort the pipeline.
#[async_trait::async_trait]
pub trait StatsSink: Send + Sync {
    async fn record(&self, user_id: &str, stats: &Stats) -> FretcoachResult<()>;
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStatsSink;

#[async_trait::async_trait]
impl StatsSink for NoopStatsSink {
    async fn record(&self, _user_id: &str, _stats: &Stats) -> FretcoachResult<()> {
        Ok(())
    }
}

/// One line of the stats file.
#[derive(Debug, Serialize)]
struct StatsRecord<'a> {
    timestamp: DateTime<Utc>,
    user_id: &'a str,
    errors: usize,
    improvement: u8,
}

/// Appends one JSON object per run to a file.
#[derive(Debug)]
pub struct JsonlStatsSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlStatsSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl StatsSink for JsonlStatsSink {
    async fn record(&self, user_id: &str, stats: &Stats) -> FretcoachResult<()> {
        let record = StatsRecord {
            timestamp: Utc::now(),
            user_id,
            errors: stats.error_count,
            improvement: stats.improvement_pct,
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                FretcoachError::storage(format!("Failed to open {}: {e}", self.path.display()))
            })?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
