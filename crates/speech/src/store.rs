//! Audio persistence.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncWrite, AsyncWriteExt};

use fretcoach_common::config::{AudioEncoding, StorageConfig};
use fretcoach_common::error::{FretcoachError, FretcoachResult};

/// Persists synthesized audio and hands back a locator.
#[async_trait::async_trait]
pub trait AudioStore: Send + Sync {
    /// Store `audio` under a fresh, unique name and return its locator.
    async fn put(&self, audio: &[u8], encoding: AudioEncoding) -> FretcoachResult<String>;
}

/// Writes `feedback-<uuid>.<ext>` files into a directory.
#[derive(Debug, Clone)]
pub struct LocalAudioStore {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalAudioStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.audio_dir.clone(), config.url_prefix.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Locator for a stored file name.
    pub fn locator(&self, file_name: &str) -> String {
        let prefix = self.url_prefix.trim_end_matches('/');
        format!("{prefix}/{file_name}")
    }
}

/// Generate a collision-free audio file name.
pub fn unique_file_name(encoding: AudioEncoding) -> String {
    format!("feedback-{}.{}", uuid::Uuid::new_v4(), encoding.extension())
}

#[async_trait::async_trait]
impl AudioStore for LocalAudioStore {
    async fn put(&self, audio: &[u8], encoding: AudioEncoding) -> FretcoachResult<String> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            FretcoachError::storage(format!(
                "Failed to create audio directory {}: {e}",
                self.dir.display()
            ))
        })?;

        let file_name = unique_file_name(encoding);
        let path = self.dir.join(&file_name);

        // create_new: never overwrite another run's audio.
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                FretcoachError::storage(format!("Failed to create {}: {e}", path.display()))
            })?;

        write_or_discard(&path, &mut file, audio).await?;

        tracing::info!(path = %path.display(), bytes = audio.len(), "Audio stored");
        Ok(self.locator(&file_name))
    }
}

/// Write and flush `audio`, removing the file at `path` if either fails.
async fn write_or_discard<W>(path: &Path, writer: &mut W, audio: &[u8]) -> FretcoachResult<()>
where
    W: AsyncWrite + Unpin,
{
    let result = match writer.write_all(audio).await {
        Ok(()) => writer.flush().await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %remove_err, "Failed to remove partial audio file");
        }
        return Err(FretcoachError::storage(format!(
            "Failed to write {}: {e}",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Accepts nothing; every write fails.
    struct BrokenWriter;

    impl AsyncWrite for BrokenWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Err(std::io::Error::other("disk full")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn temp_store(name: &str) -> LocalAudioStore {
        let dir = std::env::temp_dir().join(format!(
            "fretcoach-store-{name}-{}",
            uuid::Uuid::new_v4()
        ));
        LocalAudioStore::new(dir, "/feedback/")
    }

    #[test]
    fn test_unique_file_names() {
        let a = unique_file_name(AudioEncoding::Mp3);
        let b = unique_file_name(AudioEncoding::Mp3);
        assert_ne!(a, b);
        assert!(a.starts_with("feedback-"));
        assert!(a.ends_with(".mp3"));
        assert!(unique_file_name(AudioEncoding::OggOpus).ends_with(".ogg"));
    }

    #[tokio::test]
    async fn test_put_writes_file_and_returns_locator() {
        let store = temp_store("put");
        let locator = store.put(b"ID3audio", AudioEncoding::Mp3).await.unwrap();

        assert!(locator.starts_with("/feedback/feedback-"));
        let file_name = locator.rsplit('/').next().unwrap();
        let bytes = std::fs::read(store.dir().join(file_name)).unwrap();
        assert_eq!(bytes, b"ID3audio");

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn test_concurrent_puts_do_not_collide() {
        let store = temp_store("concurrent");
        let (a, b) = tokio::join!(
            store.put(b"first", AudioEncoding::Mp3),
            store.put(b"second", AudioEncoding::Mp3)
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a, b);
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 2);

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn test_failed_write_removes_partial_file() {
        let store = temp_store("partial");
        std::fs::create_dir_all(store.dir()).unwrap();
        let path = store.dir().join(unique_file_name(AudioEncoding::Mp3));
        std::fs::write(&path, b"ID3").unwrap();

        let err = write_or_discard(&path, &mut BrokenWriter, b"ID3audio")
            .await
            .unwrap_err();
        assert!(matches!(err, FretcoachError::Storage { .. }));
        assert!(err.to_string().contains("disk full"));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 0);

        let _ = std::fs::remove_dir_all(store.dir());
    }
}
