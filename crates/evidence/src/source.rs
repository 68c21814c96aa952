//! Video decoding backends.

use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use fretcoach_common::error::{FretcoachError, FretcoachResult};
use image::RgbImage;

/// Decoded frames, in presentation order.
pub type FrameIter = Box<dyn Iterator<Item = RgbImage> + Send>;

/// Trait for video decoders (ffmpeg, in-memory fakes, ...).
pub trait FrameSource: Send + Sync {
    /// Open `path` and stream its frames at `size`x`size`.
    ///
    /// Dropping the iterator early must release the decoder.
    fn open(&self, path: &Path, size: u32) -> FretcoachResult<FrameIter>;

    /// Check if this source can run on the system.
    fn is_available(&self) -> bool;

    /// Source name.
    fn name(&self) -> &str;
}

/// Decodes through an `ffmpeg` child process writing rgb24 to stdout.
#[derive(Debug, Clone)]
pub struct FfmpegFrameSource {
    ffmpeg_path: String,
}

impl FfmpegFrameSource {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    fn build_args(path: &Path, size: u32) -> Vec<String> {
        vec![
            "-nostdin".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-i".to_string(),
            path.to_string_lossy().into_owned(),
            "-an".to_string(),
            "-vf".to_string(),
            format!("scale={size}:{size}"),
            "-fps_mode".to_string(),
            "passthrough".to_string(),
            "-f".to_string(),
            "rawvideo".to_string(),
            "-pix_fmt".to_string(),
            "rgb24".to_string(),
            "pipe:1".to_string(),
        ]
    }
}

impl Default for FfmpegFrameSource {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FrameSource for FfmpegFrameSource {
    fn open(&self, path: &Path, size: u32) -> FretcoachResult<FrameIter> {
        if !path.exists() {
            return Err(FretcoachError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        if size == 0 {
            return Err(FretcoachError::config("Frame size must be positive"));
        }

        let args = Self::build_args(path, size);
        tracing::debug!(ffmpeg = %self.ffmpeg_path, ?args, "Spawning ffmpeg decoder");

        let mut child = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| FretcoachError::unsupported(format!("Failed to start ffmpeg: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| FretcoachError::unsupported("Failed to capture ffmpeg stdout"))?;

        Ok(Box::new(RawFrameReader {
            child,
            stdout,
            size,
            frames_read: 0,
        }))
    }

    fn is_available(&self) -> bool {
        Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Reads fixed-size rgb24 frames from a decoder's stdout.
struct RawFrameReader {
    child: Child,
    stdout: ChildStdout,
    size: u32,
    frames_read: u64,
}

impl Iterator for RawFrameReader {
    type Item = RgbImage;

    fn next(&mut self) -> Option<RgbImage> {
        let frame_len = self.size as usize * self.size as usize * 3;
        let mut buf = vec![0u8; frame_len];
        match self.stdout.read_exact(&mut buf) {
            Ok(()) => {
                self.frames_read += 1;
                RgbImage::from_raw(self.size, self.size, buf)
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                tracing::debug!(frames = self.frames_read, "Decoder stream ended");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, frames = self.frames_read, "Failed reading decoded frame");
                None
            }
        }
    }
}

impl Drop for RawFrameReader {
    fn drop(&mut self) {
        // The sampler stops reading at its cap; ffmpeg would otherwise block
        // on a full pipe forever.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
