//! Evenly spaced, bounded frame sampling.

use std::path::Path;
use std::sync::Arc;

use fretcoach_common::config::SamplingConfig;
use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::source::{FfmpegFrameSource, FrameSource};

/// A square color still taken from a video.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Position within the sampled sequence.
    pub index: usize,

    /// Position within the decoded source stream.
    pub source_index: usize,

    pub image: RgbImage,
}

/// Samples every `stride`-th frame of a video, up to `max_frames`.
#[derive(Clone)]
pub struct FrameSampler {
    source: Arc<dyn FrameSource>,
    stride: usize,
    max_frames: usize,
    frame_size: u32,
}

impl FrameSampler {
    pub fn new(
        source: Arc<dyn FrameSource>,
        stride: usize,
        max_frames: usize,
        frame_size: u32,
    ) -> Self {
        Self {
            source,
            stride: stride.max(1),
            max_frames,
            frame_size: frame_size.max(1),
        }
    }

    /// Sampler backed by ffmpeg, configured from [`SamplingConfig`].
    pub fn from_config(config: &SamplingConfig) -> Self {
        Self::new(
            Arc::new(FfmpegFrameSource::new(config.ffmpeg_path.clone())),
            config.stride,
            config.max_frames,
            config.frame_size,
        )
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    pub fn source(&self) -> &dyn FrameSource {
        self.source.as_ref()
    }

    /// Sample frames from the video at `path`.
    ///
    /// An unreadable or undecodable video yields an empty sequence rather
    /// than an error; callers treat that as insufficient evidence.
    pub fn sample(&self, path: &Path) -> Vec<Frame> {
        let frames = match self.source.open(path, self.frame_size) {
            Ok(frames) => frames,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    source = self.source.name(),
                    error = %e,
                    "Could not open video for sampling"
                );
                return Vec::new();
            }
        };

        let sampled = select_frames(frames, self.stride, self.max_frames, self.frame_size);
        tracing::info!(
            path = %path.display(),
            frames = sampled.len(),
            stride = self.stride,
            max_frames = self.max_frames,
            "Sampled video frames"
        );
        sampled
    }
}

impl std::fmt::Debug for FrameSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSampler")
            .field("source", &self.source.name())
            .field("stride", &self.stride)
            .field("max_frames", &self.max_frames)
            .field("frame_size", &self.frame_size)
            .finish()
    }
}

/// Keep every `stride`-th frame of `frames`, resized to `size`x`size`.
///
/// Stops pulling from `frames` as soon as `max_frames` are kept, so an
/// unbounded source is fine. A zero stride is treated as one.
pub fn select_frames<I>(frames: I, stride: usize, max_frames: usize, size: u32) -> Vec<Frame>
where
    I: IntoIterator<Item = RgbImage>,
{
    let stride = stride.max(1);
    let mut sampled = Vec::with_capacity(max_frames.min(64));
    if max_frames == 0 {
        return sampled;
    }

    for (source_index, image) in frames.into_iter().enumerate() {
        if source_index % stride != 0 {
            continue;
        }

        let image = if image.dimensions() == (size, size) {
            image
        } else {
            imageops::resize(&image, size, size, FilterType::Triangle)
        };

        sampled.push(Frame {
            index: sampled.len(),
            source_index,
            image,
        });

        if sampled.len() >= max_frames {
            break;
        }
    }

    sampled
}
