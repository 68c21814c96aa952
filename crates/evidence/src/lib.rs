//! FretCoach Evidence
//!
//! Turns a practice video into model-ready evidence:
//! - **Sampling:** decode the video and keep every Nth frame, up to a cap,
//!   resized to a fixed square
//! - **Encoding:** compress sampled frames to base64 JPEG for the model call
//!
//! Decoding sits behind [`FrameSource`]; the production source pipes raw
//! RGB frames out of `ffmpeg`.

pub mod encoder;
pub mod sampler;
pub mod source;

pub use encoder::{encode_frames, EncodedImage};
pub use sampler::{select_frames, Frame, FrameSampler};
pub use source::{FfmpegFrameSource, FrameIter, FrameSource};
