//! Frame to model-ready image encoding.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::codecs::jpeg::JpegEncoder;

use fretcoach_common::error::{FretcoachError, FretcoachResult};

use crate::sampler::Frame;

const JPEG_QUALITY: u8 = 85;

/// An encoded still, ready to inline into a model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// MIME type of the decoded bytes.
    pub mime_type: String,

    /// Base64 (standard alphabet) image bytes.
    pub data: String,
}

/// Encode one frame as base64 JPEG.
pub fn encode_frame(frame: &Frame) -> FretcoachResult<EncodedImage> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .encode_image(&frame.image)
        .map_err(|e| {
            FretcoachError::unsupported(format!("Failed to encode frame {}: {e}", frame.index))
        })?;

    Ok(EncodedImage {
        mime_type: "image/jpeg".to_string(),
        data: BASE64.encode(&bytes),
    })
}

/// Encode frames in order. Frames that fail to encode are skipped.
pub fn encode_frames(frames: &[Frame]) -> Vec<EncodedImage> {
    frames
        .iter()
        .filter_map(|frame| match encode_frame(frame) {
            Ok(encoded) => Some(encoded),
            Err(e) => {
                tracing::warn!(index = frame.index, error = %e, "Dropping unencodable frame");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn frame(index: usize, shade: u8) -> Frame {
        Frame {
            index,
            source_index: index * 5,
            image: RgbImage::from_pixel(224, 224, Rgb([shade, 0, 255 - shade])),
        }
    }

    #[test]
    fn test_encodes_jpeg() {
        let encoded = encode_frame(&frame(0, 40)).unwrap();
        assert_eq!(encoded.mime_type, "image/jpeg");
        let bytes = BASE64.decode(&encoded.data).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (224, 224));
    }

    #[test]
    fn test_preserves_order() {
        let frames = vec![frame(0, 0), frame(1, 128), frame(2, 255)];
        let encoded = encode_frames(&frames);
        assert_eq!(encoded.len(), 3);

        let expected: Vec<EncodedImage> = frames
            .iter()
            .map(|f| encode_frame(f).unwrap())
            .collect();
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_empty_input() {
        assert!(encode_frames(&[]).is_empty());
    }
}
