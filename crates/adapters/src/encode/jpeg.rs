use image::codecs::jpeg::JpegEncoder;
use image::ColorType;
use livi_media_application::{ApplicationError, Frame, FrameEncoder};

#[derive(Debug, Default, Clone, Copy)]
pub struct ImageJpegEncoder;

impl FrameEncoder for ImageJpegEncoder {
    fn encode_jpeg(&self, frame: &Frame, quality: u8) -> Result<Vec<u8>, ApplicationError> {
        let expected = frame.width as usize * frame.height as usize * 3;
        if frame.rgb.len() != expected {
            return Err(ApplicationError::Encode(format!(
                "frame buffer holds {} bytes, expected {expected} for {}x{}",
                frame.rgb.len(),
                frame.width,
                frame.height
            )));
        }

        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
            .encode(&frame.rgb, frame.width, frame.height, ColorType::Rgb8)
            .map_err(|error| ApplicationError::Encode(error.to_string()))?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32, height: u32) -> Frame {
        Frame {
            width,
            height,
            rgb: vec![128; (width * height * 3) as usize],
        }
    }

    #[test]
    fn encodes_a_decodable_jpeg() {
        let bytes = ImageJpegEncoder.encode_jpeg(&frame(16, 9), 90).expect("encode");

        assert!(bytes.starts_with(&[0xFF, 0xD8]));
        let decoded = image::load_from_memory(&bytes).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (16, 9));
    }

    #[test]
    fn rejects_a_short_buffer() {
        let mut broken = frame(4, 4);
        broken.rgb.truncate(10);

        let error = ImageJpegEncoder.encode_jpeg(&broken, 90).expect_err("short");
        assert!(matches!(error, ApplicationError::Encode(_)));
    }
}
