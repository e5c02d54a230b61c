//! Off-screen raster for camera frames and JPEG encoding.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::RgbImage;
use tracing::debug;

use crate::error::{Result, WattCompareError};

/// Draw `frame` onto a raster of `width`x`height`.
///
/// Frames already at the raster size are used as-is; anything else is
/// scaled to fill it.
pub fn draw_frame(frame: RgbImage, width: u32, height: u32) -> RgbImage {
    if frame.width() == width && frame.height() == height {
        return frame;
    }
    debug!(
        "Scaling {}x{} frame onto {}x{} raster",
        frame.width(),
        frame.height(),
        width,
        height
    );
    image::imageops::resize(&frame, width, height, FilterType::Triangle)
}

/// Encode a raster as JPEG at `quality` (1-100).
pub fn encode_jpeg(raster: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    raster
        .write_with_encoder(encoder)
        .map_err(|e| WattCompareError::Image(format!("JPEG encoding failed: {}", e)))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| image::Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
    }

    #[test]
    fn test_draw_frame_same_size_untouched() {
        let frame = gradient(64, 48);
        let raster = draw_frame(frame.clone(), 64, 48);
        assert_eq!(raster, frame);
    }

    #[test]
    fn test_draw_frame_scales_to_raster() {
        let raster = draw_frame(gradient(320, 240), 640, 480);
        assert_eq!(raster.dimensions(), (640, 480));
    }

    #[test]
    fn test_encode_jpeg_magic() {
        let bytes = encode_jpeg(&gradient(32, 32), 90).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let raster = gradient(128, 128);
        let high = encode_jpeg(&raster, 95).unwrap();
        let low = encode_jpeg(&raster, 10).unwrap();
        assert!(low.len() < high.len());
    }
}
