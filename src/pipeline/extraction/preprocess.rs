//! Image normalization ahead of OCR.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};

use super::ExtractionError;

/// Width every image is scaled to before OCR; height follows the aspect ratio.
pub const OCR_TARGET_WIDTH: u32 = 1000;

/// Decode, scale to [`OCR_TARGET_WIDTH`], convert to grayscale and re-encode
/// as PNG.
pub fn normalize_for_ocr(image_bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    let img = image::load_from_memory(image_bytes)
        .map_err(|e| ExtractionError::ImageProcessing(format!("Decode failed: {e}")))?;

    let (width, height) = img.dimensions();
    let (new_w, new_h) = compute_target_dimensions(width, height, OCR_TARGET_WIDTH);

    tracing::debug!(
        from = format!("{width}x{height}"),
        to = format!("{new_w}x{new_h}"),
        "Normalizing image for OCR"
    );

    let resized = img.resize_exact(new_w, new_h, FilterType::CatmullRom);
    encode_png(&DynamicImage::ImageLuma8(resized.to_luma8()))
}

/// Scale to a fixed width, preserving aspect ratio. Never returns a zero edge.
pub fn compute_target_dimensions(width: u32, height: u32, target_width: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (target_width.max(1), 1);
    }
    let scale = target_width as f64 / width as f64;
    let new_h = ((height as f64 * scale).round() as u32).max(1);
    (target_width.max(1), new_h)
}

pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ExtractionError> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageOutputFormat::Png)
        .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::make_test_png;

    #[test]
    fn target_dimensions_preserve_aspect() {
        assert_eq!(compute_target_dimensions(2000, 1000, 1000), (1000, 500));
        assert_eq!(compute_target_dimensions(500, 700, 1000), (1000, 1400));
        assert_eq!(compute_target_dimensions(0, 10, 1000), (1000, 1));
    }

    #[test]
    fn normalized_image_is_grayscale_png_at_target_width() {
        let png = make_test_png(200, 100);
        let out = normalize_for_ocr(&png).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.dimensions(), (1000, 500));
        assert!(matches!(decoded, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn garbage_bytes_rejected() {
        let err = normalize_for_ocr(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ExtractionError::ImageProcessing(_)));
    }
}
