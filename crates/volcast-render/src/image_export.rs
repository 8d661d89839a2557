//! Writing packed pixels to image files.

use std::path::Path;

use image::{ImageBuffer, Rgba};
use volcast_core::to_rgba_bytes;

/// Saves packed RGBA pixels to an image file.
///
/// The format follows the extension: `.png`, or `.jpg`/`.jpeg` (alpha
/// dropped). Row 0 is the top of the image.
pub fn save_packed_pixels(
    path: impl AsRef<Path>,
    pixels: &[u32],
    width: u32,
    height: u32,
) -> Result<(), ImageExportError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let img = to_image(pixels, width, height)?;

    match extension.as_str() {
        "png" => {
            img.save_with_format(path, image::ImageFormat::Png)?;
        }
        "jpg" | "jpeg" => {
            let rgb_img = image::DynamicImage::ImageRgba8(img).to_rgb8();
            rgb_img.save_with_format(path, image::ImageFormat::Jpeg)?;
        }
        _ => {
            return Err(ImageExportError::UnsupportedFormat(extension));
        }
    }

    log::info!("wrote {width}x{height} image to {}", path.display());
    Ok(())
}

/// Encodes packed RGBA pixels as PNG bytes in memory.
pub fn encode_png(pixels: &[u32], width: u32, height: u32) -> Result<Vec<u8>, ImageExportError> {
    let img = to_image(pixels, width, height)?;
    let mut buffer = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

fn to_image(
    pixels: &[u32],
    width: u32,
    height: u32,
) -> Result<ImageBuffer<Rgba<u8>, Vec<u8>>, ImageExportError> {
    let expected = width as usize * height as usize;
    if pixels.len() != expected {
        return Err(ImageExportError::SizeMismatch {
            expected,
            actual: pixels.len(),
        });
    }
    ImageBuffer::from_raw(width, height, to_rgba_bytes(pixels)).ok_or(ImageExportError::InvalidImageData)
}

/// Error type for image export.
#[derive(Debug, thiserror::Error)]
pub enum ImageExportError {
    #[error("failed to write image: {0}")]
    IoError(#[from] std::io::Error),

    #[error("image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("unsupported image format: {0:?}")]
    UnsupportedFormat(String),

    #[error("expected {expected} pixels, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("invalid image data")]
    InvalidImageData,
}
