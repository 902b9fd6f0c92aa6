use std::io::Cursor;

use image::{ImageFormat, ImageReader};

use super::MediaError;

/// Allowed image formats for recipe images.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// What an uploaded file turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedImage {
    pub content_type: &'static str,
    /// File extension to store the image under, without the dot
    pub extension: &'static str,
}

/// Detect format from magic bytes, check it's allowed, and fully decode the
/// data so truncated or corrupt files are rejected too.
pub fn inspect_image(data: &[u8]) -> Result<DetectedImage, MediaError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| MediaError::InvalidImage(format!("Failed to read image: {}", e)))?;

    let format = reader
        .format()
        .ok_or_else(|| MediaError::InvalidImage("Could not detect image format".to_string()))?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(MediaError::InvalidImage(format!(
            "Unsupported image format: {:?}. Allowed: JPEG, PNG, GIF, WebP",
            format
        )));
    }

    reader
        .decode()
        .map_err(|e| MediaError::InvalidImage(format!("Failed to decode image: {}", e)))?;

    let extension = format
        .extensions_str()
        .first()
        .copied()
        .unwrap_or("bin");

    Ok(DetectedImage {
        content_type: format.to_mime_type(),
        extension,
    })
}
