//! Photo preparation
//!
//! Fridge photos are decoded, downscaled and re-encoded as JPEG before being
//! sent inline to the recipe engine.

use std::io::Cursor;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Longest side after preparation, in pixels
pub const MAX_DIMENSION: u32 = 1536;
pub const JPEG_QUALITY: u8 = 85;
pub const JPEG_MIME: &str = "image/jpeg";

/// Photo error types
#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("No image data provided")]
    Empty,

    #[error("Failed to read photo: {0}")]
    Io(#[from] std::io::Error),

    #[error("Photo is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to process image: {0}")]
    Image(#[from] image::ImageError),
}

/// Base64 image data with its mime type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    pub fn jpeg(data: String) -> Self {
        Self {
            mime_type: JPEG_MIME.to_string(),
            data,
        }
    }

    /// `data:<mime>;base64,<data>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Parse a base64 data URL
    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.trim().strip_prefix("data:")?;
        let (mime_type, data) = rest.split_once(";base64,")?;
        Some(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }
}

/// Read and prepare a photo file
pub fn prepare_from_path(path: &Path) -> Result<InlineImage, PhotoError> {
    let bytes = std::fs::read(path)?;
    prepare_bytes(&bytes)
}

/// Prepare a base64 photo; data URLs are accepted
pub fn prepare_from_base64(encoded: &str) -> Result<InlineImage, PhotoError> {
    let trimmed = encoded.trim();
    let payload = InlineImage::from_data_url(trimmed)
        .map(|url| url.data)
        .unwrap_or_else(|| trimmed.to_string());
    let bytes = STANDARD.decode(payload)?;
    prepare_bytes(&bytes)
}

/// Decode, downscale and re-encode raw image bytes
pub fn prepare_bytes(bytes: &[u8]) -> Result<InlineImage, PhotoError> {
    if bytes.is_empty() {
        return Err(PhotoError::Empty);
    }

    let img = image::load_from_memory(bytes)?;
    let img = downscale(img);

    let rgb = img.to_rgb8();
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
        encoder.encode_image(&rgb)?;
    }
    let jpeg = buf.into_inner();

    debug!(
        width = rgb.width(),
        height = rgb.height(),
        bytes = jpeg.len(),
        "Prepared photo"
    );

    Ok(InlineImage::jpeg(STANDARD.encode(jpeg)))
}

fn downscale(img: DynamicImage) -> DynamicImage {
    if img.width().max(img.height()) <= MAX_DIMENSION {
        return img;
    }
    // resize() keeps the aspect ratio within the bounds
    img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 120, 40]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn decoded(prepared: &InlineImage) -> DynamicImage {
        let bytes = STANDARD.decode(&prepared.data).unwrap();
        image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap()
    }

    #[test]
    fn test_large_photo_is_downscaled_to_jpeg() {
        let prepared = prepare_bytes(&png_bytes(2000, 1000)).unwrap();
        assert_eq!(prepared.mime_type, "image/jpeg");
        let img = decoded(&prepared);
        assert_eq!((img.width(), img.height()), (1536, 768));
    }

    #[test]
    fn test_small_photo_keeps_its_size() {
        let prepared = prepare_bytes(&png_bytes(64, 48)).unwrap();
        let img = decoded(&prepared);
        assert_eq!((img.width(), img.height()), (64, 48));
    }

    #[test]
    fn test_base64_and_data_url_input() {
        let encoded = STANDARD.encode(png_bytes(10, 10));
        assert!(prepare_from_base64(&encoded).is_ok());
        assert!(prepare_from_base64(&format!("data:image/png;base64,{}", encoded)).is_ok());
    }

    #[test]
    fn test_bad_input() {
        assert!(matches!(prepare_bytes(&[]), Err(PhotoError::Empty)));
        assert!(matches!(prepare_bytes(b"not an image"), Err(PhotoError::Image(_))));
        assert!(matches!(prepare_from_base64("%%%"), Err(PhotoError::Base64(_))));
        assert!(matches!(
            prepare_from_path(Path::new("/nonexistent/fridge.jpg")),
            Err(PhotoError::Io(_))
        ));
    }

    #[test]
    fn test_data_url_round_trip() {
        let image = InlineImage::jpeg("QUJD".to_string());
        let url = image.to_data_url();
        assert_eq!(url, "data:image/jpeg;base64,QUJD");
        assert_eq!(InlineImage::from_data_url(&url), Some(image));
        assert_eq!(InlineImage::from_data_url("https://example.com/a.jpg"), None);
    }
}
