//! Image codec service
//!
//! Decoding, PNG encoding and base64 transport encoding live here so the
//! pipeline and the enhancement adapter share one implementation.

use crate::error::{Result, StudioError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;

/// MIME prefix of the data URLs returned to callers
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Service for converting between raw bytes and in-memory images
pub struct ImageIOService;

impl ImageIOService {
    /// Decode encoded image bytes, sniffing the format from content
    ///
    /// # Errors
    /// - `Decode` for empty, truncated or unrecognized input
    pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
        if bytes.is_empty() {
            return Err(StudioError::decode("Source image is empty (0 bytes)"));
        }

        image::load_from_memory(bytes).map_err(|e| {
            let format = image::guess_format(bytes)
                .map_or_else(|_| "unknown".to_string(), |f| format!("{:?}", f));
            StudioError::decode(format!(
                "Failed to decode image ({} bytes, format: {}): {}",
                bytes.len(),
                format,
                e
            ))
        })
    }

    /// Decode encoded image bytes into an RGBA buffer
    ///
    /// Opaque inputs receive a fully opaque alpha channel.
    ///
    /// # Errors
    /// - `Decode` for malformed input
    pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage> {
        Ok(Self::decode(bytes)?.to_rgba8())
    }

    /// Encode an image as PNG
    ///
    /// # Errors
    /// - `Encode` when the PNG encoder rejects the buffer
    pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| StudioError::encode(format!("Failed to encode PNG: {}", e)))?;
        Ok(buffer.into_inner())
    }

    /// Encode an image as a base64 PNG string (no data URL prefix)
    ///
    /// # Errors
    /// - `Encode` when PNG encoding fails
    pub fn encode_png_base64(image: &DynamicImage) -> Result<String> {
        Ok(BASE64.encode(Self::encode_png(image)?))
    }

    /// Encode an image as a `data:image/png;base64,` URL
    ///
    /// # Errors
    /// - `Encode` when PNG encoding fails
    pub fn encode_png_data_url(image: &DynamicImage) -> Result<String> {
        Ok(format!(
            "{}{}",
            PNG_DATA_URL_PREFIX,
            Self::encode_png_base64(image)?
        ))
    }

    /// Decode a base64 image payload
    ///
    /// Accepts bare base64 as well as a full data URL.
    ///
    /// # Errors
    /// - `Decode` when the payload is not base64 or not an image
    pub fn decode_base64(payload: &str) -> Result<DynamicImage> {
        let encoded = payload
            .split_once(";base64,")
            .map_or(payload, |(_, data)| data)
            .trim();
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| StudioError::decode(format!("Invalid base64 image payload: {}", e)))?;
        Self::decode(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba};

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            ImageIOService::decode(&[]),
            Err(StudioError::Decode(_))
        ));
        let err = ImageIOService::decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, StudioError::Decode(_)));
        assert!(err.to_string().contains("23 bytes"));
    }

    #[test]
    fn test_decode_rgba_adds_opaque_alpha() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([255, 0, 0])));
        let bytes = ImageIOService::encode_png(&rgb).unwrap();
        let rgba = ImageIOService::decode_rgba(&bytes).unwrap();
        assert!(rgba.pixels().all(|p| *p == Rgba([255, 0, 0, 255])));
    }

    #[test]
    fn test_data_url_shape() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(3, 2));
        let url = ImageIOService::encode_png_data_url(&image).unwrap();
        assert!(url.starts_with(PNG_DATA_URL_PREFIX));

        let decoded = ImageIOService::decode_base64(&url).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }

    #[test]
    fn test_decode_base64_rejects_invalid_payload() {
        assert!(matches!(
            ImageIOService::decode_base64("@@not-base64@@"),
            Err(StudioError::Decode(_))
        ));
    }
}
