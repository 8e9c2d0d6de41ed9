//! Image loading utilities.
//!
//! Supports loading images from files, raw bytes, and data URIs.

use std::path::Path;

use async_trait::async_trait;
use customizer_core::{AssetLoader, CustomizerResult, ImageSource, LoadedImage};

use crate::error::{RenderError, RenderResult};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// GIF (first frame only).
    Gif,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "webp" => Self::WebP,
            "gif" => Self::Gif,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // GIF: "GIF8"
        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }

    /// MIME type for data URIs.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Decode image bytes and report their natural size.
///
/// # Errors
///
/// Returns [`RenderError::Decode`] if the bytes are not a decodable image.
pub fn decode_dimensions(data: &[u8]) -> RenderResult<(u32, u32)> {
    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Decode(format!("Failed to decode image: {e}")))?;
    Ok((img.width(), img.height()))
}

/// Wrap image bytes as a data URI, sniffing the format.
///
/// # Errors
///
/// Returns [`RenderError::Decode`] if the format is not recognized.
pub fn source_from_bytes(data: &[u8]) -> RenderResult<ImageSource> {
    let format = ImageFormat::from_magic_bytes(data);
    if format == ImageFormat::Unknown {
        return Err(RenderError::Decode("Unrecognized image format".to_string()));
    }
    Ok(ImageSource::from_bytes(format.mime(), data))
}

/// Read an image file into a data URI.
///
/// The format is sniffed from the content, falling back to the extension.
///
/// # Errors
///
/// Returns [`RenderError::Decode`] if the file cannot be read or is not an
/// image.
pub fn source_from_file(path: impl AsRef<Path>) -> RenderResult<ImageSource> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| RenderError::Decode(format!("Failed to read {}: {e}", path.display())))?;
    let format = match ImageFormat::from_magic_bytes(&data) {
        ImageFormat::Unknown => path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(ImageFormat::Unknown, ImageFormat::from_extension),
        sniffed => sniffed,
    };
    if format == ImageFormat::Unknown {
        return Err(RenderError::Decode(format!(
            "{} is not a supported image",
            path.display()
        )));
    }
    Ok(ImageSource::from_bytes(format.mime(), &data))
}

/// Loads images by decoding their data URI payloads with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageAssetLoader;

impl ImageAssetLoader {
    /// Create a loader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AssetLoader for ImageAssetLoader {
    async fn load(&self, source: &ImageSource) -> CustomizerResult<LoadedImage> {
        let bytes = source.decode()?;
        let (width, height) = decode_dimensions(&bytes)?;
        tracing::debug!("Loaded {} image {width}x{height}", source.mime());
        Ok(LoadedImage {
            source: source.clone(),
            width,
            height,
        })
    }
}
