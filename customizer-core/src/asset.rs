//! Image sources and the asynchronous asset loading seam.
//!
//! Uploaded product photos, artwork, signatures and captures all travel as
//! data URIs (`data:image/png;base64,...`) so they serialize into design
//! records without side files.

use std::fmt;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::{CustomizerError, CustomizerResult};

/// An image reference carried as a data URI.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSource(String);

impl ImageSource {
    /// Wrap an existing data URI.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::AssetLoad`] if the string is not a data URI.
    pub fn from_data_uri(uri: impl Into<String>) -> CustomizerResult<Self> {
        let uri = uri.into();
        if !uri.starts_with("data:") || !uri.contains(',') {
            return Err(CustomizerError::AssetLoad("Not a data URI".to_string()));
        }
        Ok(Self(uri))
    }

    /// Encode raw bytes as a base64 data URI with the given MIME type.
    #[must_use]
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self(format!("data:{mime};base64,{encoded}"))
    }

    /// Encode PNG bytes.
    #[must_use]
    pub fn png(bytes: &[u8]) -> Self {
        Self::from_bytes("image/png", bytes)
    }

    /// The full data URI.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// MIME type declared in the URI header.
    #[must_use]
    pub fn mime(&self) -> &str {
        let header = self.body().split(',').next().unwrap_or_default();
        header.split(';').next().unwrap_or_default()
    }

    fn body(&self) -> &str {
        self.0.strip_prefix("data:").unwrap_or(&self.0)
    }

    /// Decode the payload bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::AssetLoad`] if the payload is not valid base64.
    pub fn decode(&self) -> CustomizerResult<Vec<u8>> {
        let (header, payload) = self
            .body()
            .split_once(',')
            .ok_or_else(|| CustomizerError::AssetLoad("Invalid data URI: missing comma".into()))?;
        if !header.contains(";base64") {
            return Ok(payload.as_bytes().to_vec());
        }
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| CustomizerError::AssetLoad(format!("Failed to decode base64: {e}")))
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Payloads run to megabytes; show the header and size only.
        write!(f, "ImageSource({}, {} bytes)", self.mime(), self.0.len())
    }
}

/// A decoded image ready to be placed on a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    /// The source that was decoded.
    pub source: ImageSource,
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
}

/// Decodes image sources before they can be added to a surface.
///
/// This is the first of the session's suspension points.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Decode a source and report its natural dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::AssetLoad`] if the image cannot be decoded.
    async fn load(&self, source: &ImageSource) -> CustomizerResult<LoadedImage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_round_trip_through_data_uri() {
        let source = ImageSource::png(&[1, 2, 3, 250]);
        assert!(source.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(source.mime(), "image/png");
        assert_eq!(source.decode().expect("decode"), vec![1, 2, 3, 250]);
    }

    #[test]
    fn test_rejects_non_data_uri() {
        assert!(ImageSource::from_data_uri("https://example.com/a.png").is_err());
        assert!(ImageSource::from_data_uri("data:image/png;base64").is_err());
    }

    #[test]
    fn test_invalid_base64_is_asset_error() {
        let source = ImageSource::from_data_uri("data:image/png;base64,@@@").expect("uri");
        assert!(matches!(source.decode(), Err(CustomizerError::AssetLoad(_))));
    }

    #[test]
    fn test_debug_does_not_dump_payload() {
        let source = ImageSource::png(&[0; 64]);
        let debug = format!("{source:?}");
        assert!(debug.starts_with("ImageSource(image/png"));
        assert!(!debug.contains("AAAA"));
    }
}
