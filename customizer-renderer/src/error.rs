//! Renderer error types.

use customizer_core::CustomizerError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Image bytes could not be read or decoded.
    #[error("Failed to load image: {0}")]
    Decode(String),

    /// The intermediate SVG could not be parsed.
    #[error("SVG parsing failed: {0}")]
    Svg(String),

    /// Rasterization or PNG encoding failed.
    #[error("Rasterization failed: {0}")]
    Raster(String),

    /// PDF layout or encoding failed.
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    /// The surface was used after disposal.
    #[error("Surface disposed")]
    Disposed,
}

impl From<RenderError> for CustomizerError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Decode(msg) => Self::AssetLoad(msg),
            RenderError::Svg(_) | RenderError::Raster(_) | RenderError::Disposed => {
                Self::Capture(err.to_string())
            }
            RenderError::Pdf(msg) => Self::DocumentGeneration(msg),
        }
    }
}
