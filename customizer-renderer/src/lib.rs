//! # Customizer Renderer
//!
//! Software implementations of the customizer's collaborators.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ Scene        │───►│ SVG          │───►│ resvg /      │───► PNG capture
//! │ (background, │    │ intermediate │    │ tiny-skia    │
//! │  objects)    │    └──────────────┘    └──────────────┘
//! └──────────────┘
//!
//! PNG captures + JobSheet ───► printpdf ───► A4 job sheet
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod image;
pub mod jobsheet;
pub mod signature;
pub mod surface;

use std::sync::Arc;

pub use crate::image::{source_from_bytes, source_from_file, ImageAssetLoader, ImageFormat};
pub use error::{RenderError, RenderResult};
pub use jobsheet::PdfJobSheetGenerator;
pub use signature::SignaturePad;
pub use surface::{RasterSurface, RasterSurfaceFactory};

use customizer_core::{CanvasSession, CustomizerConfig};

/// Build a session drawing through [`RasterSurface`] and loading images with
/// [`ImageAssetLoader`].
///
/// With `system_fonts` unset, text objects are kept but not drawn in captures.
#[must_use]
pub fn software_session(config: CustomizerConfig, system_fonts: bool) -> CanvasSession {
    let factory = if system_fonts {
        RasterSurfaceFactory::with_system_fonts()
    } else {
        RasterSurfaceFactory::new()
    };
    CanvasSession::new(config, Arc::new(factory), Arc::new(ImageAssetLoader::new()))
}
