//! Background normalization.
//!
//! The product photo for a side is fitted into the square canvas and locked.
//! It lives in its own slot on the surface, never in the object list, so
//! selection and deletion logic never see it.

use serde::{Deserialize, Serialize};

use crate::{Geometry, LoadedImage};

/// The locked product photo beneath a side's design objects.
///
/// Immutable once built: a new source means a new layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundLayer {
    image: LoadedImageDocument,
    geometry: Geometry,
}

/// Serializable projection of a [`LoadedImage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LoadedImageDocument {
    source: crate::ImageSource,
    width: u32,
    height: u32,
}

impl BackgroundLayer {
    /// Fit an image into a square canvas of side `canvas_size`.
    ///
    /// `scale = min(S / width, S / height)`, centered on the canvas.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(image: LoadedImage, canvas_size: f32) -> Self {
        let width = image.width.max(1) as f32;
        let height = image.height.max(1) as f32;
        let scale = (canvas_size / width).min(canvas_size / height);
        let center = canvas_size / 2.0;
        Self {
            geometry: Geometry::centered(center, center, width, height).with_scale(scale),
            image: LoadedImageDocument {
                source: image.source,
                width: image.width,
                height: image.height,
            },
        }
    }

    /// The image source.
    #[must_use]
    pub fn source(&self) -> &crate::ImageSource {
        &self.image.source
    }

    /// Natural image dimensions in pixels.
    #[must_use]
    pub fn natural_size(&self) -> (u32, u32) {
        (self.image.width, self.image.height)
    }

    /// Uniform fit scale.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.geometry.scale_x
    }

    /// Placement on the canvas.
    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageSource;

    fn loaded(width: u32, height: u32) -> LoadedImage {
        LoadedImage {
            source: ImageSource::png(&[0]),
            width,
            height,
        }
    }

    #[test]
    fn test_landscape_fits_width() {
        let layer = BackgroundLayer::fit(loaded(1200, 800), 600.0);
        assert!((layer.scale() - 0.5).abs() < f32::EPSILON);
        assert!((layer.geometry().scaled_width() - 600.0).abs() < 0.01);
        assert!((layer.geometry().scaled_height() - 400.0).abs() < 0.01);
    }

    #[test]
    fn test_portrait_fits_height() {
        let layer = BackgroundLayer::fit(loaded(300, 1200), 600.0);
        assert!((layer.scale() - 0.5).abs() < f32::EPSILON);
        assert!((layer.geometry().scaled_height() - 600.0).abs() < 0.01);
    }

    #[test]
    fn test_small_image_scales_up_and_centers() {
        let layer = BackgroundLayer::fit(loaded(150, 100), 600.0);
        assert!((layer.scale() - 4.0).abs() < f32::EPSILON);
        assert!((layer.geometry().center_x - 300.0).abs() < f32::EPSILON);
        assert!((layer.geometry().center_y - 300.0).abs() < f32::EPSILON);
        assert_eq!(layer.natural_size(), (150, 100));
    }
}
