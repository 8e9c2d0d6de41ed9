//! The rendering surface capability.
//!
//! A surface holds the live objects of the side being edited, the locked
//! background in a separate slot, and the surface-level selection. The
//! session is its only owner.

use async_trait::async_trait;

use crate::{
    BackgroundLayer, CustomizerResult, DesignObject, ImageSource, ObjectDocument, ObjectId,
    SelectionTarget,
};

/// Options for a raster capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Resolution multiplier relative to the canvas size.
    pub multiplier: f32,
    /// Encoding quality (0.0 to 1.0).
    pub quality: f32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            quality: 1.0,
        }
    }
}

/// An encoded PNG capture of a surface.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// PNG bytes.
    pub png: Vec<u8>,
}

impl Raster {
    /// Encode as a data URI.
    #[must_use]
    pub fn to_source(&self) -> ImageSource {
        ImageSource::png(&self.png)
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.png.len())
            .finish()
    }
}

/// Parameters for creating a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSpec {
    /// Side length of the square canvas.
    pub size: f32,
    /// Fill drawn behind the background layer.
    pub color: String,
}

/// A canvas that holds, renders and captures design objects.
#[async_trait]
pub trait RenderingSurface: Send + Sync {
    /// Add an object on top of the stack.
    fn add(&mut self, object: DesignObject);

    /// Remove an object, returning it if it was present.
    fn remove(&mut self, id: ObjectId) -> Option<DesignObject>;

    /// Mutable access to a live object.
    fn object_mut(&mut self, id: ObjectId) -> Option<&mut DesignObject>;

    /// Live objects in z-order, bottom first. Never includes the background.
    fn objects(&self) -> &[DesignObject];

    /// Set the surface-level selection.
    fn set_active(&mut self, target: SelectionTarget);

    /// The surface-level selection.
    fn active(&self) -> SelectionTarget;

    /// What a pointer press at canvas coordinates would select.
    fn target_at(&self, x: f32, y: f32) -> SelectionTarget;

    /// Install a background beneath all objects, replacing any previous one.
    fn install_background(&mut self, layer: BackgroundLayer) -> Option<BackgroundLayer>;

    /// Remove the background.
    fn remove_background(&mut self) -> Option<BackgroundLayer>;

    /// The installed background.
    fn background(&self) -> Option<&BackgroundLayer>;

    /// Request a redraw.
    fn render(&mut self);

    /// Wait for any pending draw, then capture the surface as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CustomizerError::Capture`] if the surface cannot be rasterized.
    async fn to_raster(&mut self, options: RasterOptions) -> CustomizerResult<Raster>;

    /// Serialize a live object.
    fn serialize_object(&self, object: &DesignObject) -> ObjectDocument {
        ObjectDocument::from(object)
    }

    /// Recreate live objects from their serialized form.
    ///
    /// # Errors
    ///
    /// Returns an error if any document cannot be materialized.
    async fn deserialize_objects(
        &self,
        documents: &[ObjectDocument],
    ) -> CustomizerResult<Vec<DesignObject>> {
        documents
            .iter()
            .cloned()
            .map(ObjectDocument::into_object)
            .collect()
    }

    /// Release the surface's resources.
    fn dispose(&mut self);
}

/// Creates surfaces when the editor is entered.
pub trait SurfaceFactory: Send + Sync {
    /// Create a surface.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CustomizerError::Surface`] if creation fails.
    fn create(&self, spec: &SurfaceSpec) -> CustomizerResult<Box<dyn RenderingSurface>>;
}
