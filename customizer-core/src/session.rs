//! The dual-sided design session.
//!
//! ```text
//!                 enter()                 dispose() / start_over()
//! Uninitialized ──────────► Ready(front) ─────────────────────────► Disposed
//!                             │     ▲                                  │
//!               switch_side() │     │ switch_side()                    │ enter()
//!                             ▼     │                                  │
//!                           Ready(back) ◄──────────────────────────────┘
//! ```
//!
//! Switching sides snapshots the outgoing side into the [`SideStore`], clears
//! the surface, installs the incoming side's background and only then restores
//! its objects, so restored objects always sit above the background.

use std::sync::Arc;

use crate::{
    AssetLoader, BackgroundLayer, CanvasDocument, CustomerField, CustomizerConfig,
    CustomizerError, CustomizerResult, DesignObject, Geometry, ImageSource, LoadedImage,
    ObjectId, ObjectKind, PerSide, Property, Raster, RasterOptions, RenderingSurface,
    SelectionTarget, SessionState, Side, SideDocument, SideStore, SurfaceFactory, SurfaceSpec,
    DOCUMENT_VERSION,
};

/// Average glyph advance relative to font size, for text bounding boxes.
const GLYPH_ADVANCE: f32 = 0.6;

/// Line height relative to font size.
const LINE_HEIGHT: f32 = 1.16;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No surface bound yet; product photos may be uploaded.
    Uninitialized,
    /// Surface bound with the given side active.
    Ready(Side),
    /// Surface torn down; the session must be entered again.
    Disposed,
}

/// Owns the rendering surface and all editor state for one product.
pub struct CanvasSession {
    config: CustomizerConfig,
    factory: Arc<dyn SurfaceFactory>,
    loader: Arc<dyn AssetLoader>,
    state: SessionState,
    surface: Option<Box<dyn RenderingSurface>>,
    /// Fitted backgrounds, kept for design records of the inactive side.
    backgrounds: PerSide<Option<BackgroundLayer>>,
    disposed: bool,
}

impl std::fmt::Debug for CanvasSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasSession")
            .field("phase", &self.phase())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl CanvasSession {
    /// Create an uninitialized session.
    #[must_use]
    pub fn new(
        config: CustomizerConfig,
        factory: Arc<dyn SurfaceFactory>,
        loader: Arc<dyn AssetLoader>,
    ) -> Self {
        let state = SessionState::new(&config);
        Self {
            config,
            factory,
            loader,
            state,
            surface: None,
            backgrounds: PerSide::default(),
            disposed: false,
        }
    }

    /// The session's configuration.
    #[must_use]
    pub fn config(&self) -> &CustomizerConfig {
        &self.config
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match (&self.surface, self.disposed) {
            (Some(_), _) => SessionPhase::Ready(self.state.active_side),
            (None, true) => SessionPhase::Disposed,
            (None, false) => SessionPhase::Uninitialized,
        }
    }

    /// Whether a surface is bound.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.surface.is_some()
    }

    /// Editor state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The side on the surface.
    #[must_use]
    pub fn active_side(&self) -> Side {
        self.state.active_side
    }

    /// The selected object, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ObjectId> {
        self.state.selection
    }

    /// Live objects on the active side, bottom first.
    #[must_use]
    pub fn objects(&self) -> &[DesignObject] {
        match self.surface.as_deref() {
            Some(surface) => surface.objects(),
            None => &[],
        }
    }

    /// The selected object itself.
    #[must_use]
    pub fn selected_object(&self) -> Option<&DesignObject> {
        let id = self.state.selection?;
        self.objects().iter().find(|o| o.id == id)
    }

    /// The background on the active side.
    #[must_use]
    pub fn background(&self) -> Option<&BackgroundLayer> {
        self.surface.as_deref().and_then(|s| s.background())
    }

    // -----------------------------------------------------------------------
    // Product setup
    // -----------------------------------------------------------------------

    /// Set the product photo for a side.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::InvalidState`] once the editor is entered;
    /// photos are frozen from then on.
    pub fn upload_image(&mut self, side: Side, source: ImageSource) -> CustomizerResult<()> {
        self.ensure_not_entered()?;
        tracing::debug!("Uploaded {side} image ({})", source.mime());
        *self.state.images.get_mut(side) = Some(source);
        Ok(())
    }

    /// Remove the product photo for a side.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::InvalidState`] once the editor is entered.
    pub fn clear_image(&mut self, side: Side) -> CustomizerResult<()> {
        self.ensure_not_entered()?;
        *self.state.images.get_mut(side) = None;
        Ok(())
    }

    /// Set the product name.
    pub fn set_product_name(&mut self, name: impl Into<String>) {
        self.state.product_name = name.into();
    }

    /// Set a customer information field.
    pub fn set_customer(&mut self, field: CustomerField, value: impl Into<String>) {
        self.state.customer.set(field, value);
    }

    /// Record the design accuracy attestation.
    pub fn set_verified(&mut self, verified: bool) {
        self.state.verified = verified;
    }

    /// Store or clear the customer signature.
    pub fn set_signature(&mut self, signature: Option<ImageSource>) {
        self.state.signature = signature;
    }

    /// Set the art print color.
    pub fn set_art_print_color(&mut self, color: impl Into<String>) {
        self.state.art_print_color = color.into();
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Bind a surface and show the front side.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::InvalidState`] if already entered, or the
    /// factory's error if the surface cannot be created.
    pub async fn enter(&mut self) -> CustomizerResult<()> {
        self.ensure_not_entered()?;
        let spec = SurfaceSpec {
            size: self.config.canvas_size,
            color: self.config.surface_color.clone(),
        };
        self.surface = Some(self.factory.create(&spec)?);
        self.disposed = false;
        self.state.active_side = Side::Front;
        self.state.selection = None;
        tracing::info!("Entered editor for \"{}\"", self.state.product_name);
        self.install_background(Side::Front).await?;
        Ok(())
    }

    /// Tear down the surface. Operations are invalid until [`Self::enter`].
    pub fn dispose(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.dispose();
            tracing::debug!("Surface disposed");
        }
        self.state.selection = None;
        self.disposed = true;
    }

    /// Dispose and discard all state, ready for a new product.
    pub fn start_over(&mut self) {
        self.dispose();
        self.state = SessionState::new(&self.config);
        self.backgrounds = PerSide::default();
        tracing::info!("Session reset for a new product");
    }

    /// Show the other side of the product.
    ///
    /// Switching to the side already shown is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::InvalidState`] if no surface is bound, or an
    /// error if the stored snapshot cannot be restored.
    pub async fn switch_side(&mut self, target: Side) -> CustomizerResult<()> {
        let current = self.ready_side()?;
        if target == current {
            return Ok(());
        }

        let surface = self.surface.as_deref_mut().ok_or_else(not_ready)?;
        self.state.sides.capture(current, surface);
        surface.set_active(SelectionTarget::None);
        let ids: Vec<ObjectId> = surface.objects().iter().map(|o| o.id).collect();
        for id in ids {
            surface.remove(id);
        }
        surface.remove_background();
        surface.render();
        self.state.selection = None;
        self.state.active_side = target;
        tracing::debug!("Switched {current} -> {target}");

        self.install_background(target).await?;
        let surface = self.surface.as_deref_mut().ok_or_else(not_ready)?;
        self.state.sides.restore(target, surface).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Object commands
    // -----------------------------------------------------------------------

    /// Add a centered text object and select it.
    ///
    /// Content that is empty after trimming adds nothing. `font` defaults to
    /// the session's selected font.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::InvalidState`] if no surface is bound.
    #[allow(clippy::cast_precision_loss)]
    pub fn add_text(
        &mut self,
        content: &str,
        font: Option<&str>,
    ) -> CustomizerResult<Option<ObjectId>> {
        self.ready_side()?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let font_size = self.config.text_font_size;
        let center = self.config.canvas_size / 2.0;
        let width = content.chars().count() as f32 * font_size * GLYPH_ADVANCE;
        let object = DesignObject::new(
            ObjectKind::Text {
                content: content.to_string(),
                font_family: font.unwrap_or(&self.state.selected_font).to_string(),
                font_size,
                fill: self.config.text_fill.clone(),
            },
            Geometry::centered(center, center, width, font_size * LINE_HEIGHT),
        );
        Ok(Some(self.place(object)?))
    }

    /// Load artwork, add it centered (downscaled to the artwork bound) and
    /// select it.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::AssetLoad`] if the image cannot be loaded;
    /// nothing is added in that case.
    #[allow(clippy::cast_precision_loss)]
    pub async fn add_image(&mut self, source: ImageSource) -> CustomizerResult<ObjectId> {
        self.ready_side()?;
        let LoadedImage {
            source,
            width,
            height,
        } = self.load(&source).await.inspect_err(|e| {
            tracing::warn!("Artwork not added: {e}");
        })?;
        let (width, height) = (width as f32, height as f32);
        let bound = self.config.max_artwork_size;
        let scale = if width > bound || height > bound {
            bound / width.max(height)
        } else {
            1.0
        };
        let center = self.config.canvas_size / 2.0;
        let object = DesignObject::new(
            ObjectKind::Image { source },
            Geometry::centered(center, center, width, height).with_scale(scale),
        );
        self.place(object)
    }

    /// Remove the selected object.
    ///
    /// Returns `false` when nothing was selected.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::InvalidState`] if no surface is bound.
    pub fn delete_selection(&mut self) -> CustomizerResult<bool> {
        let selection = self.state.selection;
        let surface = self.surface_mut()?;
        let Some(id) = selection else {
            return Ok(false);
        };
        let removed = surface.remove(id).is_some();
        surface.set_active(SelectionTarget::None);
        surface.render();
        self.state.selection = None;
        Ok(removed)
    }

    /// Apply a property to the selected object if its kind accepts it.
    ///
    /// Incompatible properties and an empty selection are silent no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::InvalidState`] if no surface is bound.
    pub fn set_property(&mut self, property: &Property) -> CustomizerResult<bool> {
        let selection = self.state.selection;
        let surface = self.surface_mut()?;
        let Some(id) = selection else {
            return Ok(false);
        };
        let Some(object) = surface.object_mut(id) else {
            return Ok(false);
        };
        let applied = object.apply(property);
        if applied {
            surface.render();
        }
        Ok(applied)
    }

    /// Remember a font for new text and apply it to selected text.
    ///
    /// Returns whether a selected object changed.
    pub fn set_font(&mut self, font: impl Into<String>) -> bool {
        let font = font.into();
        if !self.config.offers_font(&font) {
            tracing::debug!("Font {font:?} is not in the configured catalogue");
        }
        self.state.selected_font.clone_from(&font);
        if self.surface.is_none() {
            return false;
        }
        self.set_property(&Property::FontFamily(font))
            .unwrap_or(false)
    }

    /// Clear the active side's objects and its stored snapshot.
    ///
    /// The background is untouched. Returns the number of objects removed.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::InvalidState`] if no surface is bound.
    pub fn reset(&mut self) -> CustomizerResult<usize> {
        let side = self.ready_side()?;
        let surface = self.surface_mut()?;
        surface.set_active(SelectionTarget::None);
        let ids: Vec<ObjectId> = surface.objects().iter().map(|o| o.id).collect();
        for id in &ids {
            surface.remove(*id);
        }
        surface.render();
        self.state.selection = None;
        self.state.sides.clear(side);
        tracing::debug!("Reset {side} side ({} object(s) removed)", ids.len());
        Ok(ids.len())
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Set the surface selection, then apply the session's selection rules.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::InvalidState`] if no surface is bound.
    pub fn select(&mut self, target: SelectionTarget) -> CustomizerResult<Option<ObjectId>> {
        self.surface_mut()?.set_active(target);
        Ok(self.sync_selection())
    }

    /// Select whatever a pointer press at canvas coordinates hits.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::InvalidState`] if no surface is bound.
    pub fn click(&mut self, x: f32, y: f32) -> CustomizerResult<Option<ObjectId>> {
        let target = self.surface_mut()?.target_at(x, y);
        self.select(target)
    }

    /// Handle a selection-changed notification from the surface.
    ///
    /// The background can never become the session's selection: if the
    /// surface selected it, the surface selection is cleared immediately.
    pub fn sync_selection(&mut self) -> Option<ObjectId> {
        let Some(surface) = self.surface.as_deref_mut() else {
            self.state.selection = None;
            return None;
        };
        let selection = match surface.active() {
            SelectionTarget::Background => {
                surface.set_active(SelectionTarget::None);
                surface.render();
                None
            }
            SelectionTarget::Object(id) if surface.objects().iter().any(|o| o.id == id) => {
                Some(id)
            }
            SelectionTarget::Object(_) | SelectionTarget::None => None,
        };
        self.state.selection = selection;
        selection
    }

    // -----------------------------------------------------------------------
    // Capture and serialization
    // -----------------------------------------------------------------------

    /// Capture the active side as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::InvalidState`] if no surface is bound, or
    /// [`CustomizerError::Capture`] if rasterization fails.
    pub async fn capture(&mut self, options: RasterOptions) -> CustomizerResult<Raster> {
        self.surface_mut()?.to_raster(options).await
    }

    /// Serialize the whole design: the active side from the live surface and
    /// the other side from its stored snapshot, both with backgrounds.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::InvalidState`] if no surface is bound.
    pub fn document(&self) -> CustomizerResult<CanvasDocument> {
        let surface = self.surface.as_deref().ok_or_else(not_ready)?;
        let active = self.state.active_side;
        let mut sides = PerSide::<SideDocument>::default();
        for side in Side::ALL {
            let (background, objects) = if side == active {
                (
                    surface.background().cloned(),
                    SideStore::snapshot(surface).objects,
                )
            } else {
                (
                    self.backgrounds.get(side).clone(),
                    self.state
                        .sides
                        .get(side)
                        .map(|s| s.objects.clone())
                        .unwrap_or_default(),
                )
            };
            *sides.get_mut(side) = SideDocument {
                image: self.state.images.get(side).clone(),
                background,
                objects,
            };
        }
        Ok(CanvasDocument {
            version: DOCUMENT_VERSION,
            canvas_size: self.config.canvas_size,
            active_side: active,
            sides,
        })
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn ensure_not_entered(&self) -> CustomizerResult<()> {
        if self.surface.is_some() {
            return Err(CustomizerError::InvalidState(
                "editor already entered".to_string(),
            ));
        }
        Ok(())
    }

    fn ready_side(&self) -> CustomizerResult<Side> {
        if self.surface.is_none() {
            return Err(not_ready());
        }
        Ok(self.state.active_side)
    }

    fn surface_mut(&mut self) -> CustomizerResult<&mut (dyn RenderingSurface + 'static)> {
        self.surface.as_deref_mut().ok_or_else(not_ready)
    }

    fn place(&mut self, object: DesignObject) -> CustomizerResult<ObjectId> {
        let id = object.id;
        let surface = self.surface_mut()?;
        surface.add(object);
        surface.set_active(SelectionTarget::Object(id));
        surface.render();
        self.state.selection = Some(id);
        Ok(id)
    }

    async fn load(&self, source: &ImageSource) -> CustomizerResult<LoadedImage> {
        let loading = self.loader.load(source);
        match self.config.asset_load_timeout() {
            Some(limit) => tokio::time::timeout(limit, loading).await.map_err(|_| {
                CustomizerError::AssetLoad(format!("timed out after {}ms", limit.as_millis()))
            })?,
            None => loading.await,
        }
    }

    /// Install the side's background if it has a photo.
    ///
    /// A photo that fails to load leaves the side without a background; the
    /// failure is logged and does not fail the caller.
    async fn install_background(&mut self, side: Side) -> CustomizerResult<()> {
        let Some(source) = self.state.images.get(side).clone() else {
            return Ok(());
        };
        let image = match self.load(&source).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("Background for {side} side not installed: {e}");
                return Ok(());
            }
        };
        let layer = BackgroundLayer::fit(image, self.config.canvas_size);
        let surface = self.surface_mut()?;
        if surface.install_background(layer.clone()).is_some() {
            tracing::debug!("Replaced previous {side} background");
        }
        surface.render();
        *self.backgrounds.get_mut(side) = Some(layer);
        Ok(())
    }
}

fn not_ready() -> CustomizerError {
    CustomizerError::InvalidState("editor not entered".to_string())
}
