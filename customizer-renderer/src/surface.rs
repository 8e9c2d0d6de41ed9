//! Software rendering surface.
//!
//! Draws a [`Scene`] as SVG (surface fill, then background, then objects in
//! z-order) and rasterizes it with resvg into a tiny-skia pixmap.

use std::fmt::Write;
use std::sync::Arc;

use async_trait::async_trait;
use customizer_core::{
    BackgroundLayer, CustomizerResult, DesignObject, Geometry, ObjectId, ObjectKind, Raster,
    RasterOptions, RenderingSurface, Scene, SelectionTarget, SurfaceFactory, SurfaceSpec,
};

use crate::error::{RenderError, RenderResult};

/// Baseline offset relative to font size that vertically centers a line.
const BASELINE_SHIFT: f32 = 0.35;

/// A [`RenderingSurface`] that renders through SVG and resvg.
pub struct RasterSurface {
    scene: Scene,
    color: String,
    fonts: Arc<usvg::fontdb::Database>,
    /// Last drawn frame.
    svg: String,
    /// A redraw was requested but not yet performed.
    dirty: bool,
    disposed: bool,
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("size", &self.scene.size)
            .field("objects", &self.scene.object_count())
            .field("dirty", &self.dirty)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl RasterSurface {
    /// Create an empty surface.
    #[must_use]
    pub fn new(spec: &SurfaceSpec, fonts: Arc<usvg::fontdb::Database>) -> Self {
        let mut surface = Self {
            scene: Scene::new(spec.size),
            color: spec.color.clone(),
            fonts,
            svg: String::new(),
            dirty: true,
            disposed: false,
        };
        surface.flush();
        surface
    }

    /// The live scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The last drawn frame as SVG. Pending redraws are not reflected.
    #[must_use]
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Whether a redraw is pending.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Perform any pending redraw.
    pub fn flush(&mut self) {
        if self.dirty {
            self.svg = scene_to_svg(&self.scene, &self.color);
            self.dirty = false;
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize(&self, options: RasterOptions) -> RenderResult<Raster> {
        let px = (self.scene.size * options.multiplier).round().max(1.0) as u32;

        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(&self.fonts);
        let tree = usvg::Tree::from_str(&self.svg, &opt)
            .map_err(|e| RenderError::Svg(e.to_string()))?;

        let mut pixmap = tiny_skia::Pixmap::new(px, px)
            .ok_or_else(|| RenderError::Raster(format!("Failed to create {px}x{px} pixmap")))?;
        let scale = options.multiplier;
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        let png = pixmap
            .encode_png()
            .map_err(|e| RenderError::Raster(format!("PNG encoding failed: {e}")))?;
        Ok(Raster {
            width: px,
            height: px,
            png,
        })
    }
}

#[async_trait]
impl RenderingSurface for RasterSurface {
    fn add(&mut self, object: DesignObject) {
        self.scene.add_object(object);
        self.dirty = true;
    }

    fn remove(&mut self, id: ObjectId) -> Option<DesignObject> {
        let removed = self.scene.remove_object(id).ok();
        self.dirty |= removed.is_some();
        removed
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut DesignObject> {
        self.dirty = true;
        self.scene.get_object_mut(id)
    }

    fn objects(&self) -> &[DesignObject] {
        self.scene.objects()
    }

    fn set_active(&mut self, target: SelectionTarget) {
        self.scene.set_active(target);
        self.dirty = true;
    }

    fn active(&self) -> SelectionTarget {
        self.scene.active()
    }

    fn target_at(&self, x: f32, y: f32) -> SelectionTarget {
        self.scene.target_at(x, y)
    }

    fn install_background(&mut self, layer: BackgroundLayer) -> Option<BackgroundLayer> {
        self.dirty = true;
        self.scene.set_background(layer)
    }

    fn remove_background(&mut self) -> Option<BackgroundLayer> {
        let removed = self.scene.take_background();
        self.dirty |= removed.is_some();
        removed
    }

    fn background(&self) -> Option<&BackgroundLayer> {
        self.scene.background()
    }

    fn render(&mut self) {
        self.dirty = true;
    }

    async fn to_raster(&mut self, options: RasterOptions) -> CustomizerResult<Raster> {
        if self.disposed {
            return Err(RenderError::Disposed.into());
        }
        self.flush();
        let raster = self.rasterize(options)?;
        tracing::debug!(
            "Rasterized {} object(s) at {}x{}",
            self.scene.object_count(),
            raster.width,
            raster.height
        );
        Ok(raster)
    }

    fn dispose(&mut self) {
        self.scene.clear_objects();
        self.scene.take_background();
        self.svg.clear();
        self.disposed = true;
    }
}

/// Creates [`RasterSurface`]s sharing one font database.
#[derive(Debug, Clone, Default)]
pub struct RasterSurfaceFactory {
    fonts: Arc<usvg::fontdb::Database>,
}

impl RasterSurfaceFactory {
    /// Create a factory without fonts. Text objects render as nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory with the system's installed fonts.
    #[must_use]
    pub fn with_system_fonts() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!("Loaded {} system font face(s)", db.len());
        Self {
            fonts: Arc::new(db),
        }
    }
}

impl SurfaceFactory for RasterSurfaceFactory {
    fn create(&self, spec: &SurfaceSpec) -> CustomizerResult<Box<dyn RenderingSurface>> {
        Ok(Box::new(RasterSurface::new(spec, Arc::clone(&self.fonts))))
    }
}

/// Draw a scene as an SVG document in canvas units.
#[must_use]
pub fn scene_to_svg(scene: &Scene, color: &str) -> String {
    let size = scene.size;
    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" viewBox=\"0 0 {size} {size}\">",
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(color)
    );

    if let Some(layer) = scene.background() {
        write_image(&mut svg, layer.geometry(), layer.source().as_str());
    }

    for object in scene.objects() {
        match &object.kind {
            ObjectKind::Text {
                content,
                font_family,
                font_size,
                fill,
            } => {
                open_group(&mut svg, &object.geometry);
                let baseline = font_size * BASELINE_SHIFT;
                let _ = write!(
                    svg,
                    "<text x=\"0\" y=\"{baseline}\" font-size=\"{font_size}\" font-family=\"{}\" fill=\"{}\" text-anchor=\"middle\">{}</text></g>",
                    escape_xml(font_family),
                    escape_xml(fill),
                    escape_xml(content),
                );
            }
            ObjectKind::Image { source } => {
                write_image(&mut svg, &object.geometry, source.as_str());
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

/// Open a group whose origin is the object's center.
fn open_group(svg: &mut String, g: &Geometry) {
    let _ = write!(
        svg,
        "<g transform=\"translate({} {}) rotate({}) scale({} {})\">",
        g.center_x, g.center_y, g.angle, g.scale_x, g.scale_y,
    );
}

fn write_image(svg: &mut String, g: &Geometry, href: &str) {
    open_group(svg, g);
    let _ = write!(
        svg,
        "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" href=\"{}\"/></g>",
        -g.width / 2.0,
        -g.height / 2.0,
        g.width,
        g.height,
        escape_xml(href),
    );
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use customizer_core::{ImageSource, LoadedImage};

    fn spec() -> SurfaceSpec {
        SurfaceSpec {
            size: 100.0,
            color: "#f3f4f6".into(),
        }
    }

    fn text(content: &str) -> DesignObject {
        DesignObject::new(
            ObjectKind::Text {
                content: content.into(),
                font_family: "Arial Black".into(),
                font_size: 20.0,
                fill: "#EF4444".into(),
            },
            Geometry::centered(50.0, 50.0, 60.0, 23.0),
        )
    }

    #[test]
    fn test_svg_escapes_text() {
        let mut scene = Scene::new(100.0);
        scene.add_object(text("A & <B>"));
        let svg = scene_to_svg(&scene, "#fff");
        assert!(svg.contains("A &amp; &lt;B&gt;"));
        assert!(svg.contains("font-family=\"Arial Black\""));
    }

    #[test]
    fn test_svg_draws_background_first() {
        let mut scene = Scene::new(100.0);
        scene.add_object(DesignObject::new(
            ObjectKind::Image {
                source: ImageSource::png(&[1]),
            },
            Geometry::centered(50.0, 50.0, 10.0, 10.0),
        ));
        scene.set_background(BackgroundLayer::fit(
            LoadedImage {
                source: ImageSource::from_bytes("image/jpeg", &[2]),
                width: 200,
                height: 100,
            },
            100.0,
        ));
        let svg = scene_to_svg(&scene, "#fff");
        let background = svg.find("image/jpeg").expect("background drawn");
        let artwork = svg.find("image/png").expect("artwork drawn");
        assert!(background < artwork);
    }

    #[tokio::test]
    async fn test_render_is_flushed_before_capture() {
        let mut surface = RasterSurface::new(&spec(), Arc::default());
        surface.add(text("HI"));
        surface.render();
        assert!(surface.is_dirty());
        assert!(!surface.svg().contains("HI"));

        let raster = surface
            .to_raster(RasterOptions {
                multiplier: 2.0,
                quality: 1.0,
            })
            .await
            .expect("raster");
        assert!(!surface.is_dirty());
        assert!(surface.svg().contains("HI"));
        assert_eq!((raster.width, raster.height), (200, 200));
        assert!(raster.png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[tokio::test]
    async fn test_removals_redraw_before_next_capture() {
        let mut surface = RasterSurface::new(&spec(), Arc::default());
        let object = text("HI");
        let id = object.id;
        surface.add(object);
        surface
            .to_raster(RasterOptions::default())
            .await
            .expect("raster");
        assert!(surface.svg().contains("HI"));

        surface.remove(id);
        assert!(surface.is_dirty());
        surface
            .to_raster(RasterOptions::default())
            .await
            .expect("raster");
        assert!(!surface.svg().contains("HI"));
    }

    #[tokio::test]
    async fn test_disposed_surface_refuses_capture() {
        let mut surface = RasterSurface::new(&spec(), Arc::default());
        surface.dispose();
        let err = surface
            .to_raster(RasterOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, customizer_core::CustomizerError::Capture(_)));
    }
}
