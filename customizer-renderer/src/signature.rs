//! Hand-drawn signature capture.

use customizer_core::ImageSource;
use tiny_skia::{Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::error::{RenderError, RenderResult};

/// Pad width in pixels.
pub const PAD_WIDTH: u32 = 400;
/// Pad height in pixels.
pub const PAD_HEIGHT: u32 = 150;
/// Pen width in pixels.
const PEN_WIDTH: f32 = 2.0;

/// Collects pen strokes and rasterizes them as a signature PNG.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignaturePad {
    strokes: Vec<Vec<(f32, f32)>>,
}

impl SignaturePad {
    /// Create an empty pad.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new stroke at a point.
    pub fn begin_stroke(&mut self, x: f32, y: f32) {
        self.strokes.push(vec![clamp(x, y)]);
    }

    /// Extend the current stroke. Starts one if none is in progress.
    pub fn extend_stroke(&mut self, x: f32, y: f32) {
        match self.strokes.last_mut() {
            Some(stroke) => stroke.push(clamp(x, y)),
            None => self.begin_stroke(x, y),
        }
    }

    /// Add a complete stroke. Empty strokes are ignored.
    pub fn add_stroke(&mut self, points: impl IntoIterator<Item = (f32, f32)>) {
        let stroke: Vec<_> = points.into_iter().map(|(x, y)| clamp(x, y)).collect();
        if !stroke.is_empty() {
            self.strokes.push(stroke);
        }
    }

    /// Erase everything.
    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Whether nothing has been drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Number of strokes drawn.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// Rasterize the strokes: black round pen on white.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Raster`] if the pixmap cannot be created or
    /// encoded.
    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        let mut pixmap = Pixmap::new(PAD_WIDTH, PAD_HEIGHT)
            .ok_or_else(|| RenderError::Raster("Failed to create signature pixmap".to_string()))?;
        pixmap.fill(Color::WHITE);

        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: PEN_WIDTH,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        for points in &self.strokes {
            match points.as_slice() {
                [] => {}
                [(x, y)] => {
                    // A tap leaves a dot the width of the pen.
                    if let Some(dot) = PathBuilder::from_circle(*x, *y, PEN_WIDTH / 2.0) {
                        pixmap.fill_path(
                            &dot,
                            &paint,
                            FillRule::Winding,
                            Transform::identity(),
                            None,
                        );
                    }
                }
                [(x0, y0), rest @ ..] => {
                    let mut pb = PathBuilder::new();
                    pb.move_to(*x0, *y0);
                    for (x, y) in rest {
                        pb.line_to(*x, *y);
                    }
                    if let Some(path) = pb.finish() {
                        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
                    }
                }
            }
        }

        pixmap
            .encode_png()
            .map_err(|e| RenderError::Raster(format!("PNG encoding failed: {e}")))
    }

    /// The signature as a PNG data URI, or `None` if nothing was drawn.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Raster`] if rasterization fails.
    pub fn to_source(&self) -> RenderResult<Option<ImageSource>> {
        if self.is_empty() {
            return Ok(None);
        }
        Ok(Some(ImageSource::png(&self.to_png()?)))
    }
}

#[allow(clippy::cast_precision_loss)]
fn clamp(x: f32, y: f32) -> (f32, f32) {
    (
        x.clamp(0.0, PAD_WIDTH as f32),
        y.clamp(0.0, PAD_HEIGHT as f32),
    )
}
