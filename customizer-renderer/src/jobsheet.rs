//! PDF job sheet generation.
//!
//! One A4 portrait page: title and date, customer block, front and back
//! captures side by side, then the approval block with the signature.

use customizer_core::{
    CustomizerResult, Document, DocumentGenerator, ImageSource, JobSheet, VERIFICATION_TEXT,
};
use printpdf::image_crate::GenericImageView;
use printpdf::{
    BuiltinFont, Color, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point, Rgb,
};

use crate::error::{RenderError, RenderResult};

/// A4 width in millimetres.
const PAGE_WIDTH: f32 = 210.0;
/// A4 height in millimetres.
const PAGE_HEIGHT: f32 = 297.0;
/// Left and right page margin.
const MARGIN: f32 = 20.0;
/// Width of each design capture.
const CAPTURE_WIDTH: f32 = 80.0;
/// Width of the signature image.
const SIGNATURE_WIDTH: f32 = 60.0;

/// Lays out job sheets with printpdf's builtin Helvetica.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfJobSheetGenerator;

impl PdfJobSheetGenerator {
    /// Create a generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Render a job sheet to PDF bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Pdf`] if an image cannot be embedded or the
    /// document cannot be written.
    pub fn render(&self, sheet: &JobSheet) -> RenderResult<Vec<u8>> {
        let title = sheet.title();
        let (doc, page, layer) =
            PdfDocument::new(title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Job Sheet");
        let layer = doc.get_page(page).get_layer(layer);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Pdf(format!("Failed to add font: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Pdf(format!("Failed to add font: {e}")))?;
        let page = Page {
            layer,
            regular,
            bold,
        };

        page.text(&title, 20.0, MARGIN, 20.0, true);
        page.text(
            &format!("Generated on: {}", sheet.generated_at.format("%-m/%-d/%Y")),
            10.0,
            MARGIN,
            28.0,
            false,
        );

        page.text("Customer Information", 14.0, MARGIN, 42.0, true);
        let customer = &sheet.customer;
        let rows = [
            ("Customer Name", customer.name.as_str()),
            ("Email", customer.email.as_str()),
            ("Phone", customer.phone.as_str()),
            ("Delivery Address", customer.address.as_str()),
            ("POC Name", customer.poc_name.as_str()),
            ("Art Print Color", sheet.art_print_color.as_str()),
        ];
        for (i, (label, value)) in rows.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let top = 50.0 + i as f32 * 6.0;
            page.text(&format!("{label}: {value}"), 10.0, MARGIN, top, false);
        }

        let right = PAGE_WIDTH - MARGIN - CAPTURE_WIDTH;
        page.text("Front Design", 12.0, MARGIN, 100.0, true);
        page.text("Back Design", 12.0, right, 100.0, true);
        page.image(&sheet.captures.front.png, MARGIN, 105.0, CAPTURE_WIDTH)?;
        page.image(&sheet.captures.back.png, right, 105.0, CAPTURE_WIDTH)?;

        page.separator(195.0);

        page.text("Approval & Sign-off", 14.0, MARGIN, 207.0, true);
        if sheet.verified {
            page.text(VERIFICATION_TEXT, 10.0, MARGIN, 216.0, false);
        }
        page.text(
            &format!("Approved By: {}", customer.approved_by),
            10.0,
            MARGIN,
            226.0,
            false,
        );
        page.text("Customer Signature:", 10.0, MARGIN, 236.0, false);
        if let Some(signature) = &sheet.signature {
            page.image(&decode(signature)?, MARGIN, 240.0, SIGNATURE_WIDTH)?;
        }

        doc.save_to_bytes()
            .map_err(|e| RenderError::Pdf(format!("PDF save failed: {e}")))
    }
}

impl DocumentGenerator for PdfJobSheetGenerator {
    fn generate(&self, sheet: &JobSheet) -> CustomizerResult<Document> {
        let bytes = self.render(sheet)?;
        Ok(Document {
            file_name: sheet.file_name(),
            mime_type: "application/pdf".to_string(),
            bytes,
        })
    }
}

fn decode(source: &ImageSource) -> RenderResult<Vec<u8>> {
    source
        .decode()
        .map_err(|e| RenderError::Pdf(format!("Unreadable signature: {e}")))
}

/// The page being drawn, addressed in millimetres from the top-left corner.
struct Page {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Page {
    fn text(&self, text: &str, size: f32, left: f32, top: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size, Mm(left), Mm(PAGE_HEIGHT - top), font);
    }

    #[allow(clippy::cast_precision_loss)]
    fn image(&self, encoded: &[u8], left: f32, top: f32, width: f32) -> RenderResult<()> {
        // Decode with printpdf's bundled image crate for compatibility
        let dynamic_image = printpdf::image_crate::load_from_memory(encoded)
            .map_err(|e| RenderError::Pdf(format!("Failed to decode image for PDF: {e}")))?;
        let (px_w, px_h) = dynamic_image.dimensions();
        let dpi = px_w.max(1) as f32 * 25.4 / width;
        let height = px_h as f32 / dpi * 25.4;

        let pdf_image = printpdf::Image::from_dynamic_image(&dynamic_image);
        pdf_image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(left)),
                translate_y: Some(Mm(PAGE_HEIGHT - top - height)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn separator(&self, top: f32) {
        let y = Mm(PAGE_HEIGHT - top);
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.8, 0.8, 0.8, None)));
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN), y), false),
                (Point::new(Mm(PAGE_WIDTH - MARGIN), y), false),
            ],
            is_closed: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use customizer_core::{CustomerInfo, Raster, SideCaptures};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut pixmap = tiny_skia::Pixmap::new(width, height).expect("pixmap");
        pixmap.fill(tiny_skia::Color::from_rgba8(59, 130, 246, 255));
        pixmap.encode_png().expect("png")
    }

    fn sheet(verified: bool, signature: Option<ImageSource>) -> JobSheet {
        let capture = Raster {
            width: 40,
            height: 40,
            png: png(40, 40),
        };
        JobSheet {
            product_name: "Team Hoodie".into(),
            generated_at: Local::now(),
            customer: CustomerInfo {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                phone: "555-0100".into(),
                address: "1 Loom St".into(),
                poc_name: "Grace".into(),
                approved_by: "Ada".into(),
            },
            art_print_color: "#000000".into(),
            verified,
            signature,
            captures: SideCaptures {
                front: capture.clone(),
                back: capture,
            },
        }
    }

    #[test]
    fn test_generates_pdf_named_after_product() {
        let signature = ImageSource::png(&png(400, 150));
        let document = PdfJobSheetGenerator::new()
            .generate(&sheet(true, Some(signature)))
            .expect("generate");
        assert_eq!(document.file_name, "Team-Hoodie-job-sheet.pdf");
        assert_eq!(document.mime_type, "application/pdf");
        assert!(document.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_bad_capture_is_generation_error() {
        let mut bad = sheet(false, None);
        bad.captures.front.png = b"not a png".to_vec();
        let err = PdfJobSheetGenerator::new().generate(&bad).unwrap_err();
        assert!(matches!(
            err,
            customizer_core::CustomizerError::DocumentGeneration(_)
        ));
    }
}
