//! Integration tests for job sheet export (customizer-renderer).
//!
//! Runs real sessions through the software surface, the image loader and the
//! PDF generator.

use customizer_core::{
    CustomerField, CustomizerConfig, ExportPipeline, ImageSource, MemoryDesignStore, Side,
};
use customizer_renderer::{software_session, PdfJobSheetGenerator, SignaturePad};

/// A solid-color PNG.
fn photo(width: u32, height: u32, rgb: (u8, u8, u8)) -> ImageSource {
    let mut pixmap = tiny_skia::Pixmap::new(width, height).expect("pixmap");
    pixmap.fill(tiny_skia::Color::from_rgba8(rgb.0, rgb.1, rgb.2, 255));
    ImageSource::png(&pixmap.encode_png().expect("png"))
}

fn signature() -> ImageSource {
    let mut pad = SignaturePad::new();
    pad.add_stroke([(10.0, 100.0), (120.0, 40.0), (260.0, 110.0)]);
    pad.to_source().expect("rasterize").expect("drawn")
}

/// Default surface color `#f3f4f6`.
const SURFACE: [u8; 3] = [243, 244, 246];

/// Decode a capture and read the RGB of one pixel.
fn pixel(png: &[u8], x: u32, y: u32) -> [u8; 3] {
    let img = image::load_from_memory(png).expect("decode").to_rgb8();
    img.get_pixel(x, y).0
}

// ==========================================================================
// Export
// ==========================================================================

#[tokio::test]
async fn test_export_produces_pdf_with_both_captures() {
    let mut session = software_session(CustomizerConfig::default(), false);
    session
        .upload_image(Side::Front, photo(80, 60, (255, 0, 0)))
        .expect("front");
    session
        .upload_image(Side::Back, photo(60, 80, (0, 0, 255)))
        .expect("back");
    session.enter().await.expect("enter");
    session.add_text("HELLO", None).expect("text");
    session
        .add_image(photo(400, 100, (0, 255, 0)))
        .await
        .expect("artwork");

    for field in CustomerField::ALL {
        session.set_customer(field, "filled");
    }
    session.set_verified(true);
    session.set_signature(Some(signature()));

    let pipeline = ExportPipeline::new(session.config());
    let captures = pipeline.capture_sides(&mut session).await.expect("capture");
    assert_eq!((captures.front.width, captures.front.height), (1200, 1200));

    // Front photo 80x60 fits to 600x450, so the top band stays surface-colored.
    assert_eq!(pixel(&captures.front.png, 600, 400), [255, 0, 0]);
    assert_ne!(pixel(&captures.front.png, 600, 20), [255, 0, 0]);
    // The green artwork sits on the canvas center.
    assert_eq!(pixel(&captures.front.png, 600, 600), [0, 255, 0]);
    assert_eq!(pixel(&captures.back.png, 600, 600), [0, 0, 255]);
    assert_eq!(session.active_side(), Side::Front);

    let document = pipeline
        .run(&mut session, &PdfJobSheetGenerator::new())
        .await
        .expect("export");
    assert_eq!(document.file_name, "My-Custom-Product-job-sheet.pdf");
    assert!(document.bytes.starts_with(b"%PDF"));
    assert_eq!(session.objects().len(), 2);
}

#[tokio::test]
async fn test_side_without_background_captures_blank_surface() {
    let mut session = software_session(CustomizerConfig::default(), false);
    session
        .upload_image(Side::Front, photo(80, 60, (255, 0, 0)))
        .expect("front");
    session
        .upload_image(
            Side::Back,
            ImageSource::from_bytes("image/png", b"not a photo"),
        )
        .expect("back");
    session.enter().await.expect("enter");
    session
        .add_image(photo(400, 100, (0, 255, 0)))
        .await
        .expect("artwork");

    let captures = ExportPipeline::new(session.config())
        .capture_sides(&mut session)
        .await
        .expect("capture");
    assert_eq!(pixel(&captures.front.png, 600, 600), [0, 255, 0]);
    // The back photo never loads, so only the surface color remains.
    assert_eq!(pixel(&captures.back.png, 600, 600), SURFACE);
    assert_eq!(pixel(&captures.back.png, 600, 400), SURFACE);
    assert_eq!(session.active_side(), Side::Front);
}

#[tokio::test]
async fn test_unreadable_artwork_is_not_added() {
    let mut session = software_session(CustomizerConfig::default(), false);
    session
        .upload_image(Side::Front, photo(10, 10, (1, 2, 3)))
        .expect("front");
    session.enter().await.expect("enter");

    let garbage = ImageSource::from_bytes("image/png", b"definitely not a png");
    assert!(session.add_image(garbage).await.is_err());
    assert!(session.objects().is_empty());
}

// ==========================================================================
// Save
// ==========================================================================

#[tokio::test]
async fn test_save_preview_is_half_size() {
    let mut session = software_session(CustomizerConfig::default(), false);
    session
        .upload_image(Side::Front, photo(100, 100, (10, 20, 30)))
        .expect("front");
    session
        .upload_image(Side::Back, photo(100, 100, (30, 20, 10)))
        .expect("back");
    session.enter().await.expect("enter");

    let store = MemoryDesignStore::new();
    let record = ExportPipeline::new(session.config())
        .save(&mut session, &store)
        .await
        .expect("save");

    let preview = record.design.preview_image.decode().expect("decode");
    let img = image::load_from_memory(&preview).expect("png");
    assert_eq!((img.width(), img.height()), (300, 300));
    assert!(record.design.canvas.sides.front.background.is_some());
    assert!(record.design.canvas.sides.back.background.is_none());
}
