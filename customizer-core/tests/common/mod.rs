//! Shared fakes for session integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use customizer_core::{
    AssetLoader, BackgroundLayer, CanvasSession, CustomerField, CustomizerConfig,
    CustomizerError, CustomizerResult, DesignObject, Document, DocumentGenerator, ImageSource,
    JobSheet, LoadedImage, ObjectId, ObjectKind, Raster, RasterOptions, RenderingSurface, Scene,
    SelectionTarget, SurfaceFactory, SurfaceSpec,
};

/// MIME type understood by [`DimensionLoader`].
pub const TEST_MIME: &str = "image/x-test";

/// An image source whose payload is its `WxH` size.
pub fn image(width: u32, height: u32) -> ImageSource {
    ImageSource::from_bytes(TEST_MIME, format!("{width}x{height}").as_bytes())
}

/// An image source the loader refuses.
pub fn broken_image() -> ImageSource {
    ImageSource::from_bytes(TEST_MIME, b"broken")
}

/// Loader that reads dimensions straight from the payload.
#[derive(Debug, Default)]
pub struct DimensionLoader;

#[async_trait]
impl AssetLoader for DimensionLoader {
    async fn load(&self, source: &ImageSource) -> CustomizerResult<LoadedImage> {
        let payload = String::from_utf8(source.decode()?)
            .map_err(|e| CustomizerError::AssetLoad(e.to_string()))?;
        let (w, h) = payload
            .split_once('x')
            .ok_or_else(|| CustomizerError::AssetLoad(format!("bad payload {payload}")))?;
        let parse = |v: &str| {
            v.parse::<u32>()
                .map_err(|e| CustomizerError::AssetLoad(e.to_string()))
        };
        Ok(LoadedImage {
            source: source.clone(),
            width: parse(w)?,
            height: parse(h)?,
        })
    }
}

/// Observable counters shared between a factory and its surfaces.
#[derive(Debug, Default)]
pub struct SurfaceProbe {
    pub created: AtomicUsize,
    pub disposed: AtomicUsize,
    pub captures: AtomicUsize,
    pub fail_capture: AtomicBool,
}

/// Scene-backed surface whose captures describe their contents.
pub struct FakeSurface {
    scene: Scene,
    probe: Arc<SurfaceProbe>,
}

#[async_trait]
impl RenderingSurface for FakeSurface {
    fn add(&mut self, object: DesignObject) {
        self.scene.add_object(object);
    }
    fn remove(&mut self, id: ObjectId) -> Option<DesignObject> {
        self.scene.remove_object(id).ok()
    }
    fn object_mut(&mut self, id: ObjectId) -> Option<&mut DesignObject> {
        self.scene.get_object_mut(id)
    }
    fn objects(&self) -> &[DesignObject] {
        self.scene.objects()
    }
    fn set_active(&mut self, target: SelectionTarget) {
        self.scene.set_active(target);
    }
    fn active(&self) -> SelectionTarget {
        self.scene.active()
    }
    fn target_at(&self, x: f32, y: f32) -> SelectionTarget {
        self.scene.target_at(x, y)
    }
    fn install_background(&mut self, layer: BackgroundLayer) -> Option<BackgroundLayer> {
        self.scene.set_background(layer)
    }
    fn remove_background(&mut self) -> Option<BackgroundLayer> {
        self.scene.take_background()
    }
    fn background(&self) -> Option<&BackgroundLayer> {
        self.scene.background()
    }
    fn render(&mut self) {}

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    async fn to_raster(&mut self, options: RasterOptions) -> CustomizerResult<Raster> {
        if self.probe.fail_capture.load(Ordering::SeqCst) {
            return Err(CustomizerError::Capture("surface lost".into()));
        }
        self.probe.captures.fetch_add(1, Ordering::SeqCst);
        let size = (self.scene.size * options.multiplier) as u32;
        Ok(Raster {
            width: size,
            height: size,
            png: describe(&self.scene).into_bytes(),
        })
    }

    fn dispose(&mut self) {
        self.probe.disposed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Text description of a scene: background size then object labels.
pub fn describe(scene: &Scene) -> String {
    let background = scene
        .background()
        .map(|b| format!("{}x{}", b.natural_size().0, b.natural_size().1))
        .unwrap_or_default();
    let objects: Vec<String> = scene.objects().iter().map(label).collect();
    format!("bg={background};{}", objects.join(","))
}

/// Short label for an object.
pub fn label(object: &DesignObject) -> String {
    match &object.kind {
        ObjectKind::Text { content, .. } => content.clone(),
        ObjectKind::Image { .. } => "image".to_string(),
    }
}

/// Factory producing [`FakeSurface`]s.
#[derive(Debug, Default)]
pub struct FakeFactory {
    pub probe: Arc<SurfaceProbe>,
}

impl SurfaceFactory for FakeFactory {
    fn create(&self, spec: &SurfaceSpec) -> CustomizerResult<Box<dyn RenderingSurface>> {
        self.probe.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSurface {
            scene: Scene::new(spec.size),
            probe: Arc::clone(&self.probe),
        }))
    }
}

/// Generator that records the sheets it was given.
#[derive(Debug, Default)]
pub struct RecordingGenerator {
    pub sheets: Mutex<Vec<JobSheet>>,
    pub fail: AtomicBool,
}

impl RecordingGenerator {
    pub fn last(&self) -> Option<JobSheet> {
        self.sheets
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl DocumentGenerator for RecordingGenerator {
    fn generate(&self, sheet: &JobSheet) -> CustomizerResult<Document> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CustomizerError::DocumentGeneration("layout failed".into()));
        }
        self.sheets
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(sheet.clone());
        Ok(Document {
            file_name: sheet.file_name(),
            mime_type: "application/pdf".into(),
            bytes: b"%PDF-1.3".to_vec(),
        })
    }
}

/// A session with fake collaborators, plus the factory's probe.
pub fn session() -> (CanvasSession, Arc<SurfaceProbe>) {
    session_with(CustomizerConfig::default())
}

/// A session with the given config.
pub fn session_with(config: CustomizerConfig) -> (CanvasSession, Arc<SurfaceProbe>) {
    let factory = FakeFactory::default();
    let probe = Arc::clone(&factory.probe);
    let session = CanvasSession::new(config, Arc::new(factory), Arc::new(DimensionLoader));
    (session, probe)
}

/// A session with both photos uploaded (A: 800x600, B: 600x800), entered.
pub async fn entered_session() -> (CanvasSession, Arc<SurfaceProbe>) {
    let (mut session, probe) = session();
    session
        .upload_image(customizer_core::Side::Front, image(800, 600))
        .expect("upload front");
    session
        .upload_image(customizer_core::Side::Back, image(600, 800))
        .expect("upload back");
    session.enter().await.expect("enter");
    (session, probe)
}

/// Fill every field the export gate checks.
pub fn complete_form(session: &mut CanvasSession) {
    for field in CustomerField::ALL {
        session.set_customer(field, format!("{field} value"));
    }
    session.set_verified(true);
    session.set_signature(Some(ImageSource::png(&[0x89, b'P', b'N', b'G'])));
}

/// Labels of the live objects.
pub fn labels(session: &CanvasSession) -> Vec<String> {
    session.objects().iter().map(label).collect()
}
