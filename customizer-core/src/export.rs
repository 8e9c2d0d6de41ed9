//! Export gate, dual-side capture and job sheet assembly.

use chrono::{DateTime, Local};

use crate::{
    persistence::{DesignRecord, DesignStore, NewDesign},
    CanvasSession, CustomerInfo, CustomizerConfig, CustomizerError, CustomizerResult,
    ImageSource, Raster, RasterOptions, SessionState, Side, ValidationError,
};

/// Text printed next to the verification mark on the job sheet.
pub const VERIFICATION_TEXT: &str =
    "[X] Verified that the design, colors, and text are correct.";

/// Product id attached to design records.
pub const DEFAULT_PRODUCT_ID: u32 = 1;

/// Check that the session may be exported.
///
/// Missing customer fields are reported first (all of them, in form order),
/// then a missing attestation, then a missing signature.
///
/// # Errors
///
/// Returns the first failing [`ValidationError`].
pub fn check_gate(state: &SessionState) -> Result<(), ValidationError> {
    let missing = state.customer.missing();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }
    if !state.verified {
        return Err(ValidationError::NotVerified);
    }
    if state.signature.is_none() {
        return Err(ValidationError::MissingSignature);
    }
    Ok(())
}

/// High-resolution captures of both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideCaptures {
    /// Front side capture.
    pub front: Raster,
    /// Back side capture.
    pub back: Raster,
}

impl SideCaptures {
    /// Capture for a side.
    #[must_use]
    pub fn get(&self, side: Side) -> &Raster {
        match side {
            Side::Front => &self.front,
            Side::Back => &self.back,
        }
    }
}

/// Everything printed on a job sheet.
#[derive(Debug, Clone)]
pub struct JobSheet {
    /// Product name, used in the title and file name.
    pub product_name: String,
    /// Generation timestamp.
    pub generated_at: DateTime<Local>,
    /// Customer block.
    pub customer: CustomerInfo,
    /// Art print color.
    pub art_print_color: String,
    /// Whether the design accuracy attestation was given.
    pub verified: bool,
    /// Customer signature.
    pub signature: Option<ImageSource>,
    /// Side captures.
    pub captures: SideCaptures,
}

impl JobSheet {
    /// Output file name: the product name with whitespace runs replaced by
    /// `-`, suffixed with `-job-sheet.pdf`.
    #[must_use]
    pub fn file_name(&self) -> String {
        let stem = self
            .product_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        format!("{stem}-job-sheet.pdf")
    }

    /// Title line.
    #[must_use]
    pub fn title(&self) -> String {
        format!("Job Sheet: {}", self.product_name)
    }
}

/// A generated document.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    /// Suggested file name.
    pub file_name: String,
    /// MIME type.
    pub mime_type: String,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Lays out a job sheet as a document.
pub trait DocumentGenerator: Send + Sync {
    /// Generate the document.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::DocumentGeneration`] on layout or encoding
    /// failure.
    fn generate(&self, sheet: &JobSheet) -> CustomizerResult<Document>;
}

/// Drives export and save against a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportPipeline {
    capture: RasterOptions,
    preview: RasterOptions,
}

impl Default for ExportPipeline {
    fn default() -> Self {
        Self::new(&CustomizerConfig::default())
    }
}

impl ExportPipeline {
    /// Create a pipeline using the config's capture and preview settings.
    #[must_use]
    pub fn new(config: &CustomizerConfig) -> Self {
        Self {
            capture: RasterOptions {
                multiplier: config.capture_multiplier,
                quality: 1.0,
            },
            preview: RasterOptions {
                multiplier: config.preview_multiplier,
                quality: config.preview_quality,
            },
        }
    }

    /// Validate, capture both sides and generate the job sheet.
    ///
    /// The side shown before the export is shown again afterwards, whether or
    /// not the export succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::Validation`] if the gate refuses, before any
    /// capture is taken. Capture and generation failures are returned as-is.
    pub async fn run(
        &self,
        session: &mut CanvasSession,
        generator: &dyn DocumentGenerator,
    ) -> CustomizerResult<Document> {
        if !session.is_ready() {
            return Err(CustomizerError::InvalidState(
                "editor not entered".to_string(),
            ));
        }
        check_gate(session.state())?;

        let captures = self.capture_sides(session).await?;
        let state = session.state();
        let sheet = JobSheet {
            product_name: state.product_name.clone(),
            generated_at: Local::now(),
            customer: state.customer.clone(),
            art_print_color: state.art_print_color.clone(),
            verified: state.verified,
            signature: state.signature.clone(),
            captures,
        };
        let document = generator.generate(&sheet).map_err(|e| match e {
            CustomizerError::DocumentGeneration(_) => e,
            other => CustomizerError::DocumentGeneration(other.to_string()),
        })?;
        tracing::info!(
            "Exported {} ({} bytes)",
            document.file_name,
            document.bytes.len()
        );
        Ok(document)
    }

    /// Capture both sides at export resolution, then return to the side that
    /// was shown.
    ///
    /// # Errors
    ///
    /// Returns the first capture or switch failure.
    pub async fn capture_sides(
        &self,
        session: &mut CanvasSession,
    ) -> CustomizerResult<SideCaptures> {
        let original = session.active_side();
        let result = self.capture_both(session).await;
        if session.active_side() != original {
            if let Err(e) = session.switch_side(original).await {
                tracing::error!("Failed to return to {original} side after capture: {e}");
                if result.is_ok() {
                    return Err(e);
                }
            }
        }
        result
    }

    async fn capture_both(&self, session: &mut CanvasSession) -> CustomizerResult<SideCaptures> {
        let front = self.capture_side(session, Side::Front).await?;
        let back = self.capture_side(session, Side::Back).await?;
        Ok(SideCaptures { front, back })
    }

    async fn capture_side(
        &self,
        session: &mut CanvasSession,
        side: Side,
    ) -> CustomizerResult<Raster> {
        if session.active_side() != side {
            session.switch_side(side).await?;
        }
        let raster = session.capture(self.capture).await?;
        tracing::debug!("Captured {side} side at {}x{}", raster.width, raster.height);
        Ok(raster)
    }

    /// Serialize the design, capture a preview of the active side and persist
    /// both as a new design record.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::InvalidState`] if the editor is not entered,
    /// or the capture or store error.
    pub async fn save(
        &self,
        session: &mut CanvasSession,
        store: &dyn DesignStore,
    ) -> CustomizerResult<DesignRecord> {
        let canvas = session.document()?;
        let preview = session.capture(self.preview).await?;
        let state = session.state();
        let design = NewDesign {
            product_id: DEFAULT_PRODUCT_ID,
            product_name: state.product_name.clone(),
            side: state.active_side,
            canvas,
            preview_image: preview.to_source(),
            signature: state.signature.clone(),
            verified: state.verified,
        };
        let record = store.save(design).await?;
        tracing::info!("Saved design {} for \"{}\"", record.id, record.design.product_name);
        Ok(record)
    }
}
