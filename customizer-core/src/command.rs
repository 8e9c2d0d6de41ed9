//! The user-facing command surface.
//!
//! [`CommandRunner`] executes [`Command`]s against a session and turns export
//! and save results into [`Notification`]s.

use std::sync::Arc;

use crate::{
    export::{Document, DocumentGenerator, ExportPipeline},
    notify::{Notification, Notifier},
    persistence::{DesignRecord, DesignStore},
    CanvasSession, CustomerField, CustomizerError, CustomizerResult, ImageSource, ObjectId,
    Property, SelectionTarget, Side,
};

/// A user command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set a side's product photo.
    UploadImage {
        /// Target side.
        side: Side,
        /// Photo data.
        source: ImageSource,
    },
    /// Remove a side's product photo.
    ClearImage(Side),
    /// Enter the editor. Both photos must be uploaded.
    StartDesigning,
    /// Set the product name.
    SetProductName(String),
    /// Set a customer field.
    SetCustomer {
        /// Field to set.
        field: CustomerField,
        /// New value.
        value: String,
    },
    /// Set the design accuracy attestation.
    SetVerified(bool),
    /// Store or clear the signature.
    SetSignature(Option<ImageSource>),
    /// Set the art print color.
    SetArtPrintColor(String),
    /// Add a text object.
    AddText {
        /// Text content.
        content: String,
        /// Font override.
        font: Option<String>,
    },
    /// Add an artwork image.
    UploadArtwork(ImageSource),
    /// Select a font.
    SetFont(String),
    /// Set a property on the selection.
    SetProperty(Property),
    /// Delete the selection.
    DeleteSelection,
    /// Pointer press at canvas coordinates.
    Click {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
    },
    /// Select a target directly.
    Select(SelectionTarget),
    /// Show a side.
    SwitchSide(Side),
    /// Clear the active side.
    ResetSide,
    /// Discard everything and start a new product.
    StartOver,
    /// Generate the job sheet.
    Export,
    /// Save a design record.
    Save,
    /// List saved design records.
    Gallery,
}

impl Command {
    /// Short command name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UploadImage { .. } => "upload-image",
            Self::ClearImage(_) => "clear-image",
            Self::StartDesigning => "start-designing",
            Self::SetProductName(_) => "set-product-name",
            Self::SetCustomer { .. } => "set-customer",
            Self::SetVerified(_) => "set-verified",
            Self::SetSignature(_) => "set-signature",
            Self::SetArtPrintColor(_) => "set-art-print-color",
            Self::AddText { .. } => "add-text",
            Self::UploadArtwork(_) => "upload-artwork",
            Self::SetFont(_) => "set-font",
            Self::SetProperty(_) => "set-property",
            Self::DeleteSelection => "delete-selection",
            Self::Click { .. } => "click",
            Self::Select(_) => "select",
            Self::SwitchSide(_) => "switch-side",
            Self::ResetSide => "reset-side",
            Self::StartOver => "start-over",
            Self::Export => "export",
            Self::Save => "save",
            Self::Gallery => "gallery",
        }
    }
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The command completed with nothing to report.
    Done,
    /// The command had no effect.
    Unchanged,
    /// An object was added and selected.
    Added(ObjectId),
    /// The selection after a click or select.
    Selected(Option<ObjectId>),
    /// Objects removed by a reset.
    Cleared(usize),
    /// A generated job sheet.
    Exported(Document),
    /// A stored design record.
    Saved(Box<DesignRecord>),
    /// Stored design records.
    Gallery(Vec<DesignRecord>),
}

/// Executes commands against one session.
pub struct CommandRunner {
    session: CanvasSession,
    pipeline: ExportPipeline,
    generator: Arc<dyn DocumentGenerator>,
    store: Arc<dyn DesignStore>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for CommandRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRunner")
            .field("session", &self.session)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl CommandRunner {
    /// Create a runner.
    #[must_use]
    pub fn new(
        session: CanvasSession,
        generator: Arc<dyn DocumentGenerator>,
        store: Arc<dyn DesignStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let pipeline = ExportPipeline::new(session.config());
        Self {
            session,
            pipeline,
            generator,
            store,
            notifier,
        }
    }

    /// The session.
    #[must_use]
    pub fn session(&self) -> &CanvasSession {
        &self.session
    }

    /// Mutable access to the session.
    pub fn session_mut(&mut self) -> &mut CanvasSession {
        &mut self.session
    }

    /// Execute a command.
    ///
    /// Export and save failures are also reported through the notifier. An
    /// artwork that fails to load is logged and reported as
    /// [`CommandOutcome::Unchanged`].
    ///
    /// # Errors
    ///
    /// Returns the error of the failed operation; the session stays usable.
    pub async fn execute(&mut self, command: Command) -> CustomizerResult<CommandOutcome> {
        tracing::debug!("Executing {}", command.name());
        let session = &mut self.session;
        let outcome = match command {
            Command::UploadImage { side, source } => {
                session.upload_image(side, source)?;
                CommandOutcome::Done
            }
            Command::ClearImage(side) => {
                session.clear_image(side)?;
                CommandOutcome::Done
            }
            Command::StartDesigning => {
                if !session.state().has_product() {
                    return Err(CustomizerError::InvalidState(
                        "Please upload both front and back images".to_string(),
                    ));
                }
                session.enter().await?;
                CommandOutcome::Done
            }
            Command::SetProductName(name) => {
                session.set_product_name(name);
                CommandOutcome::Done
            }
            Command::SetCustomer { field, value } => {
                session.set_customer(field, value);
                CommandOutcome::Done
            }
            Command::SetVerified(verified) => {
                session.set_verified(verified);
                CommandOutcome::Done
            }
            Command::SetSignature(signature) => {
                session.set_signature(signature);
                CommandOutcome::Done
            }
            Command::SetArtPrintColor(color) => {
                session.set_art_print_color(color);
                CommandOutcome::Done
            }
            Command::AddText { content, font } => {
                match session.add_text(&content, font.as_deref())? {
                    Some(id) => CommandOutcome::Added(id),
                    None => CommandOutcome::Unchanged,
                }
            }
            Command::UploadArtwork(source) => match session.add_image(source).await {
                Ok(id) => CommandOutcome::Added(id),
                Err(CustomizerError::AssetLoad(_)) => CommandOutcome::Unchanged,
                Err(e) => return Err(e),
            },
            Command::SetFont(font) => changed(session.set_font(font)),
            Command::SetProperty(property) => changed(session.set_property(&property)?),
            Command::DeleteSelection => changed(session.delete_selection()?),
            Command::Click { x, y } => CommandOutcome::Selected(session.click(x, y)?),
            Command::Select(target) => CommandOutcome::Selected(session.select(target)?),
            Command::SwitchSide(side) => {
                session.switch_side(side).await?;
                CommandOutcome::Done
            }
            Command::ResetSide => CommandOutcome::Cleared(session.reset()?),
            Command::StartOver => {
                session.start_over();
                CommandOutcome::Done
            }
            Command::Export => return self.export().await,
            Command::Save => return self.save().await,
            Command::Gallery => CommandOutcome::Gallery(self.store.list_all().await?),
        };
        Ok(outcome)
    }

    async fn export(&mut self) -> CustomizerResult<CommandOutcome> {
        match self
            .pipeline
            .run(&mut self.session, self.generator.as_ref())
            .await
        {
            Ok(document) => {
                self.notifier.notify(Notification::info(
                    "PDF Exported",
                    format!(
                        "Job sheet for {} has been downloaded.",
                        self.session.state().product_name
                    ),
                ));
                Ok(CommandOutcome::Exported(document))
            }
            Err(e) => {
                self.notifier.notify(Notification::export_failed(&e));
                Err(e)
            }
        }
    }

    async fn save(&mut self) -> CustomizerResult<CommandOutcome> {
        match self
            .pipeline
            .save(&mut self.session, self.store.as_ref())
            .await
        {
            Ok(record) => {
                self.notifier.notify(Notification::info(
                    "Design Saved!",
                    "Your design has been saved successfully.",
                ));
                Ok(CommandOutcome::Saved(Box::new(record)))
            }
            Err(e) => {
                self.notifier.notify(Notification::save_failed(&e));
                Err(e)
            }
        }
    }
}

const fn changed(changed: bool) -> CommandOutcome {
    if changed {
        CommandOutcome::Done
    } else {
        CommandOutcome::Unchanged
    }
}
