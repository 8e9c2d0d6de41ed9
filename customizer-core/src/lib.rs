//! # Customizer Core
//!
//! Dual-sided product design sessions: one square canvas, two product sides,
//! a locked product photo behind each side's artwork.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               CommandRunner                 │
//! ├─────────────────────────────────────────────┤
//! │  CanvasSession      │  ExportPipeline       │
//! │  - Side switching   │  - Export gate        │
//! │  - Object commands  │  - Dual-side capture  │
//! │  - Selection rules  │  - Design records     │
//! ├─────────────────────────────────────────────┤
//! │  SideStore          │  Capability traits    │
//! │  - Side snapshots   │  - RenderingSurface   │
//! │                     │  - AssetLoader        │
//! │                     │  - DocumentGenerator  │
//! │                     │  - DesignStore        │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod asset;
pub mod background;
pub mod command;
pub mod config;
pub mod error;
pub mod export;
pub mod notify;
pub mod object;
pub mod persistence;
pub mod scene;
pub mod schema;
pub mod session;
pub mod side;
pub mod side_store;
pub mod state;
pub mod surface;

pub use asset::{AssetLoader, ImageSource, LoadedImage};
pub use background::BackgroundLayer;
pub use command::{Command, CommandOutcome, CommandRunner};
pub use config::CustomizerConfig;
pub use error::{CustomizerError, CustomizerResult, ValidationError};
pub use export::{
    check_gate, Document, DocumentGenerator, ExportPipeline, JobSheet, SideCaptures,
    VERIFICATION_TEXT,
};
pub use notify::{
    Notification, NotificationVariant, Notifier, RecordingNotifier, TracingNotifier,
};
pub use object::{DesignObject, Geometry, KindTag, ObjectId, ObjectKind, Property};
pub use persistence::{
    DesignRecord, DesignStore, FileDesignStore, MemoryDesignStore, NewDesign,
};
pub use scene::{Scene, SelectionTarget};
pub use schema::{CanvasDocument, ObjectDocument, SideDocument, SideSnapshot, DOCUMENT_VERSION};
pub use session::{CanvasSession, SessionPhase};
pub use side::{PerSide, Side};
pub use side_store::SideStore;
pub use state::{CustomerField, CustomerInfo, SessionState};
pub use surface::{Raster, RasterOptions, RenderingSurface, SurfaceFactory, SurfaceSpec};

/// Customizer core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
