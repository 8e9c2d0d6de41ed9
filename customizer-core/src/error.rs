//! Error types for customizer operations.

use thiserror::Error;

use crate::CustomerField;

/// Result type for customizer operations.
pub type CustomizerResult<T> = Result<T, CustomizerError>;

/// Errors that can occur while driving a design session.
///
/// None of these are fatal: every failure is local to the operation that
/// produced it and leaves the session usable.
#[derive(Debug, Error)]
pub enum CustomizerError {
    /// Export gate refused the request.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An image source could not be decoded or loaded.
    #[error("Failed to load asset: {0}")]
    AssetLoad(String),

    /// The rendering surface could not produce a raster capture.
    #[error("Capture failed: {0}")]
    Capture(String),

    /// The document generator failed to lay out the job sheet.
    #[error("Document generation failed: {0}")]
    DocumentGeneration(String),

    /// The persistence store rejected or failed a request.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The rendering surface reported an error.
    #[error("Surface error: {0}")]
    Surface(String),

    /// The operation is not valid in the session's current phase.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A command line could not be parsed.
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reasons the export gate refuses to produce a job sheet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more customer fields are blank after trimming.
    #[error("Please fill in: {}", join_labels(.0))]
    MissingFields(Vec<CustomerField>),

    /// The design accuracy attestation was not given.
    #[error("Please check the verification box to confirm design accuracy.")]
    NotVerified,

    /// No customer signature has been captured.
    #[error("Please provide a customer signature before exporting.")]
    MissingSignature,
}

impl ValidationError {
    /// Short title for user-facing notifications.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "Required Fields Missing",
            Self::NotVerified => "Verification Required",
            Self::MissingSignature => "Signature Required",
        }
    }

    /// Labels of the missing items.
    #[must_use]
    pub fn missing_labels(&self) -> Vec<&'static str> {
        match self {
            Self::MissingFields(fields) => fields.iter().map(|f| f.label()).collect(),
            Self::NotVerified => vec!["Verification"],
            Self::MissingSignature => vec!["Signature"],
        }
    }
}

fn join_labels(fields: &[CustomerField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}
