//! Design record storage.
//!
//! Records are append-only: [`DesignStore::save`] assigns the id and creation
//! time, [`DesignStore::list_all`] returns records in insertion order.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CanvasDocument, CustomizerError, CustomizerResult, ImageSource, Side};

/// A design ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDesign {
    /// Catalogue product id.
    pub product_id: u32,
    /// Product name at save time.
    pub product_name: String,
    /// Side shown at save time.
    pub side: Side,
    /// Full design serialization.
    pub canvas: CanvasDocument,
    /// Low-resolution preview of the active side.
    pub preview_image: ImageSource,
    /// Customer signature, if captured.
    #[serde(default)]
    pub signature: Option<ImageSource>,
    /// Design accuracy attestation.
    #[serde(default)]
    pub verified: bool,
}

/// A stored design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignRecord {
    /// Record identifier.
    pub id: Uuid,
    /// When the record was stored.
    pub created_at: DateTime<Utc>,
    /// Stored content.
    #[serde(flatten)]
    pub design: NewDesign,
}

impl DesignRecord {
    /// Assign an id and timestamp to a new design.
    #[must_use]
    pub fn create(design: NewDesign) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            design,
        }
    }
}

/// Storage for design records.
#[async_trait]
pub trait DesignStore: Send + Sync {
    /// Store a design, returning the created record.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::Persistence`] if the record cannot be stored.
    async fn save(&self, design: NewDesign) -> CustomizerResult<DesignRecord>;

    /// All stored records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::Persistence`] if the store cannot be read.
    async fn list_all(&self) -> CustomizerResult<Vec<DesignRecord>>;
}

/// In-memory store, shared by cloning.
#[derive(Debug, Clone, Default)]
pub struct MemoryDesignStore {
    records: Arc<RwLock<Vec<DesignRecord>>>,
}

impl MemoryDesignStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DesignStore for MemoryDesignStore {
    async fn save(&self, design: NewDesign) -> CustomizerResult<DesignRecord> {
        let record = DesignRecord::create(design);
        self.records
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(record.clone());
        Ok(record)
    }

    async fn list_all(&self) -> CustomizerResult<Vec<DesignRecord>> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }
}

/// Store backed by a single JSON file holding the record list.
///
/// A missing file reads as an empty store. An unreadable or corrupt file is
/// an error and is never overwritten.
#[derive(Debug, Clone)]
pub struct FileDesignStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl FileDesignStore {
    /// Create a store at the given path. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_records(&self) -> CustomizerResult<Vec<DesignRecord>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CustomizerError::Persistence(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents).map_err(|e| {
            CustomizerError::Persistence(format!("Corrupt store {}: {e}", self.path.display()))
        })
    }

    async fn write_records(&self, records: &[DesignRecord]) -> CustomizerResult<()> {
        let json = serde_json::to_string_pretty(records)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CustomizerError::Persistence(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, json).await.map_err(|e| {
            CustomizerError::Persistence(format!("Failed to write {}: {e}", staging.display()))
        })?;
        tokio::fs::rename(&staging, &self.path).await.map_err(|e| {
            CustomizerError::Persistence(format!(
                "Failed to replace {}: {e}",
                self.path.display()
            ))
        })
    }
}

#[async_trait]
impl DesignStore for FileDesignStore {
    async fn save(&self, design: NewDesign) -> CustomizerResult<DesignRecord> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_records().await?;
        let record = DesignRecord::create(design);
        records.push(record.clone());
        self.write_records(&records).await?;
        tracing::debug!(
            "Persisted design {} to {} ({} total)",
            record.id,
            self.path.display(),
            records.len()
        );
        Ok(record)
    }

    async fn list_all(&self) -> CustomizerResult<Vec<DesignRecord>> {
        let _guard = self.lock.lock().await;
        self.read_records().await
    }
}
