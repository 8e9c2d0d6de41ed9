//! Serialized forms of design objects, side snapshots and whole designs.

use serde::{Deserialize, Serialize};

use crate::{
    BackgroundLayer, CustomizerError, CustomizerResult, DesignObject, Geometry, ImageSource,
    KindTag, ObjectId, ObjectKind, PerSide, Side,
};

/// Current version of [`CanvasDocument`].
pub const DOCUMENT_VERSION: u32 = 1;

/// Document-friendly object description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDocument {
    /// Object identifier.
    pub id: String,
    /// Object content.
    pub kind: ObjectKind,
    /// Placement.
    #[serde(default)]
    pub geometry: Geometry,
}

impl From<&DesignObject> for ObjectDocument {
    fn from(object: &DesignObject) -> Self {
        Self {
            id: object.id.to_string(),
            kind: object.kind.clone(),
            geometry: object.geometry,
        }
    }
}

impl ObjectDocument {
    /// The object's kind tag.
    #[must_use]
    pub const fn tag(&self) -> KindTag {
        self.kind.tag()
    }

    /// Convert document to a live object.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::Surface`] if the id is not a valid UUID.
    pub fn into_object(self) -> CustomizerResult<DesignObject> {
        let id = ObjectId::parse(&self.id)
            .map_err(|e| CustomizerError::Surface(format!("Invalid object id {}: {e}", self.id)))?;
        Ok(DesignObject {
            id,
            kind: self.kind,
            geometry: self.geometry,
        })
    }
}

/// The serialized design objects of one side, bottom first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideSnapshot {
    /// Objects in z-order.
    pub objects: Vec<ObjectDocument>,
}

impl SideSnapshot {
    /// Whether the snapshot holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }
}

/// One side of a saved design.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideDocument {
    /// Uploaded product photo, if any.
    #[serde(default)]
    pub image: Option<ImageSource>,
    /// Fitted background, if the side has been shown.
    #[serde(default)]
    pub background: Option<BackgroundLayer>,
    /// Design objects in z-order.
    #[serde(default)]
    pub objects: Vec<ObjectDocument>,
}

/// Full serialization of a design: both sides, live or stored, with
/// backgrounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasDocument {
    /// Format version.
    pub version: u32,
    /// Side length of the square canvas.
    pub canvas_size: f32,
    /// Side shown when the design was saved.
    pub active_side: Side,
    /// Per-side content.
    pub sides: PerSide<SideDocument>,
}

impl CanvasDocument {
    /// Total design objects across both sides.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.sides.front.objects.len() + self.sides.back.objects.len()
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CustomizerResult<String> {
        serde_json::to_string_pretty(self).map_err(CustomizerError::Serialization)
    }
}
