//! Design objects - the user-placed elements on a side.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ImageSource;

/// Unique identifier for a design object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new unique object ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from the hyphenated string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The content a design object carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ObjectKind {
    /// A line of text.
    Text {
        /// Literal text content.
        content: String,
        /// Font family name.
        font_family: String,
        /// Font size in canvas units.
        font_size: f32,
        /// Fill color as hex.
        fill: String,
    },

    /// Placed raster artwork.
    Image {
        /// Image data.
        source: ImageSource,
    },
}

/// Discriminant of [`ObjectKind`], used for property compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindTag {
    /// Text object.
    Text,
    /// Image object.
    Image,
}

impl ObjectKind {
    /// The kind's tag.
    #[must_use]
    pub const fn tag(&self) -> KindTag {
        match self {
            Self::Text { .. } => KindTag::Text,
            Self::Image { .. } => KindTag::Image,
        }
    }
}

/// An editable property of a selected object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "property", content = "value", rename_all = "snake_case")]
pub enum Property {
    /// Fill color (hex).
    Fill(String),
    /// Font family.
    FontFamily(String),
}

impl Property {
    /// Whether this property can be applied to an object of the given kind.
    ///
    /// Raster images take neither a fill nor a font.
    #[must_use]
    pub fn applies_to(&self, kind: KindTag) -> bool {
        matches!((self, kind), (Self::Fill(_) | Self::FontFamily(_), KindTag::Text))
    }
}

/// Position, size and orientation, anchored at the object's center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Center X in canvas units.
    pub center_x: f32,
    /// Center Y in canvas units.
    pub center_y: f32,
    /// Unscaled width.
    pub width: f32,
    /// Unscaled height.
    pub height: f32,
    /// Horizontal scale factor.
    pub scale_x: f32,
    /// Vertical scale factor.
    pub scale_y: f32,
    /// Rotation in degrees, clockwise.
    pub angle: f32,
}

impl Geometry {
    /// Geometry centered on a point with unit scale.
    #[must_use]
    pub const fn centered(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
        }
    }

    /// Apply a uniform scale factor.
    #[must_use]
    pub const fn with_scale(mut self, scale: f32) -> Self {
        self.scale_x = scale;
        self.scale_y = scale;
        self
    }

    /// Rendered width after scaling.
    #[must_use]
    pub fn scaled_width(&self) -> f32 {
        self.width * self.scale_x
    }

    /// Rendered height after scaling.
    #[must_use]
    pub fn scaled_height(&self) -> f32 {
        self.height * self.scale_y
    }

    /// Top-left corner of the unrotated bounding box.
    #[must_use]
    pub fn top_left(&self) -> (f32, f32) {
        (
            self.center_x - self.scaled_width() / 2.0,
            self.center_y - self.scaled_height() / 2.0,
        )
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::centered(0.0, 0.0, 100.0, 100.0)
    }
}

/// A placed element on one side of the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignObject {
    /// Unique identifier.
    pub id: ObjectId,
    /// Content.
    pub kind: ObjectKind,
    /// Position and size.
    pub geometry: Geometry,
}

impl DesignObject {
    /// Create a new object with a fresh ID.
    #[must_use]
    pub fn new(kind: ObjectKind, geometry: Geometry) -> Self {
        Self {
            id: ObjectId::new(),
            kind,
            geometry,
        }
    }

    /// The kind's tag.
    #[must_use]
    pub const fn tag(&self) -> KindTag {
        self.kind.tag()
    }

    /// Apply a property if compatible with this object's kind.
    ///
    /// Returns `false` (leaving the object untouched) when incompatible.
    pub fn apply(&mut self, property: &Property) -> bool {
        if !property.applies_to(self.tag()) {
            return false;
        }
        let ObjectKind::Text {
            fill, font_family, ..
        } = &mut self.kind
        else {
            return false;
        };
        match property {
            Property::Fill(color) => fill.clone_from(color),
            Property::FontFamily(font) => font_family.clone_from(font),
        }
        true
    }

    /// Check if a point (in canvas coordinates) is within this object's box.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        let (left, top) = self.geometry.top_left();
        x >= left
            && x <= left + self.geometry.scaled_width()
            && y >= top
            && y <= top + self.geometry.scaled_height()
    }
}
