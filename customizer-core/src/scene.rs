//! Scene graph for one side of the product.
//!
//! Holds the ordered design objects (insertion order is z-order), the
//! background layer in its own slot, and the surface's active selection.

use serde::{Deserialize, Serialize};

use crate::{BackgroundLayer, CustomizerError, CustomizerResult, DesignObject, ObjectId};

/// What the surface currently has selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", content = "id", rename_all = "lowercase")]
pub enum SelectionTarget {
    /// Nothing selected.
    #[default]
    None,
    /// A design object.
    Object(ObjectId),
    /// The background layer (never a valid session selection).
    Background,
}

/// The live contents of a rendering surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    /// Design objects, bottom to top.
    objects: Vec<DesignObject>,
    /// Locked product photo, always beneath the objects.
    background: Option<BackgroundLayer>,
    /// Surface-level selection.
    #[serde(skip)]
    active: SelectionTarget,
    /// Side length of the square canvas.
    pub size: f32,
}

impl Scene {
    /// Create an empty scene for a square canvas.
    #[must_use]
    pub fn new(size: f32) -> Self {
        Self {
            objects: Vec::new(),
            background: None,
            active: SelectionTarget::None,
            size,
        }
    }

    /// Add an object on top of the stack.
    pub fn add_object(&mut self, object: DesignObject) -> ObjectId {
        let id = object.id;
        self.objects.push(object);
        id
    }

    /// Remove an object from the scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn remove_object(&mut self, id: ObjectId) -> CustomizerResult<DesignObject> {
        let index = self
            .objects
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| CustomizerError::Surface(format!("Object not found: {id}")))?;
        if self.active == SelectionTarget::Object(id) {
            self.active = SelectionTarget::None;
        }
        Ok(self.objects.remove(index))
    }

    /// Remove every design object, leaving the background in place.
    pub fn clear_objects(&mut self) -> Vec<DesignObject> {
        if matches!(self.active, SelectionTarget::Object(_)) {
            self.active = SelectionTarget::None;
        }
        std::mem::take(&mut self.objects)
    }

    /// Get an object by ID.
    #[must_use]
    pub fn get_object(&self, id: ObjectId) -> Option<&DesignObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Get a mutable reference to an object by ID.
    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut DesignObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Objects in z-order, bottom first.
    #[must_use]
    pub fn objects(&self) -> &[DesignObject] {
        &self.objects
    }

    /// Install a background, returning the one it replaced.
    pub fn set_background(&mut self, layer: BackgroundLayer) -> Option<BackgroundLayer> {
        self.background.replace(layer)
    }

    /// Remove the background.
    pub fn take_background(&mut self) -> Option<BackgroundLayer> {
        if self.active == SelectionTarget::Background {
            self.active = SelectionTarget::None;
        }
        self.background.take()
    }

    /// The current background.
    #[must_use]
    pub fn background(&self) -> Option<&BackgroundLayer> {
        self.background.as_ref()
    }

    /// Set the surface selection.
    ///
    /// Selecting an object that is not in the scene clears the selection.
    pub fn set_active(&mut self, target: SelectionTarget) {
        self.active = match target {
            SelectionTarget::Object(id) if self.get_object(id).is_none() => SelectionTarget::None,
            SelectionTarget::Background if self.background.is_none() => SelectionTarget::None,
            other => other,
        };
    }

    /// The surface selection.
    #[must_use]
    pub fn active(&self) -> SelectionTarget {
        self.active
    }

    /// Hit-test a canvas point: topmost object first, then the background.
    #[must_use]
    pub fn target_at(&self, x: f32, y: f32) -> SelectionTarget {
        if let Some(object) = self.objects.iter().rev().find(|o| o.contains_point(x, y)) {
            return SelectionTarget::Object(object.id);
        }
        match &self.background {
            Some(layer) => {
                let (left, top) = layer.geometry().top_left();
                let inside = x >= left
                    && x <= left + layer.geometry().scaled_width()
                    && y >= top
                    && y <= top + layer.geometry().scaled_height();
                if inside {
                    SelectionTarget::Background
                } else {
                    SelectionTarget::None
                }
            }
            None => SelectionTarget::None,
        }
    }

    /// Number of design objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene has no design objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Geometry, ImageSource, LoadedImage, ObjectKind};

    fn text(content: &str, x: f32, y: f32) -> DesignObject {
        DesignObject::new(
            ObjectKind::Text {
                content: content.to_string(),
                font_family: "Georgia".to_string(),
                font_size: 40.0,
                fill: "#000000".to_string(),
            },
            Geometry::centered(x, y, 100.0, 40.0),
        )
    }

    fn background() -> BackgroundLayer {
        BackgroundLayer::fit(
            LoadedImage {
                source: ImageSource::png(&[0]),
                width: 600,
                height: 600,
            },
            600.0,
        )
    }

    #[test]
    fn test_scene_add_remove_preserves_order() {
        let mut scene = Scene::new(600.0);
        let a = scene.add_object(text("a", 100.0, 100.0));
        let b = scene.add_object(text("b", 200.0, 200.0));
        let c = scene.add_object(text("c", 300.0, 300.0));

        scene.remove_object(b).expect("should remove");
        let ids: Vec<_> = scene.objects().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![a, c]);
        assert!(scene.remove_object(b).is_err());
    }

    #[test]
    fn test_background_is_not_an_object() {
        let mut scene = Scene::new(600.0);
        scene.set_background(background());
        assert!(scene.is_empty());
        assert!(scene.background().is_some());

        scene.add_object(text("x", 300.0, 300.0));
        let removed = scene.clear_objects();
        assert_eq!(removed.len(), 1);
        assert!(scene.background().is_some());
    }

    #[test]
    fn test_target_at_prefers_topmost_object() {
        let mut scene = Scene::new(600.0);
        scene.set_background(background());
        scene.add_object(text("under", 300.0, 300.0));
        let top = scene.add_object(text("over", 300.0, 300.0));

        assert_eq!(scene.target_at(300.0, 300.0), SelectionTarget::Object(top));
        assert_eq!(scene.target_at(20.0, 20.0), SelectionTarget::Background);
    }

    #[test]
    fn test_removing_active_object_clears_selection() {
        let mut scene = Scene::new(600.0);
        let id = scene.add_object(text("a", 10.0, 10.0));
        scene.set_active(SelectionTarget::Object(id));
        scene.remove_object(id).expect("remove");
        assert_eq!(scene.active(), SelectionTarget::None);
    }

    #[test]
    fn test_set_active_ignores_unknown_object() {
        let mut scene = Scene::new(600.0);
        scene.set_active(SelectionTarget::Object(ObjectId::new()));
        assert_eq!(scene.active(), SelectionTarget::None);
    }
}
