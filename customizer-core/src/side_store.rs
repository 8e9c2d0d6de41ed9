//! Per-side snapshot storage.
//!
//! Only one side lives on the surface at a time. The other side's objects are
//! kept here as a [`SideSnapshot`] until the user returns to it.

use crate::{CustomizerResult, PerSide, RenderingSurface, Side, SideSnapshot};

/// Stored snapshots for both sides.
///
/// An absent snapshot means the side has never been left with objects on it
/// (or was reset), which restores as an empty side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideStore {
    snapshots: PerSide<Option<SideSnapshot>>,
}

impl SideStore {
    /// Serialize the surface's current objects, bottom first.
    #[must_use]
    pub fn snapshot(surface: &dyn RenderingSurface) -> SideSnapshot {
        SideSnapshot {
            objects: surface
                .objects()
                .iter()
                .map(|object| surface.serialize_object(object))
                .collect(),
        }
    }

    /// Snapshot the surface and store it as the given side.
    pub fn capture(&mut self, side: Side, surface: &dyn RenderingSurface) {
        let snapshot = Self::snapshot(surface);
        tracing::debug!("Stored {} object(s) for {side} side", snapshot.len());
        *self.snapshots.get_mut(side) = Some(snapshot);
    }

    /// The stored snapshot for a side.
    #[must_use]
    pub fn get(&self, side: Side) -> Option<&SideSnapshot> {
        self.snapshots.get(side).as_ref()
    }

    /// Recreate a side's stored objects on the surface, preserving z-order.
    ///
    /// Restoring a side with no snapshot is a no-op. Returns the number of
    /// objects added.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot materialize the snapshot; the
    /// surface is left untouched in that case.
    pub async fn restore(
        &self,
        side: Side,
        surface: &mut dyn RenderingSurface,
    ) -> CustomizerResult<usize> {
        let Some(snapshot) = self.get(side) else {
            return Ok(0);
        };
        if snapshot.is_empty() {
            return Ok(0);
        }
        let objects = surface.deserialize_objects(&snapshot.objects).await?;
        let count = objects.len();
        for object in objects {
            surface.add(object);
        }
        surface.render();
        tracing::debug!("Restored {count} object(s) on {side} side");
        Ok(count)
    }

    /// Discard a side's stored snapshot.
    pub fn clear(&mut self, side: Side) {
        *self.snapshots.get_mut(side) = None;
    }
}
