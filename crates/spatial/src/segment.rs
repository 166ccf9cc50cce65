//! A single cell of the grid index.

use ahash::AHashMap;

use crate::spatial::{SpatialId, SpatialRef};

/// Unordered set of objects whose bounding box overlaps a grid cell.
///
/// The segment keeps only shared references, it does not own the objects.
#[derive(Default)]
pub struct Segment {
    items: AHashMap<SpatialId, SpatialRef>,
}

impl Segment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an object to the segment. Returns false (and keeps the set
    /// unchanged) if the object is already present.
    pub fn add(&mut self, spatial: &SpatialRef) -> bool {
        let id = spatial.id();
        if self.items.contains_key(&id) {
            return false;
        }
        self.items.insert(id, SpatialRef::clone(spatial));
        true
    }

    /// Returns true if the object was present.
    pub fn remove(&mut self, id: SpatialId) -> bool {
        self.items.remove(&id).is_some()
    }

    pub fn contains(&self, id: SpatialId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &SpatialRef> + '_ {
        self.items.values()
    }
}
