//! Common interface of all spatial indexes.

use std::ops::ControlFlow;

use ahash::AHashSet;
use glam::Vec2;
use thiserror::Error;

use crate::{
    aggregate::AggregateIndex,
    query::Query,
    spatial::{Spatial, SpatialId, SpatialRef},
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IndexError {
    #[error("`{operation}` is not supported by {index}")]
    Unsupported {
        operation: &'static str,
        index: &'static str,
    },
}

/// Spatial index of [`Spatial`] objects.
///
/// All methods take a shared reference: indexes are shared via `Rc` between
/// aggregates, the routing manager and move / resize notifications. Indexes
/// are neither `Send` nor `Sync` and are not reentrant: a query predicate
/// must not move or resize objects tracked by the queried index.
pub trait SpatialIndex {
    /// (Re)configures the extent of the tracked world area.
    fn set_area_size(&self, size: Vec2);

    /// Starts tracking an object.
    fn add(&self, spatial: SpatialRef) -> Result<(), IndexError>;

    /// Stops tracking an object. Returns `Ok(false)` if the object was not
    /// tracked.
    fn remove(&self, spatial: &dyn Spatial) -> Result<bool, IndexError>;

    /// Removes all tracked objects.
    fn clear(&self);

    /// Number of tracked objects.
    fn len(&self) -> usize;

    fn is_tracked(&self, spatial: &dyn Spatial) -> bool;

    /// Calls `visitor` for every object matching the query, each object at
    /// most once. Iteration stops as soon as the visitor breaks.
    fn visit(
        &self,
        query: &Query<'_>,
        visitor: &mut dyn FnMut(&SpatialRef) -> ControlFlow<()>,
    ) -> ControlFlow<()>;

    /// Returns `Some` if the index is an aggregate of other indexes.
    fn as_aggregate(&self) -> Option<&AggregateIndex> {
        None
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn add_many(&self, spatials: &[SpatialRef]) -> Result<(), IndexError> {
        for spatial in spatials {
            self.add(SpatialRef::clone(spatial))?;
        }
        Ok(())
    }

    /// Returns the number of objects which were tracked and got removed.
    fn remove_many(&self, spatials: &[SpatialRef]) -> Result<usize, IndexError> {
        let mut removed = 0;
        for spatial in spatials {
            if self.remove(spatial.as_ref())? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Returns true if at least one object matches the query.
    fn contains(&self, query: &Query<'_>) -> bool {
        self.visit(query, &mut |_| ControlFlow::Break(())).is_break()
    }

    /// Returns an arbitrary object matching the query.
    fn get(&self, query: &Query<'_>) -> Option<SpatialRef> {
        let mut found = None;
        let _ = self.visit(query, &mut |spatial| {
            found = Some(SpatialRef::clone(spatial));
            ControlFlow::Break(())
        });
        found
    }

    /// Returns all objects matching the query, without duplicates and in no
    /// particular order.
    fn get_many(&self, query: &Query<'_>) -> Vec<SpatialRef> {
        let mut found = Vec::new();
        let _ = self.visit(query, &mut |spatial| {
            found.push(SpatialRef::clone(spatial));
            ControlFlow::Continue(())
        });
        found
    }

    /// Returns the matching object whose bounding box is closest to `point`.
    /// Ties are broken arbitrarily.
    fn nearest(&self, point: Vec2, query: &Query<'_>) -> Option<SpatialRef> {
        let mut best: Option<(f32, SpatialRef)> = None;
        let _ = self.visit(query, &mut |spatial| {
            let distance = spatial.bounds().distance_squared(point);
            if best.as_ref().map_or(true, |(closest, _)| distance < *closest) {
                best = Some((distance, SpatialRef::clone(spatial)));
            }
            ControlFlow::Continue(())
        });
        best.map(|(_, spatial)| spatial)
    }
}

/// Visits objects from multiple (possibly overlapping) sources while
/// suppressing duplicates.
pub(crate) struct Deduplicator<'a> {
    seen: AHashSet<SpatialId>,
    visitor: &'a mut dyn FnMut(&SpatialRef) -> ControlFlow<()>,
}

impl<'a> Deduplicator<'a> {
    pub(crate) fn new(visitor: &'a mut dyn FnMut(&SpatialRef) -> ControlFlow<()>) -> Self {
        Self {
            seen: AHashSet::new(),
            visitor,
        }
    }

    pub(crate) fn offer(&mut self, spatial: &SpatialRef) -> ControlFlow<()> {
        if self.seen.insert(spatial.id()) {
            (self.visitor)(spatial)
        } else {
            ControlFlow::Continue(())
        }
    }
}
