//! This crate implements 2D partitioning of world objects for fast geometric
//! lookup.
//!
//! Objects implement [`Spatial`] and carry a [`SpatialBody`] with their axis
//! aligned bounding box. Indexes implement [`SpatialIndex`]:
//!
//! * [`GridIndex`] is a square grid of object sets which keeps itself up to
//!   date by subscribing to move and resize notifications of tracked objects.
//!
//! * [`LinearIndex`] is a brute force reference implementation.
//!
//! * [`AggregateIndex`] presents several indexes as one for querying.
//!
//! * [`IndexManager`] routes objects to per-category indexes based on a
//!   [`Taxonomy`] of object categories.
mod aggregate;
mod category;
mod grid;
mod index;
mod linear;
mod manager;
mod query;
mod range;
mod rect;
mod segment;
mod spatial;
#[cfg(test)]
mod testing;

pub use self::{
    aggregate::AggregateIndex,
    category::{Category, CategoryError, Taxonomy, TaxonomyBuilder, MAX_CATEGORIES},
    grid::{ConfigError, GridIndex, DEFAULT_SEGMENT_SIZE, MIN_SEGMENT_SIZE},
    index::{IndexError, SpatialIndex},
    linear::LinearIndex,
    manager::{IndexManager, ManagerError},
    query::{Query, Region},
    range::CellRange,
    rect::Rect,
    segment::Segment,
    spatial::{Spatial, SpatialBody, SpatialId, SpatialListener, SpatialRef, Subscription},
};
