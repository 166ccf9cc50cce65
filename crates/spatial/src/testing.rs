//! Helpers shared by unit tests.

use std::rc::Rc;

use glam::Vec2;

use crate::{
    category::{Category, Taxonomy, TaxonomyBuilder},
    spatial::{Spatial, SpatialBody, SpatialId, SpatialRef},
};

pub(crate) struct Block {
    body: SpatialBody,
    category: Category,
}

impl Spatial for Block {
    fn body(&self) -> &SpatialBody {
        &self.body
    }

    fn category(&self) -> Category {
        self.category
    }
}

pub(crate) fn block(category: Category, position: Vec2, size: Vec2) -> SpatialRef {
    Rc::new(Block {
        body: SpatialBody::new(position, size),
        category,
    })
}

/// Sorted IDs of the objects.
pub(crate) fn ids(spatials: Vec<SpatialRef>) -> Vec<SpatialId> {
    let mut ids: Vec<SpatialId> = spatials.iter().map(|spatial| spatial.id()).collect();
    ids.sort();
    ids
}

/// Small taxonomy:
///
/// ```text
/// spatial
/// ├── unit (also attackable)
/// │   └── tank
/// └── building (also attackable)
/// attackable
/// tree
/// ```
pub(crate) struct Kinds {
    pub(crate) taxonomy: Taxonomy,
    pub(crate) spatial: Category,
    pub(crate) attackable: Category,
    pub(crate) unit: Category,
    pub(crate) tank: Category,
    pub(crate) building: Category,
    pub(crate) tree: Category,
}

impl Kinds {
    pub(crate) fn new() -> Self {
        let mut builder = TaxonomyBuilder::new();
        let spatial = builder.define("spatial", &[]).unwrap();
        let attackable = builder.define("attackable", &[]).unwrap();
        let unit = builder.define("unit", &[spatial, attackable]).unwrap();
        let tank = builder.define("tank", &[unit]).unwrap();
        let building = builder.define("building", &[spatial, attackable]).unwrap();
        let tree = builder.define("tree", &[]).unwrap();
        Self {
            taxonomy: builder.build(),
            spatial,
            attackable,
            unit,
            tank,
            building,
            tree,
        }
    }
}
