#![allow(dead_code)]

use std::rc::Rc;

use de_spatial::{
    Category, Spatial, SpatialBody, SpatialId, SpatialRef, Taxonomy, TaxonomyBuilder,
};
use glam::Vec2;

pub struct Object {
    body: SpatialBody,
    category: Category,
}

impl Spatial for Object {
    fn body(&self) -> &SpatialBody {
        &self.body
    }

    fn category(&self) -> Category {
        self.category
    }
}

pub fn object(category: Category, position: Vec2, size: Vec2) -> SpatialRef {
    Rc::new(Object {
        body: SpatialBody::new(position, size),
        category,
    })
}

pub fn sorted_ids(spatials: &[SpatialRef]) -> Vec<SpatialId> {
    let mut ids: Vec<SpatialId> = spatials.iter().map(|spatial| spatial.id()).collect();
    ids.sort();
    ids
}

/// ```text
/// spatial
/// ├── movable
/// │   └── unit (also attackable)
/// └── static
///     ├── building (also attackable)
///     └── tree
/// attackable
/// ```
pub struct World {
    pub taxonomy: Taxonomy,
    pub spatial: Category,
    pub attackable: Category,
    pub movable: Category,
    pub stationary: Category,
    pub unit: Category,
    pub building: Category,
    pub tree: Category,
}

impl World {
    pub fn new() -> Self {
        let mut builder = TaxonomyBuilder::new();
        let spatial = builder.define("spatial", &[]).unwrap();
        let attackable = builder.define("attackable", &[]).unwrap();
        let movable = builder.define("movable", &[spatial]).unwrap();
        let stationary = builder.define("static", &[spatial]).unwrap();
        let unit = builder.define("unit", &[movable, attackable]).unwrap();
        let building = builder.define("building", &[stationary, attackable]).unwrap();
        let tree = builder.define("tree", &[stationary]).unwrap();
        Self {
            taxonomy: builder.build(),
            spatial,
            attackable,
            movable,
            stationary,
            unit,
            building,
            tree,
        }
    }
}
