use std::rc::Rc;

use anyhow::{bail, Context, Result};
use de_conf::WorldConf;
use de_spatial::{
    Category, IndexManager, LinearIndex, Query, Rect, Spatial, SpatialBody, SpatialId,
    SpatialIndex, SpatialRef,
};
use fastrand::Rng;
use glam::Vec2;
use tracing::{debug, info};

use crate::kinds::Kinds;

/// Maximum distance travelled by a unit during a single tick.
const MAX_STEP: f32 = 8.;
const UNIT_SIZE: f32 = 2.;
const BUILDING_SIZE: f32 = 30.;
const TREE_SIZE: f32 = 4.;
/// Edge length of areas searched during each tick.
const SEARCH_SIZE: f32 = 100.;

struct Entity {
    body: SpatialBody,
    category: Category,
}

impl Spatial for Entity {
    fn body(&self) -> &SpatialBody {
        &self.body
    }

    fn category(&self) -> Category {
        self.category
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Stats {
    pub(crate) ticks: u32,
    pub(crate) moves: u64,
    pub(crate) queries: u64,
    pub(crate) hits: u64,
}

/// Headless world of randomly placed objects whose units wander around.
///
/// Every query answered by the category routed grid indexes is cross-checked
/// against a brute force index of all objects.
pub(crate) struct Simulation {
    kinds: Kinds,
    area: Vec2,
    rng: Rng,
    manager: IndexManager,
    reference: LinearIndex,
    units: Vec<SpatialRef>,
    stats: Stats,
}

impl Simulation {
    pub(crate) fn new(conf: &WorldConf) -> Result<Self> {
        let kinds = Kinds::new()?;
        let manager = IndexManager::with_grids(
            &kinds.taxonomy,
            &kinds.indexed(),
            conf.index().segment_size(),
        )
        .context("Failed to create spatial indexes")?;
        let area = Vec2::from(conf.index().area_size());
        manager.set_area_size(area);

        let mut simulation = Self {
            kinds,
            area,
            rng: Rng::with_seed(conf.seed()),
            manager,
            reference: LinearIndex::new(),
            units: Vec::new(),
            stats: Stats::default(),
        };
        simulation.spawn(conf.objects())?;
        Ok(simulation)
    }

    pub(crate) fn manager(&self) -> &IndexManager {
        &self.manager
    }

    /// Simulates a number of ticks and returns statistics accumulated since
    /// the creation of the simulation.
    pub(crate) fn run(&mut self, ticks: u32) -> Result<Stats> {
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(self.stats)
    }

    /// Moves all units by a random step and runs sample queries.
    pub(crate) fn tick(&mut self) -> Result<()> {
        for unit in self.units.iter() {
            let step = (Vec2::new(self.rng.f32(), self.rng.f32()) - 0.5) * 2. * MAX_STEP;
            let position = self.clamp(unit.position() + step, unit.size());
            unit.body().set_position(position);
        }
        self.stats.moves += self.units.len() as u64;

        let corner = self.random_position(Vec2::splat(SEARCH_SIZE));
        let area = Rect::from_position_size(corner, Vec2::splat(SEARCH_SIZE));
        let center = corner + SEARCH_SIZE / 2.;

        let everywhere = Query::everywhere();
        let queries = [
            Query::intersecting(area),
            Query::intersecting(area).of(self.kinds.attackable),
            Query::enclosed(area).of(self.kinds.stationary),
            Query::at(center).of(self.kinds.spatial),
            everywhere.of(self.kinds.unit),
        ];
        for query in queries.iter() {
            self.check(query)?;
        }
        self.check_nearest(center, &everywhere.of(self.kinds.building))?;

        self.stats.ticks += 1;
        debug!("Tick {} finished.", self.stats.ticks);
        Ok(())
    }

    fn spawn(&mut self, objects: usize) -> Result<()> {
        for i in 0..objects {
            let (category, size) = match i % 10 {
                0 => (self.kinds.building, BUILDING_SIZE),
                1..=3 => (self.kinds.tree, TREE_SIZE),
                _ => (self.kinds.unit, UNIT_SIZE),
            };
            let size = Vec2::splat(size);
            let position = self.random_position(size);
            let entity: SpatialRef = Rc::new(Entity {
                body: SpatialBody::new(position, size),
                category,
            });

            self.manager.add(SpatialRef::clone(&entity))?;
            self.reference.add(SpatialRef::clone(&entity))?;
            if category == self.kinds.unit {
                self.units.push(entity);
            }
        }

        info!(
            "Spawned {} objects ({} units) over {} indexes.",
            objects,
            self.units.len(),
            self.manager.num_nodes()
        );
        Ok(())
    }

    fn check(&mut self, query: &Query) -> Result<()> {
        let mut found = ids(self.manager.get_many(query));
        let expected = ids(self.reference.get_many(query));
        if found != expected {
            bail!(
                "Spatial index returned {} objects instead of {} for {:?}",
                found.len(),
                expected.len(),
                query
            );
        }

        let len = found.len();
        found.dedup();
        if found.len() != len {
            bail!("Spatial index returned duplicate objects for {:?}", query);
        }

        self.stats.queries += 1;
        self.stats.hits += len as u64;
        Ok(())
    }

    fn check_nearest(&mut self, point: Vec2, query: &Query) -> Result<()> {
        let distance = |spatial: Option<SpatialRef>| {
            spatial.map(|spatial| spatial.bounds().distance_squared(point))
        };
        let found = distance(self.manager.nearest(point, query));
        let expected = distance(self.reference.nearest(point, query));
        if found != expected {
            bail!(
                "Nearest object to {} is at squared distance {:?} instead of {:?}",
                point,
                found,
                expected
            );
        }

        self.stats.queries += 1;
        self.stats.hits += found.is_some() as u64;
        Ok(())
    }

    fn random_position(&mut self, size: Vec2) -> Vec2 {
        Vec2::new(self.rng.f32(), self.rng.f32()) * (self.area - size).max(Vec2::ZERO)
    }

    /// Keeps an object of a given size within the world area.
    fn clamp(&self, position: Vec2, size: Vec2) -> Vec2 {
        position.clamp(Vec2::ZERO, (self.area - size).max(Vec2::ZERO))
    }
}

fn ids(spatials: Vec<SpatialRef>) -> Vec<SpatialId> {
    let mut ids: Vec<_> = spatials.iter().map(|spatial| spatial.id()).collect();
    ids.sort();
    ids
}
