//! This module implements final (i.e. parsed and validated) simulation
//! configuration objects and their building from persistent configuration.

use anyhow::{ensure, Context, Error, Result};
use de_spatial::{DEFAULT_SEGMENT_SIZE, MIN_SEGMENT_SIZE};

use crate::persisted;

const DEFAULT_AREA_SIZE: [f32; 2] = [1024., 1024.];
const DEFAULT_OBJECTS: usize = 1000;
const DEFAULT_TICKS: u32 = 100;
const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexConf {
    segment_size: u32,
    area_size: [f32; 2],
}

impl IndexConf {
    /// Edge length of a single grid index segment.
    pub fn segment_size(&self) -> u32 {
        self.segment_size
    }

    /// Size of the indexed world area. The area spans from the origin to this
    /// point.
    pub fn area_size(&self) -> [f32; 2] {
        self.area_size
    }
}

impl Default for IndexConf {
    fn default() -> Self {
        Self {
            segment_size: DEFAULT_SEGMENT_SIZE,
            area_size: DEFAULT_AREA_SIZE,
        }
    }
}

impl TryFrom<persisted::Index> for IndexConf {
    type Error = Error;

    fn try_from(persisted: persisted::Index) -> Result<Self> {
        let segment_size = persisted.segment_size.unwrap_or(DEFAULT_SEGMENT_SIZE);
        ensure!(
            segment_size >= MIN_SEGMENT_SIZE,
            "`segment_size` must be greater or equal to {MIN_SEGMENT_SIZE}, got {segment_size}."
        );

        let area_size = persisted.area_size.unwrap_or(DEFAULT_AREA_SIZE);
        for value in area_size {
            ensure!(value.is_finite(), "`area_size` must be finite.");
            ensure!(value > 0., "`area_size` must be positive.");
        }

        Ok(Self {
            segment_size,
            area_size,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldConf {
    index: IndexConf,
    objects: usize,
    ticks: u32,
    seed: u64,
}

impl WorldConf {
    pub fn index(&self) -> &IndexConf {
        &self.index
    }

    /// Number of objects spawned at the beginning of the simulation.
    pub fn objects(&self) -> usize {
        self.objects
    }

    /// Number of simulated ticks.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Seed of the random generator placing and moving objects.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the configuration with a different number of simulated ticks.
    pub fn with_ticks(mut self, ticks: u32) -> Self {
        self.ticks = ticks;
        self
    }
}

impl Default for WorldConf {
    fn default() -> Self {
        Self {
            index: IndexConf::default(),
            objects: DEFAULT_OBJECTS,
            ticks: DEFAULT_TICKS,
            seed: DEFAULT_SEED,
        }
    }
}

impl TryFrom<persisted::Configuration> for WorldConf {
    type Error = Error;

    fn try_from(persisted: persisted::Configuration) -> Result<Self> {
        let index = IndexConf::try_from(persisted.index.unwrap_or_default())
            .context("Invalid `index` configuration")?;

        let world = persisted.world.unwrap_or_default();
        let objects = world.objects.unwrap_or(DEFAULT_OBJECTS);
        ensure!(objects > 0, "`objects` must be positive.");

        Ok(Self {
            index,
            objects,
            ticks: world.ticks.unwrap_or(DEFAULT_TICKS),
            seed: world.seed.unwrap_or(DEFAULT_SEED),
        })
    }
}
