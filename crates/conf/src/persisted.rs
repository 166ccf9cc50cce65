//! This module contains configuration object which can be deserialized from
//! a configuration file. It does not contain final configuration object which
//! must be build and validated from the objects here.

use serde::Deserialize;

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub(super) struct Configuration {
    pub(super) index: Option<Index>,
    pub(super) world: Option<World>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub(super) struct Index {
    pub(super) segment_size: Option<u32>,
    pub(super) area_size: Option<[f32; 2]>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub(super) struct World {
    pub(super) objects: Option<usize>,
    pub(super) ticks: Option<u32>,
    pub(super) seed: Option<u64>,
}
