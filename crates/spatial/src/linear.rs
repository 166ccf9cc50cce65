//! Brute force index keeping all objects in a single flat list.

use std::{cell::RefCell, fmt, ops::ControlFlow};

use glam::Vec2;

use crate::{
    index::{IndexError, SpatialIndex},
    query::Query,
    spatial::{Spatial, SpatialRef},
};

/// Index with O(n) queries. It does not subscribe to object notifications,
/// objects are tested against their current bounding box during each query.
///
/// It is used as a reference implementation in tests and is a reasonable
/// choice for very small collections.
#[derive(Default)]
pub struct LinearIndex {
    items: RefCell<Vec<SpatialRef>>,
}

impl LinearIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Debug for LinearIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LinearIndex")
            .field("tracked", &self.items.borrow().len())
            .finish()
    }
}

impl SpatialIndex for LinearIndex {
    fn set_area_size(&self, _size: Vec2) {}

    fn add(&self, spatial: SpatialRef) -> Result<(), IndexError> {
        let mut items = self.items.borrow_mut();
        let id = spatial.id();
        let already_tracked = items.iter().any(|item| item.id() == id);
        debug_assert!(!already_tracked, "Object {id:?} is already tracked.");
        if !already_tracked {
            items.push(spatial);
        }
        Ok(())
    }

    fn remove(&self, spatial: &dyn Spatial) -> Result<bool, IndexError> {
        let mut items = self.items.borrow_mut();
        let id = spatial.id();
        match items.iter().position(|item| item.id() == id) {
            Some(position) => {
                items.swap_remove(position);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn clear(&self) {
        self.items.borrow_mut().clear();
    }

    fn len(&self) -> usize {
        self.items.borrow().len()
    }

    fn is_tracked(&self, spatial: &dyn Spatial) -> bool {
        let id = spatial.id();
        self.items.borrow().iter().any(|item| item.id() == id)
    }

    fn visit(
        &self,
        query: &Query<'_>,
        visitor: &mut dyn FnMut(&SpatialRef) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        for spatial in self.items.borrow().iter() {
            if query.matches(spatial.as_ref()) {
                visitor(spatial)?;
            }
        }
        ControlFlow::Continue(())
    }
}
