//! Read-only union of multiple indexes.

use std::{fmt, ops::ControlFlow, rc::Rc};

use ahash::AHashSet;
use glam::Vec2;

use crate::{
    index::{Deduplicator, IndexError, SpatialIndex},
    query::Query,
    spatial::{Spatial, SpatialRef},
};

const NAME: &str = "aggregate index";

/// Query-time view presenting several indexes as one.
///
/// Queries are dispatched to every member in order and the results are
/// merged. The aggregate does not own any objects: adding or removing
/// objects fails with [`IndexError::Unsupported`], member indexes have to be
/// mutated directly.
pub struct AggregateIndex {
    members: Vec<Rc<dyn SpatialIndex>>,
}

impl AggregateIndex {
    /// Creates a new aggregate. Members which are aggregates themselves are
    /// recursively replaced by their members and duplicate members are
    /// dropped, thus queries are always dispatched over a single level.
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = Rc<dyn SpatialIndex>>,
    {
        let mut flat = Vec::new();
        let mut seen = AHashSet::new();
        for member in members {
            Self::flatten(member, &mut flat, &mut seen);
        }
        Self { members: flat }
    }

    pub fn members(&self) -> &[Rc<dyn SpatialIndex>] {
        self.members.as_slice()
    }

    fn flatten(
        member: Rc<dyn SpatialIndex>,
        flat: &mut Vec<Rc<dyn SpatialIndex>>,
        seen: &mut AHashSet<*const ()>,
    ) {
        match member.as_aggregate() {
            Some(aggregate) => {
                for nested in aggregate.members() {
                    Self::flatten(Rc::clone(nested), flat, seen);
                }
            }
            None => {
                if seen.insert(Rc::as_ptr(&member) as *const ()) {
                    flat.push(member);
                }
            }
        }
    }

    fn unsupported(operation: &'static str) -> IndexError {
        IndexError::Unsupported {
            operation,
            index: NAME,
        }
    }
}

impl fmt::Debug for AggregateIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AggregateIndex")
            .field("members", &self.members.len())
            .finish()
    }
}

impl SpatialIndex for AggregateIndex {
    fn set_area_size(&self, size: Vec2) {
        for member in &self.members {
            member.set_area_size(size);
        }
    }

    fn add(&self, _spatial: SpatialRef) -> Result<(), IndexError> {
        Err(Self::unsupported("add"))
    }

    fn remove(&self, _spatial: &dyn Spatial) -> Result<bool, IndexError> {
        Err(Self::unsupported("remove"))
    }

    fn add_many(&self, _spatials: &[SpatialRef]) -> Result<(), IndexError> {
        Err(Self::unsupported("add_many"))
    }

    fn remove_many(&self, _spatials: &[SpatialRef]) -> Result<usize, IndexError> {
        Err(Self::unsupported("remove_many"))
    }

    fn clear(&self) {
        for member in &self.members {
            member.clear();
        }
    }

    /// Number of distinct objects tracked by the members.
    fn len(&self) -> usize {
        let mut len = 0;
        let _ = self.visit(&Query::everywhere(), &mut |_| {
            len += 1;
            ControlFlow::Continue(())
        });
        len
    }

    fn is_empty(&self) -> bool {
        self.members.iter().all(|member| member.is_empty())
    }

    fn is_tracked(&self, spatial: &dyn Spatial) -> bool {
        self.members.iter().any(|member| member.is_tracked(spatial))
    }

    fn visit(
        &self,
        query: &Query<'_>,
        visitor: &mut dyn FnMut(&SpatialRef) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        let mut deduplicator = Deduplicator::new(visitor);
        for member in &self.members {
            member.visit(query, &mut |spatial| deduplicator.offer(spatial))?;
        }
        ControlFlow::Continue(())
    }

    /// Returns the first match, trying members in order.
    fn get(&self, query: &Query<'_>) -> Option<SpatialRef> {
        self.members.iter().find_map(|member| member.get(query))
    }

    fn contains(&self, query: &Query<'_>) -> bool {
        self.members.iter().any(|member| member.contains(query))
    }

    fn nearest(&self, point: Vec2, query: &Query<'_>) -> Option<SpatialRef> {
        self.members
            .iter()
            .filter_map(|member| member.nearest(point, query))
            .map(|spatial| (spatial.bounds().distance_squared(point), spatial))
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, spatial)| spatial)
    }

    fn as_aggregate(&self) -> Option<&AggregateIndex> {
        Some(self)
    }
}
