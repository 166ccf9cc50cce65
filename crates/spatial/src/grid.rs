//! This module contains implementation of spatial index based on 2D square
//! grid of object sets.

use std::{
    cell::{Cell, RefCell},
    fmt,
    ops::ControlFlow,
    rc::{Rc, Weak},
};

use ahash::AHashMap;
use glam::{IVec2, Vec2};
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    index::{IndexError, SpatialIndex},
    query::{Query, Region},
    range::CellRange,
    rect::Rect,
    segment::Segment,
    spatial::{Spatial, SpatialId, SpatialListener, SpatialRef, Subscription},
};

/// Minimum edge length (in world units) of a grid segment.
pub const MIN_SEGMENT_SIZE: u32 = 4;
/// Edge length (in world units) of a grid segment used by [`GridIndex::default`].
pub const DEFAULT_SEGMENT_SIZE: u32 = 384;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("segment size has to be at least {min}, got {size}")]
    SegmentTooSmall { size: u32, min: u32 },
}

/// Rectangular grid of square segments, each keeping the objects whose
/// bounding box overlaps it.
///
/// The grid covers the area between the origin and the size set by
/// [`SpatialIndex::set_area_size`]. Parts of objects or queries outside of
/// the area are ignored, in particular queries entirely outside of it yield
/// no results.
///
/// The index subscribes to move and resize notifications of tracked objects
/// and relocates them eagerly, thus it is consistent right after any change
/// of a tracked object returns.
pub struct GridIndex {
    core: Rc<GridCore>,
}

impl GridIndex {
    /// Creates a new empty index with a zero-sized area.
    ///
    /// # Arguments
    ///
    /// * `segment_size` - edge length of a single grid segment. It must be at
    ///   least [`MIN_SEGMENT_SIZE`].
    pub fn new(segment_size: u32) -> Result<Self, ConfigError> {
        if segment_size < MIN_SEGMENT_SIZE {
            return Err(ConfigError::SegmentTooSmall {
                size: segment_size,
                min: MIN_SEGMENT_SIZE,
            });
        }

        Ok(Self {
            core: Rc::new(GridCore {
                segment_size: segment_size as f32,
                state: RefCell::new(GridState::new()),
                relocations: Cell::new(0),
            }),
        })
    }

    /// Creates a new empty index and sets its area size.
    pub fn with_area(segment_size: u32, area_size: Vec2) -> Result<Self, ConfigError> {
        let index = Self::new(segment_size)?;
        index.set_area_size(area_size);
        Ok(index)
    }

    pub fn segment_size(&self) -> f32 {
        self.core.segment_size
    }

    /// Number of segments along each axis.
    pub fn grid_size(&self) -> IVec2 {
        self.core.state.borrow().grid_size
    }

    /// Range of segments covered by a rectangle (clipped to the grid).
    pub fn cell_range(&self, rect: &Rect) -> CellRange {
        self.core.state.borrow().range(rect, self.core.segment_size)
    }

    /// IDs of objects stored in a segment. Returns `None` for cells outside
    /// of the grid.
    pub fn segment_ids(&self, cell: IVec2) -> Option<Vec<SpatialId>> {
        let state = self.core.state.borrow();
        state
            .segment(cell)
            .map(|segment| segment.items().map(|spatial| spatial.id()).collect())
    }

    /// Number of times an object moved or got resized to a different range of
    /// segments.
    pub fn relocations(&self) -> u64 {
        self.core.relocations.get()
    }

    /// Returns true if every tracked object is stored in exactly the segments
    /// its bounding box overlaps and no segment stores an untracked object.
    ///
    /// This does a full scan of the grid; it is meant for tests and debugging.
    pub fn is_consistent(&self) -> bool {
        let state = self.core.state.borrow();
        let segment_size = self.core.segment_size;

        for tracked in state.tracked.values() {
            let spatial = tracked.spatial.as_ref();
            let range = state.range(&spatial.bounds(), segment_size);
            for y in 0..state.grid_size.y {
                for x in 0..state.grid_size.x {
                    let cell = IVec2::new(x, y);
                    let present = state.segments[state.segment_index(cell)].contains(spatial.id());
                    if present == range.excludes(cell) {
                        return false;
                    }
                }
            }
        }

        state.segments.iter().all(|segment| {
            segment
                .items()
                .all(|spatial| state.tracked.contains_key(&spatial.id()))
        })
    }

    fn listener(&self) -> Weak<dyn SpatialListener> {
        let core: Rc<dyn SpatialListener> = self.core.clone();
        Rc::downgrade(&core)
    }
}

impl Default for GridIndex {
    fn default() -> Self {
        Self::new(DEFAULT_SEGMENT_SIZE).expect("Default segment size is valid.")
    }
}

impl fmt::Debug for GridIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.core.state.borrow();
        f.debug_struct("GridIndex")
            .field("segment_size", &self.core.segment_size)
            .field("grid_size", &state.grid_size)
            .field("tracked", &state.tracked.len())
            .finish()
    }
}

impl SpatialIndex for GridIndex {
    /// Recomputes grid dimensions. Nothing happens if the dimensions do not
    /// change, otherwise all tracked objects are redistributed.
    fn set_area_size(&self, size: Vec2) {
        let segment_size = self.core.segment_size;
        let grid_size = ((size / segment_size).floor() + Vec2::ONE)
            .max(Vec2::ZERO)
            .as_ivec2();

        let mut state = self.core.state.borrow_mut();
        if state.grid_size == grid_size {
            return;
        }

        debug!(
            "Resizing spatial grid from {} to {} segments ({} tracked objects).",
            state.grid_size,
            grid_size,
            state.tracked.len()
        );

        let spatials: Vec<SpatialRef> = state
            .tracked
            .values()
            .map(|tracked| SpatialRef::clone(&tracked.spatial))
            .collect();

        for segment in state.segments.iter_mut() {
            segment.clear();
        }
        state.grid_size = grid_size;
        let len = (grid_size.x as usize) * (grid_size.y as usize);
        state.segments.resize_with(len, Segment::new);

        for spatial in spatials {
            let range = state.range(&spatial.bounds(), segment_size);
            state.insert(&spatial, range);
        }
    }

    fn add(&self, spatial: SpatialRef) -> Result<(), IndexError> {
        let id = spatial.id();
        let mut state = self.core.state.borrow_mut();
        let already_tracked = state.tracked.contains_key(&id);
        debug_assert!(!already_tracked, "Object {id:?} is already tracked.");
        if already_tracked {
            return Ok(());
        }

        let range = state.range(&spatial.bounds(), self.core.segment_size);
        state.insert(&spatial, range);

        let subscription = spatial.body().subscribe(self.listener());
        state.tracked.insert(
            id,
            Tracked {
                spatial,
                subscription,
            },
        );
        Ok(())
    }

    /// Unsubscribes from the object and sweeps it from every segment of the
    /// grid.
    fn remove(&self, spatial: &dyn Spatial) -> Result<bool, IndexError> {
        let id = spatial.id();
        let mut state = self.core.state.borrow_mut();

        let tracked = state.tracked.remove(&id);
        if let Some(tracked) = tracked.as_ref() {
            let unsubscribed = spatial.body().unsubscribe(tracked.subscription);
            debug_assert!(unsubscribed);
        }

        let mut removed_from_any = false;
        for segment in state.segments.iter_mut() {
            removed_from_any |= segment.remove(id);
        }
        debug_assert!(tracked.is_some() || !removed_from_any);

        Ok(tracked.is_some())
    }

    fn clear(&self) {
        let mut state = self.core.state.borrow_mut();
        for (_, tracked) in state.tracked.drain() {
            tracked.spatial.body().unsubscribe(tracked.subscription);
        }
        for segment in state.segments.iter_mut() {
            segment.clear();
        }
    }

    fn len(&self) -> usize {
        self.core.state.borrow().tracked.len()
    }

    fn is_tracked(&self, spatial: &dyn Spatial) -> bool {
        let state = self.core.state.borrow();
        let id = spatial.id();
        let tracked = state.tracked.contains_key(&id);

        #[cfg(debug_assertions)]
        {
            let range = state.range(&spatial.bounds(), self.core.segment_size);
            if !range.is_empty() {
                let scanned = state.segments.iter().any(|segment| segment.contains(id));
                debug_assert_eq!(tracked, scanned, "Grid index is corrupted for {id:?}.");
            }
        }

        tracked
    }

    fn visit(
        &self,
        query: &Query<'_>,
        visitor: &mut dyn FnMut(&SpatialRef) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        let state = self.core.state.borrow();
        let segment_size = self.core.segment_size;

        let envelope = match query.region() {
            Region::Everywhere => {
                for tracked in state.tracked.values() {
                    if query.matches(tracked.spatial.as_ref()) {
                        visitor(&tracked.spatial)?;
                    }
                }
                return ControlFlow::Continue(());
            }
            Region::Point(point) => {
                // A single segment is consulted, thus there are no duplicates.
                if let Some(segment) = state.try_segment(*point, segment_size) {
                    for spatial in segment.items() {
                        if query.matches(spatial.as_ref()) {
                            visitor(spatial)?;
                        }
                    }
                }
                return ControlFlow::Continue(());
            }
            Region::Intersecting(rect) | Region::Enclosed(rect) => *rect,
        };

        let range = state.range(&envelope, segment_size);
        let start = range.start();
        for cell in range {
            for spatial in state.segments[state.segment_index(cell)].items() {
                // Segments of an object form a rectangle, thus the object is
                // reported only from the first of them within the range.
                let first = state
                    .range(&spatial.bounds(), segment_size)
                    .start()
                    .max(start);
                if first == cell && query.matches(spatial.as_ref()) {
                    visitor(spatial)?;
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// Searches rings of segments around `point`, closest first, and stops as
    /// soon as no unvisited segment can contain a closer object.
    ///
    /// Tracked objects lying entirely outside of the grid area occupy no
    /// segment and are scanned linearly afterwards.
    fn nearest(&self, point: Vec2, query: &Query<'_>) -> Option<SpatialRef> {
        let state = self.core.state.borrow();
        let segment_size = self.core.segment_size;

        let consider = |best: &mut Option<(f32, SpatialRef)>, spatial: &SpatialRef| {
            if !query.matches(spatial.as_ref()) {
                return;
            }
            let distance = spatial.bounds().distance_squared(point);
            if best.as_ref().map_or(true, |(closest, _)| distance < *closest) {
                *best = Some((distance, SpatialRef::clone(spatial)));
            }
        };

        let mut best: Option<(f32, SpatialRef)> = None;

        if !state.segments.is_empty() {
            let max_cell = state.grid_size - IVec2::ONE;
            let center = CellRange::cell(point, segment_size).clamp(IVec2::ZERO, max_cell);
            let max_radius = center.max(max_cell - center).max_element();

            for radius in 0..=max_radius {
                if let Some((distance, _)) = best.as_ref() {
                    // Any object first seen in this ring is at least this far.
                    let bound = (radius - 1).max(0) as f32 * segment_size;
                    if *distance <= bound * bound {
                        break;
                    }
                }

                for cell in ring(center, radius) {
                    let Some(segment) = state.segment(cell) else {
                        continue;
                    };
                    for spatial in segment.items() {
                        consider(&mut best, spatial);
                    }
                }
            }
        }

        for tracked in state.tracked.values() {
            if state.range(&tracked.spatial.bounds(), segment_size).is_empty() {
                consider(&mut best, &tracked.spatial);
            }
        }

        best.map(|(_, spatial)| spatial)
    }
}

/// Cells whose Chebyshev distance from `center` equals `radius`. Cells
/// outside of the grid are included.
fn ring(center: IVec2, radius: i32) -> Vec<IVec2> {
    if radius == 0 {
        return vec![center];
    }

    let min = center - IVec2::splat(radius);
    let max = center + IVec2::splat(radius);
    let mut cells = Vec::with_capacity(8 * radius as usize);
    for x in min.x..=max.x {
        cells.push(IVec2::new(x, min.y));
        cells.push(IVec2::new(x, max.y));
    }
    for y in (min.y + 1)..max.y {
        cells.push(IVec2::new(min.x, y));
        cells.push(IVec2::new(max.x, y));
    }
    cells
}

/// Part of the index shared with tracked objects (as their listener).
struct GridCore {
    segment_size: f32,
    state: RefCell<GridState>,
    relocations: Cell<u64>,
}

impl SpatialListener for GridCore {
    fn moved(&self, id: SpatialId, old_position: Vec2) {
        let mut state = self.state.borrow_mut();
        let Some(spatial) = state.spatial(id) else {
            return;
        };

        let old = Rect::from_position_size(old_position, spatial.size());
        let old_range = state.range(&old, self.segment_size);
        let new_range = state.range(&spatial.bounds(), self.segment_size);
        if state.relocate(&spatial, old_range, new_range) {
            self.relocations.set(self.relocations.get() + 1);
        }
    }

    fn resized(&self, id: SpatialId, old_size: Vec2) {
        let mut state = self.state.borrow_mut();
        let Some(spatial) = state.spatial(id) else {
            return;
        };

        // Position is unchanged, only the maximum corner might have moved to
        // a different segment.
        let old = Rect::from_position_size(spatial.position(), old_size);
        let old_range = state.range(&old, self.segment_size);
        let new_range = state.range(&spatial.bounds(), self.segment_size);
        if state.relocate(&spatial, old_range, new_range) {
            self.relocations.set(self.relocations.get() + 1);
        }
    }
}

struct GridState {
    grid_size: IVec2,
    /// Row-major segments, `grid_size.x * grid_size.y` of them.
    segments: Vec<Segment>,
    tracked: AHashMap<SpatialId, Tracked>,
}

struct Tracked {
    spatial: SpatialRef,
    subscription: Subscription,
}

impl GridState {
    fn new() -> Self {
        Self {
            grid_size: IVec2::ZERO,
            segments: Vec::new(),
            tracked: AHashMap::new(),
        }
    }

    fn range(&self, rect: &Rect, segment_size: f32) -> CellRange {
        CellRange::from_rect(rect, segment_size, self.grid_size)
    }

    fn spatial(&self, id: SpatialId) -> Option<SpatialRef> {
        self.tracked
            .get(&id)
            .map(|tracked| SpatialRef::clone(&tracked.spatial))
    }

    fn segment_index(&self, cell: IVec2) -> usize {
        debug_assert!(cell.cmpge(IVec2::ZERO).all() && cell.cmplt(self.grid_size).all());
        (cell.y as usize) * (self.grid_size.x as usize) + (cell.x as usize)
    }

    fn segment(&self, cell: IVec2) -> Option<&Segment> {
        if cell.cmplt(IVec2::ZERO).any() || cell.cmpge(self.grid_size).any() {
            None
        } else {
            Some(&self.segments[self.segment_index(cell)])
        }
    }

    /// Returns the segment containing a point, or `None` if the point lies
    /// outside of the grid.
    fn try_segment(&self, point: Vec2, segment_size: f32) -> Option<&Segment> {
        if !point.is_finite() || point.cmplt(Vec2::ZERO).any() {
            return None;
        }
        self.segment(CellRange::cell(point, segment_size))
    }

    fn insert(&mut self, spatial: &SpatialRef, range: CellRange) {
        for cell in range {
            let index = self.segment_index(cell);
            let inserted = self.segments[index].add(spatial);
            debug_assert!(inserted);
        }
    }

    /// Moves an object from one range of segments to another. Returns false
    /// if the ranges are equal and thus nothing had to be done.
    fn relocate(&mut self, spatial: &SpatialRef, old: CellRange, new: CellRange) -> bool {
        // Most of the time objects move within the same segment range.
        if old == new {
            return false;
        }

        trace!("Relocating {:?} from {:?} to {:?}.", spatial.id(), old, new);

        let intersection = old.intersection(&new);
        for cell in old {
            if intersection.excludes(cell) {
                let index = self.segment_index(cell);
                let removed = self.segments[index].remove(spatial.id());
                debug_assert!(removed);
            }
        }
        for cell in new {
            if intersection.excludes(cell) {
                let index = self.segment_index(cell);
                let inserted = self.segments[index].add(spatial);
                debug_assert!(inserted);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::LinearIndex;
    use crate::testing::{block, ids, Kinds};

    fn rect(x: f32, y: f32, width: f32, height: f32) -> Rect {
        Rect::from_position_size(Vec2::new(x, y), Vec2::new(width, height))
    }

    #[test]
    fn test_segment_size() {
        assert_eq!(
            GridIndex::new(3).unwrap_err(),
            ConfigError::SegmentTooSmall { size: 3, min: 4 }
        );
        assert_eq!(GridIndex::new(4).unwrap().segment_size(), 4.);
        assert_eq!(GridIndex::default().segment_size(), 384.);
    }

    #[test]
    fn test_grid_size() {
        let index = GridIndex::new(64).unwrap();
        assert_eq!(index.grid_size(), IVec2::ZERO);
        index.set_area_size(Vec2::new(256., 100.));
        assert_eq!(index.grid_size(), IVec2::new(5, 2));
        index.set_area_size(Vec2::new(-10., 0.));
        assert_eq!(index.grid_size(), IVec2::new(0, 1));
    }

    #[test]
    fn test_scenario() {
        let kinds = Kinds::new();
        let index = GridIndex::with_area(64, Vec2::new(256., 256.)).unwrap();
        let o1 = block(kinds.unit, Vec2::new(10., 10.), Vec2::new(20., 20.));
        index.add(o1.clone()).unwrap();

        let near = Query::intersecting(rect(0., 0., 50., 50.));
        assert_eq!(ids(index.get_many(&near)), vec![o1.id()]);

        o1.body().set_position(Vec2::new(200., 200.));
        assert!(index.get_many(&near).is_empty());
        let far = Query::intersecting(rect(190., 190., 50., 50.));
        assert_eq!(ids(index.get_many(&far)), vec![o1.id()]);
        assert!(index.is_consistent());
    }

    #[test]
    fn test_segment_coverage() {
        let kinds = Kinds::new();
        let index = GridIndex::with_area(10, Vec2::new(100., 100.)).unwrap();
        let spatial = block(kinds.unit, Vec2::new(15., 25.), Vec2::new(10., 4.));
        index.add(spatial.clone()).unwrap();

        for y in 0..11 {
            for x in 0..11 {
                let cell = IVec2::new(x, y);
                let expected = if (1..=2).contains(&x) && y == 2 {
                    vec![spatial.id()]
                } else {
                    vec![]
                };
                assert_eq!(index.segment_ids(cell).unwrap(), expected, "{cell}");

                let cell_rect = rect(x as f32 * 10., y as f32 * 10., 10., 10.);
                assert_eq!(
                    index.contains(&Query::intersecting(cell_rect)),
                    cell_rect.intersects(&spatial.bounds())
                );
            }
        }
        assert!(index.segment_ids(IVec2::new(11, 0)).is_none());
        assert!(index.segment_ids(IVec2::new(-1, 0)).is_none());
    }

    #[test]
    fn test_move() {
        let kinds = Kinds::new();
        let index = GridIndex::with_area(10, Vec2::new(100., 100.)).unwrap();
        let spatial = block(kinds.unit, Vec2::new(1., 1.), Vec2::new(2., 2.));
        index.add(spatial.clone()).unwrap();

        spatial.body().translate(Vec2::ZERO);
        spatial.body().set_position(Vec2::new(5., 5.));
        assert_eq!(index.relocations(), 0);
        assert_eq!(index.segment_ids(IVec2::ZERO).unwrap(), vec![spatial.id()]);

        spatial.body().set_position(Vec2::new(9., 5.));
        assert_eq!(index.relocations(), 1);
        assert_eq!(index.segment_ids(IVec2::ZERO).unwrap(), vec![spatial.id()]);
        assert_eq!(index.segment_ids(IVec2::new(1, 0)).unwrap(), vec![spatial.id()]);

        spatial.body().set_position(Vec2::new(55., 75.));
        assert_eq!(index.relocations(), 2);
        assert!(index.segment_ids(IVec2::ZERO).unwrap().is_empty());
        assert!(index.segment_ids(IVec2::new(1, 0)).unwrap().is_empty());
        assert_eq!(index.segment_ids(IVec2::new(5, 7)).unwrap(), vec![spatial.id()]);
        assert!(index.contains(&Query::at(Vec2::new(56., 76.))));
        assert!(!index.contains(&Query::at(Vec2::new(2., 2.))));
        assert!(index.is_consistent());
    }

    #[test]
    fn test_resize() {
        let kinds = Kinds::new();
        let index = GridIndex::with_area(10, Vec2::new(100., 100.)).unwrap();
        let spatial = block(kinds.building, Vec2::new(1., 1.), Vec2::new(2., 2.));
        index.add(spatial.clone()).unwrap();

        spatial.body().set_size(Vec2::new(8., 8.));
        assert_eq!(index.relocations(), 0);

        spatial.body().set_size(Vec2::new(25., 8.));
        assert_eq!(index.relocations(), 1);
        for x in 0..3 {
            assert_eq!(index.segment_ids(IVec2::new(x, 0)).unwrap(), vec![spatial.id()]);
        }
        assert!(index.contains(&Query::at(Vec2::new(24., 2.))));

        spatial.body().set_size(Vec2::new(1., 1.));
        assert_eq!(index.relocations(), 2);
        assert!(index.segment_ids(IVec2::new(2, 0)).unwrap().is_empty());
        assert!(!index.contains(&Query::at(Vec2::new(24., 2.))));
        assert!(index.is_consistent());
    }

    #[test]
    fn test_add_remove() {
        let kinds = Kinds::new();
        let index = GridIndex::with_area(16, Vec2::new(100., 100.)).unwrap();
        let spatial = block(kinds.unit, Vec2::new(10., 10.), Vec2::new(40., 40.));
        let other = block(kinds.unit, Vec2::new(60., 60.), Vec2::new(5., 5.));

        index.add(spatial.clone()).unwrap();
        index.add(other.clone()).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.is_tracked(spatial.as_ref()));
        assert_eq!(spatial.body().num_listeners(), 1);

        assert!(index.remove(spatial.as_ref()).unwrap());
        assert!(!index.remove(spatial.as_ref()).unwrap());
        assert_eq!(index.len(), 1);
        assert!(!index.is_tracked(spatial.as_ref()));
        assert_eq!(spatial.body().num_listeners(), 0);
        assert_eq!(ids(index.get_many(&Query::everywhere())), vec![other.id()]);
        assert!(index.get(&Query::at(Vec2::new(20., 20.))).is_none());

        // Moving a removed object must not affect the index.
        spatial.body().set_position(Vec2::new(61., 61.));
        assert_eq!(ids(index.get_many(&Query::at(Vec2::new(62., 62.)))), vec![other.id()]);
        assert!(index.is_consistent());

        index.clear();
        assert!(index.is_empty());
        assert_eq!(other.body().num_listeners(), 0);
        assert!(index.is_consistent());
    }

    #[test]
    fn test_queries() {
        let kinds = Kinds::new();
        let index = GridIndex::with_area(10, Vec2::new(100., 100.)).unwrap();
        let large = block(kinds.building, Vec2::new(5., 5.), Vec2::new(40., 40.));
        let unit = block(kinds.unit, Vec2::new(20., 20.), Vec2::new(2., 2.));
        let tank = block(kinds.tank, Vec2::new(30., 12.), Vec2::new(3., 3.));
        index
            .add_many(&[large.clone(), unit.clone(), tank.clone()])
            .unwrap();

        let area = rect(0., 0., 35., 35.);
        assert_eq!(
            ids(index.get_many(&Query::intersecting(area))),
            ids(vec![large.clone(), unit.clone(), tank.clone()])
        );
        assert_eq!(
            ids(index.get_many(&Query::enclosed(area))),
            ids(vec![unit.clone(), tank.clone()])
        );
        assert_eq!(
            ids(index.get_many(&Query::intersecting(area).of(kinds.unit))),
            ids(vec![unit.clone(), tank.clone()])
        );
        assert_eq!(
            ids(index.get_many(&Query::everywhere().of(kinds.attackable))),
            ids(vec![large.clone(), unit.clone(), tank.clone()])
        );
        assert!(index.get(&Query::everywhere().of(kinds.tree)).is_none());

        let small = |spatial: &dyn Spatial| spatial.size().x < 10.;
        assert_eq!(
            ids(index.get_many(&Query::at(Vec2::new(21., 21.)).filter(&small))),
            vec![unit.id()]
        );
        assert_eq!(
            ids(index.get_many(&Query::at(Vec2::new(21., 21.)))),
            ids(vec![large.clone(), unit.clone()])
        );
        assert!(index.contains(&Query::at(Vec2::new(45., 45.))));
        assert!(!index.contains(&Query::at(Vec2::new(45.5, 45.))));

        // Out of the grid.
        assert!(index.get(&Query::at(Vec2::new(-1., 10.))).is_none());
        assert!(index.get(&Query::at(Vec2::new(1000., 10.))).is_none());
        assert!(index
            .get_many(&Query::intersecting(rect(-50., -50., 10., 10.)))
            .is_empty());
    }

    #[test]
    fn test_nearest() {
        let kinds = Kinds::new();
        let index = GridIndex::with_area(10, Vec2::new(200., 200.)).unwrap();
        let a = block(kinds.unit, Vec2::new(10., 10.), Vec2::new(2., 2.));
        let b = block(kinds.building, Vec2::new(150., 150.), Vec2::new(20., 20.));
        let c = block(kinds.unit, Vec2::new(100., 20.), Vec2::new(1., 1.));
        index.add_many(&[a.clone(), b.clone(), c.clone()]).unwrap();

        let everywhere = Query::everywhere();
        assert_eq!(
            index.nearest(Vec2::new(0., 0.), &everywhere).unwrap().id(),
            a.id()
        );
        assert_eq!(
            index.nearest(Vec2::new(160., 160.), &everywhere).unwrap().id(),
            b.id()
        );
        assert_eq!(
            index.nearest(Vec2::new(90., 10.), &everywhere).unwrap().id(),
            c.id()
        );
        assert_eq!(
            index
                .nearest(Vec2::new(0., 0.), &Query::everywhere().of(kinds.building))
                .unwrap()
                .id(),
            b.id()
        );
        assert_eq!(
            index.nearest(Vec2::new(500., -50.), &everywhere).unwrap().id(),
            b.id()
        );
        assert!(index
            .nearest(Vec2::ZERO, &Query::everywhere().of(kinds.tree))
            .is_none());
    }

    #[test]
    fn test_nearest_outside_area() {
        let kinds = Kinds::new();
        let index = GridIndex::with_area(10, Vec2::new(100., 100.)).unwrap();
        let linear = LinearIndex::new();
        let outside = block(kinds.building, Vec2::new(200., 200.), Vec2::new(4., 4.));
        index.add(SpatialRef::clone(&outside)).unwrap();
        linear.add(SpatialRef::clone(&outside)).unwrap();

        let everywhere = Query::everywhere();
        assert!(index.contains(&everywhere));
        assert_eq!(ids(index.get_many(&everywhere)), vec![outside.id()]);
        assert_eq!(
            index.nearest(Vec2::new(50., 50.), &everywhere).map(|s| s.id()),
            Some(outside.id())
        );
        assert_eq!(
            index.nearest(Vec2::new(50., 50.), &everywhere).map(|s| s.id()),
            linear.nearest(Vec2::new(50., 50.), &everywhere).map(|s| s.id())
        );

        let inside = block(kinds.unit, Vec2::new(10., 10.), Vec2::new(2., 2.));
        index.add(SpatialRef::clone(&inside)).unwrap();
        assert_eq!(
            index.nearest(Vec2::ZERO, &everywhere).map(|s| s.id()),
            Some(inside.id())
        );
        assert_eq!(
            index.nearest(Vec2::new(190., 190.), &everywhere).map(|s| s.id()),
            Some(outside.id())
        );
        assert_eq!(
            index
                .nearest(Vec2::ZERO, &Query::everywhere().of(kinds.building))
                .map(|s| s.id()),
            Some(outside.id())
        );

        inside.body().set_position(Vec2::new(-50., 300.));
        assert_eq!(
            index.nearest(Vec2::new(-40., 290.), &everywhere).map(|s| s.id()),
            Some(inside.id())
        );
        assert!(index.is_consistent());
    }

    #[test]
    fn test_set_area_size() {
        let kinds = Kinds::new();
        let index = GridIndex::with_area(10, Vec2::new(50., 50.)).unwrap();
        let inside = block(kinds.unit, Vec2::new(12., 12.), Vec2::new(20., 3.));
        let outside = block(kinds.unit, Vec2::new(80., 80.), Vec2::new(3., 3.));
        index.add_many(&[inside.clone(), outside.clone()]).unwrap();

        let query = Query::intersecting(rect(0., 0., 100., 100.));
        assert_eq!(ids(index.get_many(&query)), vec![inside.id()]);

        index.set_area_size(Vec2::new(100., 100.));
        assert_eq!(index.grid_size(), IVec2::new(11, 11));
        assert_eq!(
            ids(index.get_many(&query)),
            ids(vec![inside.clone(), outside.clone()])
        );
        assert_eq!(
            ids(index.get_many(&Query::at(Vec2::new(13., 13.)))),
            vec![inside.id()]
        );
        assert!(index.is_consistent());

        index.set_area_size(Vec2::new(20., 20.));
        assert_eq!(ids(index.get_many(&query)), vec![inside.id()]);
        assert!(index.is_consistent());
    }
}
