use de_spatial::{GridIndex, LinearIndex, Query, Rect, Spatial, SpatialIndex, SpatialRef};
use de_test_utils::{Operation, TestBox, Workload};
use glam::Vec2;
use ntest::timeout;

use crate::common::{object, sorted_ids, World};

mod common;

const AREA: Vec2 = Vec2::new(1000., 800.);
const SEGMENT_SIZE: u32 = 64;

fn rect(test_box: TestBox) -> Rect {
    Rect::from_position_size(test_box.position, test_box.size)
}

/// The grid ignores everything outside of the area covered by its segments.
/// Returns true if `spatial` overlaps `envelope` within that area.
fn covered(grid: &GridIndex, envelope: Option<Rect>, spatial: &SpatialRef) -> bool {
    let coverage = Rect::new(Vec2::ZERO, grid.grid_size().as_vec2() * grid.segment_size());
    let bounds = spatial.bounds();
    let mut min = bounds.min().max(coverage.min());
    let mut max = bounds.max().min(coverage.max());
    if let Some(envelope) = envelope {
        min = min.max(envelope.min());
        max = max.min(envelope.max());
    }
    min.cmple(max).all()
}

fn assert_same(grid: &GridIndex, linear: &LinearIndex, query: &Query) {
    let mut expected = linear.get_many(query);
    // Unconstrained queries are answered from the set of tracked objects.
    if let Some(envelope) = query.region().envelope() {
        expected.retain(|spatial| covered(grid, Some(envelope), spatial));
    }

    let actual = grid.get_many(query);
    let mut unique = sorted_ids(&actual);
    unique.dedup();
    assert_eq!(actual.len(), unique.len(), "duplicates in {query:?}");
    assert_eq!(sorted_ids(&actual), sorted_ids(&expected), "{query:?}");
    assert_eq!(grid.contains(query), !expected.is_empty(), "{query:?}");
}

fn assert_same_nearest(grid: &GridIndex, linear: &LinearIndex, point: Vec2, query: &Query) {
    let distance = |spatial: SpatialRef| spatial.bounds().distance_squared(point);
    let expected = linear.nearest(point, query).map(distance);
    let actual = grid.nearest(point, query).map(distance);
    assert_eq!(actual, expected, "nearest to {point} of {query:?}");
}

fn large(spatial: &dyn Spatial) -> bool {
    spatial.size().x > 10.
}

#[test]
#[timeout(60000)]
fn test_grid_matches_linear() {
    let world = World::new();
    let categories = [world.unit, world.building, world.tree];
    let workload = Workload::generate(17, 150, 3000, AREA);

    let objects: Vec<SpatialRef> = workload
        .initial
        .iter()
        .enumerate()
        .map(|(i, test_box)| {
            object(
                categories[i % categories.len()],
                test_box.position,
                test_box.size,
            )
        })
        .collect();

    let grid = GridIndex::with_area(SEGMENT_SIZE, AREA).unwrap();
    let linear = LinearIndex::new();
    grid.add_many(&objects[..100]).unwrap();
    linear.add_many(&objects[..100]).unwrap();

    for (i, operation) in workload.operations.into_iter().enumerate() {
        match operation {
            Operation::Add(slot) => {
                let spatial = &objects[slot];
                if !linear.is_tracked(spatial.as_ref()) {
                    grid.add(SpatialRef::clone(spatial)).unwrap();
                    linear.add(SpatialRef::clone(spatial)).unwrap();
                }
            }
            Operation::Remove(slot) => {
                let spatial = objects[slot].as_ref();
                assert_eq!(
                    grid.remove(spatial).unwrap(),
                    linear.remove(spatial).unwrap()
                );
            }
            Operation::Move { slot, position } => {
                objects[slot].body().set_position(position);
            }
            Operation::Resize { slot, size } => {
                objects[slot].body().set_size(size);
            }
            Operation::Intersecting(test_box) => {
                let mut query = Query::intersecting(rect(test_box));
                if i % 2 == 0 {
                    query = query.of(categories[i % categories.len()]);
                }
                assert_same(&grid, &linear, &query);
            }
            Operation::Enclosed(test_box) => {
                let query = Query::enclosed(rect(test_box)).filter(&large);
                assert_same(&grid, &linear, &query);
            }
            Operation::At(point) => {
                let category = categories[i % categories.len()];
                let queries = [
                    Query::at(point),
                    Query::at(point).of(category),
                    Query::at(point).filter(&large),
                    Query::at(point).of(category).filter(&large),
                ];
                for query in &queries {
                    assert_same(&grid, &linear, query);
                }
                assert_same_nearest(&grid, &linear, point, &Query::everywhere());
                assert_same_nearest(&grid, &linear, point, &Query::everywhere().of(category));
            }
        }

        let category = categories[(i / 2) % categories.len()];
        let query = match i % 4 {
            0 => Query::everywhere(),
            1 => Query::everywhere().of(category),
            2 => Query::everywhere().filter(&large),
            _ => Query::everywhere().of(category).filter(&large),
        };
        assert_same(&grid, &linear, &query);
        assert_eq!(grid.len(), linear.len());
    }

    assert_same(&grid, &linear, &Query::everywhere());
    assert!(grid.is_consistent());
    assert!(grid.relocations() > 0);
}
