use fastrand::Rng;
use glam::Vec2;

/// Seed used by all data generators unless a different one is requested.
pub const DEFAULT_SEED: u64 = 42;

/// An enum to allow for safe selection of the number of generated points.
#[derive(Copy, Clone, Debug)]
pub enum NumPoints {
    OneHundred,
    OneThousand,
    TenThousand,
    OneHundredThousand,
}

impl TryFrom<u32> for NumPoints {
    type Error = &'static str;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            100 => Ok(Self::OneHundred),
            1000 => Ok(Self::OneThousand),
            10_000 => Ok(Self::TenThousand),
            100_000 => Ok(Self::OneHundredThousand),
            _ => Err("Invalid number of points"),
        }
    }
}

impl From<&NumPoints> for usize {
    fn from(value: &NumPoints) -> Self {
        match value {
            NumPoints::OneHundred => 100,
            NumPoints::OneThousand => 1000,
            NumPoints::TenThousand => 10_000,
            NumPoints::OneHundredThousand => 100_000,
        }
    }
}

impl From<NumPoints> for usize {
    fn from(value: NumPoints) -> Self {
        Self::from(&value)
    }
}

/// Generate deterministic points for testing.
///
/// # Arguments
/// * `number` - the selected number of points from the [NumPoints] enum.
/// * `area` - size of the area, the returned points are between the origin
/// and `area`.
///
/// # Returns
/// A list of points. This is guaranteed to be deterministic across calls with
/// the same input.
pub fn points(number: &NumPoints, area: Vec2) -> Vec<Vec2> {
    let mut rng = Rng::with_seed(DEFAULT_SEED);
    (0..usize::from(number))
        .map(|_| random_point(&mut rng, area))
        .collect()
}

/// Axis aligned box given by its minimum corner and size.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TestBox {
    pub position: Vec2,
    pub size: Vec2,
}

impl TestBox {
    pub fn max(&self) -> Vec2 {
        self.position + self.size
    }
}

/// Generate deterministic boxes for testing.
///
/// # Arguments
/// * `number` - the selected number of boxes from the [NumPoints] enum.
/// * `area` - size of the area where minimum corners of the boxes lie.
/// * `max_size` - maximum edge length of the boxes.
pub fn boxes(number: &NumPoints, area: Vec2, max_size: f32) -> Vec<TestBox> {
    let mut rng = Rng::with_seed(DEFAULT_SEED);
    (0..usize::from(number))
        .map(|_| random_box(&mut rng, area, max_size))
        .collect()
}

/// A single step of a randomized index workload. Objects are referenced by
/// their slot in `0..num_objects`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Operation {
    /// Start tracking the object in the slot. The slot might already be
    /// tracked.
    Add(usize),
    /// Stop tracking the object in the slot. The slot might not be tracked.
    Remove(usize),
    Move { slot: usize, position: Vec2 },
    Resize { slot: usize, size: Vec2 },
    /// Query objects intersecting a box.
    Intersecting(TestBox),
    /// Query objects enclosed by a box.
    Enclosed(TestBox),
    /// Query objects containing a point.
    At(Vec2),
}

/// Random but deterministic workload over a fixed set of object slots.
pub struct Workload {
    /// Initial boxes of all object slots.
    pub initial: Vec<TestBox>,
    pub operations: Vec<Operation>,
}

impl Workload {
    /// # Arguments
    ///
    /// * `seed` - random generator seed.
    ///
    /// * `num_objects` - number of object slots.
    ///
    /// * `num_operations` - number of generated operations.
    ///
    /// * `area` - size of the world area. Some of the generated positions
    ///   and queries lie partially or entirely outside of it.
    pub fn generate(seed: u64, num_objects: usize, num_operations: usize, area: Vec2) -> Self {
        let mut rng = Rng::with_seed(seed);
        let max_size = area.min_element() / 8.;
        let initial = (0..num_objects)
            .map(|_| random_box(&mut rng, area, max_size))
            .collect();

        let operations = (0..num_operations)
            .map(|_| {
                let slot = rng.usize(0..num_objects.max(1));
                match rng.u8(0..10) {
                    0 | 1 => Operation::Add(slot),
                    2 => Operation::Remove(slot),
                    3 | 4 => Operation::Move {
                        slot,
                        position: random_point(&mut rng, area * 1.2) - area * 0.1,
                    },
                    5 => Operation::Resize {
                        slot,
                        size: random_point(&mut rng, Vec2::splat(max_size)),
                    },
                    6 | 7 => Operation::Intersecting(random_box(&mut rng, area, area.x / 2.)),
                    8 => Operation::Enclosed(random_box(&mut rng, area, area.x / 2.)),
                    _ => Operation::At(random_point(&mut rng, area)),
                }
            })
            .collect();

        Self {
            initial,
            operations,
        }
    }
}

fn random_point(rng: &mut Rng, area: Vec2) -> Vec2 {
    Vec2::new(rng.f32(), rng.f32()) * area
}

fn random_box(rng: &mut Rng, area: Vec2, max_size: f32) -> TestBox {
    TestBox {
        position: random_point(rng, area),
        size: random_point(rng, Vec2::splat(max_size)),
    }
}
