use glam::{IVec2, Vec2};

use crate::rect::Rect;

/// Iterable rectangular range of grid cells.
///
/// The cells are iterated row-by-row, for example: (1, 1) -> (2, 1) -> (1, 2)
/// -> (2, 2).
#[derive(Clone, Debug)]
pub struct CellRange {
    a: IVec2,
    b: IVec2,
    x: i32,
    y: i32,
    exhausted: bool,
}

impl CellRange {
    /// Creates the minimum cell range covering a given rectangle, clipped to
    /// a grid of `grid_size` cells.
    ///
    /// Cells are assumed to be topologically closed. In other words, both
    /// touching and intersecting cells are included in the range.
    pub fn from_rect(rect: &Rect, segment_size: f32, grid_size: IVec2) -> Self {
        let start = Self::cell(rect.min(), segment_size).max(IVec2::ZERO);
        let stop = Self::cell(rect.max(), segment_size).min(grid_size - IVec2::ONE);
        Self::new(start, stop)
    }

    /// Returns coordinates of the (unclipped) cell containing a point.
    pub fn cell(point: Vec2, segment_size: f32) -> IVec2 {
        (point / segment_size).floor().as_ivec2()
    }

    /// # Arguments
    ///
    /// * `a` - inclusive range start.
    ///
    /// * `b` - inclusive range end.
    pub fn new(a: IVec2, b: IVec2) -> Self {
        Self {
            a,
            b,
            x: a.x,
            y: a.y,
            exhausted: a.cmpgt(b).any(),
        }
    }

    /// Inclusive range start. It is meaningless for empty ranges.
    pub fn start(&self) -> IVec2 {
        self.a
    }

    pub fn is_empty(&self) -> bool {
        self.a.cmpgt(self.b).any()
    }

    /// Returns true if the given cell is not contained in the range.
    pub fn excludes(&self, cell: IVec2) -> bool {
        self.a.cmpgt(cell).any() || self.b.cmplt(cell).any()
    }

    /// Returns intersecting cell range. The result might be empty.
    pub fn intersection(&self, other: &CellRange) -> CellRange {
        Self::new(self.a.max(other.a), self.b.min(other.b))
    }
}

impl PartialEq for CellRange {
    fn eq(&self, other: &Self) -> bool {
        (self.is_empty() && other.is_empty()) || (self.a == other.a && self.b == other.b)
    }
}

impl Eq for CellRange {}

impl Iterator for CellRange {
    type Item = IVec2;

    fn next(&mut self) -> Option<IVec2> {
        if self.exhausted {
            return None;
        }

        let next = Some(IVec2::new(self.x, self.y));
        if self.x == self.b.x {
            if self.y == self.b.y {
                self.exhausted = true;
            } else {
                self.x = self.a.x;
                self.y += 1;
            }
        } else {
            self.x += 1;
        }
        next
    }
}
