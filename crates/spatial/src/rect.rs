use glam::Vec2;

/// Closed axis-aligned rectangle.
///
/// Both `min` and `max` belong to the rectangle, thus two rectangles which
/// merely touch are considered intersecting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    min: Vec2,
    max: Vec2,
}

impl Rect {
    /// # Panics
    ///
    /// Panics in debug builds if `min` is greater than `max` along any axis.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        debug_assert!(min.cmple(max).all(), "Rect min {min} exceeds max {max}.");
        Self { min, max }
    }

    /// Creates a rectangle from its top-left corner and (non-negative) size.
    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position, position + size)
    }

    pub fn min(&self) -> Vec2 {
        self.min
    }

    pub fn max(&self) -> Vec2 {
        self.max
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        self.min.cmple(point).all() && self.max.cmpge(point).all()
    }

    /// Returns true if `other` lies completely within this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// Squared Euclidean distance between the point and the closest point of
    /// the rectangle. It is zero for points inside the rectangle.
    pub fn distance_squared(&self, point: Vec2) -> f32 {
        point.clamp(self.min, self.max).distance_squared(point)
    }
}
