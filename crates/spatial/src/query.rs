use std::fmt;

use glam::Vec2;

use crate::{category::Category, rect::Rect, spatial::Spatial};

/// Geometric constraint of a [`Query`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Region {
    /// No geometric constraint.
    Everywhere,
    /// Objects whose bounding box contains the point.
    Point(Vec2),
    /// Objects whose bounding box intersects the rectangle.
    Intersecting(Rect),
    /// Objects whose bounding box lies completely within the rectangle.
    Enclosed(Rect),
}

impl Region {
    pub fn matches(&self, bounds: &Rect) -> bool {
        match self {
            Self::Everywhere => true,
            Self::Point(point) => bounds.contains_point(*point),
            Self::Intersecting(rect) => rect.intersects(bounds),
            Self::Enclosed(rect) => rect.contains_rect(bounds),
        }
    }

    /// Returns the rectangle candidates have to intersect, or `None` if the
    /// region is unconstrained.
    pub fn envelope(&self) -> Option<Rect> {
        match self {
            Self::Everywhere => None,
            Self::Point(point) => Some(Rect::new(*point, *point)),
            Self::Intersecting(rect) | Self::Enclosed(rect) => Some(*rect),
        }
    }
}

/// Spatial query: a region, optionally narrowed down to a category and by an
/// arbitrary predicate.
///
/// # Example
///
/// ```
/// use de_spatial::{Query, Rect};
/// use glam::Vec2;
///
/// let area = Rect::new(Vec2::ZERO, Vec2::splat(50.));
/// let large = |spatial: &dyn de_spatial::Spatial| spatial.size().x > 10.;
/// let query = Query::intersecting(area).filter(&large);
/// ```
#[derive(Clone, Copy)]
pub struct Query<'a> {
    region: Region,
    category: Option<Category>,
    predicate: Option<&'a dyn Fn(&dyn Spatial) -> bool>,
}

impl<'a> Query<'a> {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            category: None,
            predicate: None,
        }
    }

    pub fn everywhere() -> Self {
        Self::new(Region::Everywhere)
    }

    pub fn at(point: Vec2) -> Self {
        Self::new(Region::Point(point))
    }

    pub fn intersecting(rect: Rect) -> Self {
        Self::new(Region::Intersecting(rect))
    }

    pub fn enclosed(rect: Rect) -> Self {
        Self::new(Region::Enclosed(rect))
    }

    /// Restricts the query to objects of the category (or its descendants).
    pub fn of(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn filter(mut self, predicate: &'a dyn Fn(&dyn Spatial) -> bool) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    /// Exact test of an object against all constraints of the query.
    pub fn matches(&self, spatial: &dyn Spatial) -> bool {
        if let Some(category) = self.category {
            if !spatial.category().is_a(category) {
                return false;
            }
        }
        self.region.matches(&spatial.bounds()) && self.predicate.map_or(true, |p| p(spatial))
    }
}

impl<'a> fmt::Debug for Query<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Query")
            .field("region", &self.region)
            .field("category", &self.category)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}
