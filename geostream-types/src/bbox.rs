use geo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A 2D axis-aligned bounding box.
///
/// Represents a rectangular area defined by minimum and maximum coordinates.
/// This is a wrapper around `geo::Rect` with the box algebra the spatial index
/// needs (union, area, enlargement, intersection).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2D {
    /// The underlying geometric rectangle
    pub rect: Rect,
}

impl BoundingBox2D {
    /// Create a new bounding box from minimum and maximum coordinates.
    ///
    /// # Arguments
    ///
    /// * `min_x` - Minimum x coordinate
    /// * `min_y` - Minimum y coordinate
    /// * `max_x` - Maximum x coordinate
    /// * `max_y` - Maximum y coordinate
    ///
    /// # Examples
    ///
    /// ```
    /// use geostream_types::bbox::BoundingBox2D;
    ///
    /// let bbox = BoundingBox2D::new(0.0, 0.0, 10.0, 5.0);
    /// assert_eq!(bbox.area(), 50.0);
    /// ```
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            rect: Rect::new(
                geo::coord! { x: min_x, y: min_y },
                geo::coord! { x: max_x, y: max_y },
            ),
        }
    }

    /// Degenerate box covering a single point.
    pub fn from_point(point: &Point) -> Self {
        Self::new(point.x(), point.y(), point.x(), point.y())
    }

    /// The square `[x - radius, x + radius] × [y - radius, y + radius]`.
    ///
    /// Returns `None` for a negative or NaN radius, which selects nothing.
    ///
    /// ```
    /// use geostream_types::bbox::BoundingBox2D;
    /// use geo::Point;
    ///
    /// let query = BoundingBox2D::around(0.0, 0.0, 10.0).unwrap();
    /// assert!(query.contains_point(&Point::new(10.0, -10.0)));
    /// assert!(!query.contains_point(&Point::new(10.5, 0.0)));
    /// assert!(BoundingBox2D::around(0.0, 0.0, -1.0).is_none());
    /// ```
    pub fn around(x: f64, y: f64, radius: f64) -> Option<Self> {
        // `Rect::new` reorders its corners, so a negative radius would
        // silently behave like its absolute value.
        if radius.is_nan() || radius < 0.0 {
            return None;
        }
        Some(Self::new(x - radius, y - radius, x + radius, y + radius))
    }

    /// Smallest box enclosing every point of the iterator, `None` when empty.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        points
            .into_iter()
            .fold(None, |acc: Option<Self>, p| match acc {
                Some(bbox) => Some(bbox.union_point(p)),
                None => Some(Self::from_point(p)),
            })
    }

    /// Get the minimum x coordinate.
    pub fn min_x(&self) -> f64 {
        self.rect.min().x
    }

    /// Get the minimum y coordinate.
    pub fn min_y(&self) -> f64 {
        self.rect.min().y
    }

    /// Get the maximum x coordinate.
    pub fn max_x(&self) -> f64 {
        self.rect.max().x
    }

    /// Get the maximum y coordinate.
    pub fn max_y(&self) -> f64 {
        self.rect.max().y
    }

    /// Get the width of the bounding box.
    pub fn width(&self) -> f64 {
        self.max_x() - self.min_x()
    }

    /// Get the height of the bounding box.
    pub fn height(&self) -> f64 {
        self.max_y() - self.min_y()
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Check if a point is contained within this bounding box (edges inclusive).
    pub fn contains_point(&self, point: &Point) -> bool {
        point.x() >= self.min_x()
            && point.x() <= self.max_x()
            && point.y() >= self.min_y()
            && point.y() <= self.max_y()
    }

    /// Check if this bounding box intersects with another.
    pub fn intersects(&self, other: &BoundingBox2D) -> bool {
        !(self.max_x() < other.min_x()
            || self.min_x() > other.max_x()
            || self.max_y() < other.min_y()
            || self.min_y() > other.max_y())
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox2D) -> Self {
        Self::new(
            self.min_x().min(other.min_x()),
            self.min_y().min(other.min_y()),
            self.max_x().max(other.max_x()),
            self.max_y().max(other.max_y()),
        )
    }

    /// Smallest box containing both `self` and `point`.
    pub fn union_point(&self, point: &Point) -> Self {
        self.union(&Self::from_point(point))
    }

    /// Area that would be added by growing this box to cover `point`.
    pub fn enlargement(&self, point: &Point) -> f64 {
        self.union_point(point).area() - self.area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox2d_creation() {
        let bbox = BoundingBox2D::new(-74.0, 40.7, -73.9, 40.8);
        assert_eq!(bbox.min_x(), -74.0);
        assert_eq!(bbox.min_y(), 40.7);
        assert_eq!(bbox.max_x(), -73.9);
        assert_eq!(bbox.max_y(), 40.8);
    }

    #[test]
    fn test_bbox2d_dimensions() {
        let bbox = BoundingBox2D::new(0.0, 0.0, 10.0, 5.0);
        assert_eq!(bbox.width(), 10.0);
        assert_eq!(bbox.height(), 5.0);
        assert_eq!(bbox.area(), 50.0);
    }

    #[test]
    fn test_around_square() {
        let bbox = BoundingBox2D::around(1.0, -2.0, 3.0).unwrap();
        assert_eq!(bbox, BoundingBox2D::new(-2.0, -5.0, 4.0, 1.0));

        let point = BoundingBox2D::around(1.0, -2.0, 0.0).unwrap();
        assert_eq!(point.area(), 0.0);
        assert!(point.contains_point(&Point::new(1.0, -2.0)));
    }

    #[test]
    fn test_around_rejects_negative_and_nan_radius() {
        assert!(BoundingBox2D::around(0.0, 0.0, -5.0).is_none());
        assert!(BoundingBox2D::around(0.0, 0.0, f64::NAN).is_none());
        assert!(BoundingBox2D::around(0.0, 0.0, -0.0).is_some());
    }

    #[test]
    fn test_bbox2d_contains_edges() {
        let bbox = BoundingBox2D::new(0.0, 0.0, 10.0, 10.0);
        assert!(bbox.contains_point(&Point::new(0.0, 10.0)));
        assert!(bbox.contains_point(&Point::new(5.0, 5.0)));
        assert!(!bbox.contains_point(&Point::new(10.1, 5.0)));
    }

    #[test]
    fn test_bbox2d_intersects() {
        let a = BoundingBox2D::new(0.0, 0.0, 10.0, 10.0);
        let touching = BoundingBox2D::new(10.0, 10.0, 20.0, 20.0);
        let apart = BoundingBox2D::new(11.0, 0.0, 20.0, 10.0);
        assert!(a.intersects(&touching));
        assert!(!a.intersects(&apart));
    }

    #[test]
    fn test_union_and_enlargement() {
        let bbox = BoundingBox2D::new(0.0, 0.0, 2.0, 2.0);
        assert_eq!(bbox.enlargement(&Point::new(1.0, 1.0)), 0.0);
        assert_eq!(bbox.enlargement(&Point::new(4.0, 2.0)), 4.0);

        let merged = bbox.union(&BoundingBox2D::new(-1.0, 1.0, 1.0, 5.0));
        assert_eq!(merged, BoundingBox2D::new(-1.0, 0.0, 2.0, 5.0));
    }

    #[test]
    fn test_from_points() {
        let points = [Point::new(3.0, 1.0), Point::new(-1.0, 4.0)];
        let bbox = BoundingBox2D::from_points(points.iter()).unwrap();
        assert_eq!(bbox, BoundingBox2D::new(-1.0, 1.0, 3.0, 4.0));
        assert!(BoundingBox2D::from_points(std::iter::empty::<&Point>()).is_none());
    }
}
