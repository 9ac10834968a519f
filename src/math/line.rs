use super::{bearing, Point2d};
use cgmath::prelude::*;
use serde::Serialize;

/// The slope of the line through two points.
///
/// A vertical line has a slope of positive or negative infinity,
/// depending on the sign of `dy`.
fn slope_between(start: Point2d, end: Point2d) -> f64 {
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    if dx != 0.0 {
        dy / dx
    } else if dy >= 0.0 {
        f64::INFINITY
    } else {
        f64::NEG_INFINITY
    }
}

/// A straight line segment between two points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LineSegment2d {
    /// The start of the segment.
    pub start: Point2d,
    /// The end of the segment.
    pub end: Point2d,
    /// The slope `dy/dx`, infinite for vertical segments.
    pub slope: f64,
    /// The bearing from `start` to `end` in degrees, in `[0, 360)`.
    pub angle: f64,
    /// The length of the segment.
    pub length: f64,
}

impl LineSegment2d {
    /// Creates a line segment from its two ends.
    pub fn from_ends(start: Point2d, end: Point2d) -> Self {
        Self {
            start,
            end,
            slope: slope_between(start, end),
            angle: bearing(start, end),
            length: start.distance(end),
        }
    }

    /// Returns true if the segment has no length.
    pub fn is_degenerate(&self) -> bool {
        self.length == 0.0
    }
}

/// A line of the form `y = slope * x + intercept`, anchored at a reference point.
///
/// Vertical lines have an infinite slope and are described by the
/// x-coordinate of the anchor alone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearFunction {
    slope: f64,
    intercept: f64,
    anchor: Point2d,
}

impl LinearFunction {
    /// Creates the line with the given slope through `anchor`.
    pub fn through(anchor: Point2d, slope: f64) -> Self {
        let intercept = if slope.is_finite() {
            anchor.y - slope * anchor.x
        } else {
            f64::NAN
        };
        Self {
            slope,
            intercept,
            anchor,
        }
    }

    /// Creates the line passing through two points, anchored at the first.
    pub fn from_points(p1: Point2d, p2: Point2d) -> Self {
        Self::through(p1, slope_between(p1, p2))
    }

    /// The slope of the line.
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Returns true if the line is vertical.
    pub fn is_vertical(&self) -> bool {
        !self.slope.is_finite()
    }

    /// Returns true if the line is horizontal.
    pub fn is_horizontal(&self) -> bool {
        self.slope == 0.0
    }

    /// Creates the line perpendicular to this one which passes through `point`.
    pub fn perpendicular_at(&self, point: Point2d) -> Self {
        let slope = if self.is_vertical() {
            0.0
        } else if self.is_horizontal() {
            f64::INFINITY
        } else {
            -1.0 / self.slope
        };
        Self::through(point, slope)
    }

    /// Finds the point on the line closest to `point`.
    pub fn closest_point(&self, point: Point2d) -> Point2d {
        if self.is_vertical() {
            return Point2d::new(self.anchor.x, point.y);
        }
        if self.is_horizontal() {
            return Point2d::new(point.x, self.anchor.y);
        }
        let (m, c) = (self.slope, self.intercept);
        let x = (point.x + m * (point.y - c)) / (1.0 + m * m);
        Point2d::new(x, m * x + c)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn vertical_segments_have_signed_infinite_slope() {
        let up = LineSegment2d::from_ends(Point2d::new(1.0, 0.0), Point2d::new(1.0, 5.0));
        let down = LineSegment2d::from_ends(Point2d::new(1.0, 5.0), Point2d::new(1.0, 0.0));
        assert_eq!(up.slope, f64::INFINITY);
        assert_eq!(down.slope, f64::NEG_INFINITY);
        assert_approx_eq!(up.angle, 90.0);
        assert_approx_eq!(down.angle, 270.0);
        assert_approx_eq!(up.length, 5.0);
    }

    #[test]
    fn projects_onto_diagonal_line() {
        let line = LinearFunction::from_points(Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0));
        let p = line.closest_point(Point2d::new(2.0, 0.0));
        assert_approx_eq!(p.x, 1.0);
        assert_approx_eq!(p.y, 1.0);
    }

    #[test]
    fn perpendicular_of_vertical_is_horizontal() {
        let line = LinearFunction::from_points(Point2d::new(3.0, 0.0), Point2d::new(3.0, 4.0));
        let perp = line.perpendicular_at(Point2d::new(3.0, 4.0));
        assert!(perp.is_horizontal());
        let p = perp.closest_point(Point2d::new(-2.0, 1.0));
        assert_approx_eq!(p.x, -2.0);
        assert_approx_eq!(p.y, 4.0);
    }

    #[test]
    fn perpendicular_of_horizontal_is_vertical() {
        let line = LinearFunction::from_points(Point2d::new(0.0, 2.0), Point2d::new(5.0, 2.0));
        let perp = line.perpendicular_at(Point2d::new(5.0, 2.0));
        assert!(perp.is_vertical());
        let p = perp.closest_point(Point2d::new(1.0, 7.0));
        assert_approx_eq!(p.x, 5.0);
        assert_approx_eq!(p.y, 7.0);
    }

    #[test]
    fn perpendicular_of_diagonal() {
        let line = LinearFunction::from_points(Point2d::new(0.0, 0.0), Point2d::new(2.0, 2.0));
        let perp = line.perpendicular_at(Point2d::new(2.0, 2.0));
        assert_approx_eq!(perp.slope(), -1.0);
        let p = perp.closest_point(Point2d::new(0.0, 0.0));
        assert_approx_eq!(p.x, 2.0);
        assert_approx_eq!(p.y, 2.0);
    }
}
