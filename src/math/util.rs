use super::{Point2d, Vector2d};
use cgmath::prelude::*;

/// Wraps an angle in degrees into the range `[0, 360)`.
pub fn to360(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // `rem_euclid` can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Converts a signed heading in `[-180, 180]` into the range `[0, 360)`.
pub fn heading360(heading: f64) -> f64 {
    if heading >= 0.0 {
        to360(heading)
    } else {
        to360(360.0 + heading)
    }
}

/// The bearing of a vector in degrees, in the range `[0, 360)`.
///
/// A zero vector has a bearing of zero.
pub fn vector_bearing(vec: Vector2d) -> f64 {
    to360(vec.y.atan2(vec.x).to_degrees())
}

/// The bearing from `from` to `to` in degrees, in the range `[0, 360)`.
pub fn bearing(from: Point2d, to: Point2d) -> f64 {
    vector_bearing(to - from)
}

/// The signed change in bearing needed to turn from `from` to `to`,
/// in the range `(-180, 180]`. Positive values are anticlockwise.
pub fn angle_delta(from: f64, to: f64) -> f64 {
    let delta = to360(to - from);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// The unsigned angle between two bearings, in the range `[0, 180]`.
pub fn angle_between(a: f64, b: f64) -> f64 {
    angle_delta(a, b).abs()
}

/// Returns true if the two points coincide.
pub fn coincident(a: Point2d, b: Point2d) -> bool {
    (b - a).magnitude2() == 0.0
}
