use crate::math::Point2d;
use serde::Serialize;

/// A single point on the track centre line.
///
/// Waypoints form a closed ring: following `next` from any waypoint
/// visits every waypoint exactly once before returning to it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Waypoint {
    /// The position of the waypoint in the input list.
    pub(crate) index: u32,
    /// The world space coordinates of the waypoint.
    pub(crate) pos: Point2d,
    /// The index of the preceding waypoint.
    pub(crate) prev: u32,
    /// The index of the succeeding waypoint.
    pub(crate) next: u32,
}

impl Waypoint {
    /// Gets the waypoint's index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The coordinates of the waypoint.
    pub fn position(&self) -> Point2d {
        self.pos
    }

    pub fn x(&self) -> f64 {
        self.pos.x
    }

    pub fn y(&self) -> f64 {
        self.pos.y
    }

    /// The index of the preceding waypoint on the ring.
    pub fn prev_index(&self) -> u32 {
        self.prev
    }

    /// The index of the succeeding waypoint on the ring.
    pub fn next_index(&self) -> u32 {
        self.next
    }
}
