//! Projection of the vehicle onto the forward direction of the track.

use crate::debug::{debug_line, debug_point};
use crate::error::TrackError;
use crate::math::{coincident, LineSegment2d, LinearFunction, Point2d};
use crate::track::{Topology, Waypoint};
use serde::Serialize;

/// The point the vehicle should aim for.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TargetData {
    /// The projection of the vehicle onto the perpendicular at the end of `direction`.
    pub target_point: Point2d,
    /// The line from the vehicle to the target point.
    pub target_line: LineSegment2d,
    /// The waypoint pair giving the forward direction of the track.
    pub direction: LineSegment2d,
}

impl TargetData {
    /// The bearing from the vehicle to the target point.
    ///
    /// If the vehicle is already on the target point, this is the bearing of the track.
    pub fn bearing(&self) -> f64 {
        if self.target_line.is_degenerate() {
            self.direction.angle
        } else {
            self.target_line.angle
        }
    }

    /// The distance from the vehicle to the target point.
    pub fn distance(&self) -> f64 {
        self.target_line.length
    }
}

/// Computes target points from the waypoints ahead of the vehicle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TargetProjector {
    /// The number of waypoints to look past the one ahead of the vehicle.
    pub lookahead: usize,
}

impl TargetProjector {
    /// Creates a target projector which looks `lookahead` waypoints past the next one.
    pub fn new(lookahead: usize) -> Self {
        Self { lookahead }
    }

    /// Projects the vehicle's position onto the forward direction of the track.
    ///
    /// # Parameters
    /// * `topology` - The track
    /// * `position` - The vehicle's position
    /// * `next` - The index of the waypoint ahead of the vehicle
    pub fn project(
        &self,
        topology: &Topology,
        position: Point2d,
        next: u32,
    ) -> Result<TargetData, TrackError> {
        let to = topology.waypoint(next)?;
        let (from, to) = self.direction_pair(topology, to);

        let line = LinearFunction::from_points(from.pos, to.pos);
        let target_point = line.perpendicular_at(to.pos).closest_point(position);

        let data = TargetData {
            target_point,
            target_line: LineSegment2d::from_ends(position, target_point),
            direction: LineSegment2d::from_ends(from.pos, to.pos),
        };
        debug_line("direction", from.pos, to.pos);
        debug_point("target", target_point);
        Ok(data)
    }

    /// Finds the waypoint pair `lookahead` pairs ahead of the one ending at `next`.
    ///
    /// Zero length pairs are skipped, at most once around the ring.
    fn direction_pair<'a>(
        &self,
        topology: &'a Topology,
        next: &'a Waypoint,
    ) -> (&'a Waypoint, &'a Waypoint) {
        let mut to = next;
        for _ in 0..self.lookahead {
            to = topology.next_waypoint(to);
        }
        let mut from = topology.prev_waypoint(to);
        for _ in 0..topology.len() {
            if !coincident(from.pos, to.pos) {
                break;
            }
            from = to;
            to = topology.next_waypoint(to);
        }
        (from, to)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn square() -> Topology {
        Topology::build(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]], 1.0).unwrap()
    }

    #[test]
    fn projects_onto_perpendicular_of_horizontal_edge() {
        let target = TargetProjector::default()
            .project(&square(), Point2d::new(5.0, 0.3), 1)
            .unwrap();
        assert_approx_eq!(target.target_point.x, 10.0);
        assert_approx_eq!(target.target_point.y, 0.3);
        assert_approx_eq!(target.bearing(), 0.0);
        assert_approx_eq!(target.distance(), 5.0);
    }

    #[test]
    fn projects_onto_perpendicular_of_vertical_edge() {
        let target = TargetProjector::default()
            .project(&square(), Point2d::new(9.5, 4.0), 2)
            .unwrap();
        assert_approx_eq!(target.target_point.x, 9.5);
        assert_approx_eq!(target.target_point.y, 10.0);
        assert_approx_eq!(target.bearing(), 90.0);
        assert_eq!(target.direction.slope, f64::INFINITY);
    }

    #[test]
    fn projects_onto_diagonal() {
        let topology =
            Topology::build(&[[0.0, 0.0], [4.0, 4.0], [8.0, 0.0], [4.0, -4.0]], 1.0).unwrap();
        let target = TargetProjector::default()
            .project(&topology, Point2d::new(0.0, 2.0), 1)
            .unwrap();
        // The perpendicular through (4, 4) is y = 8 - x
        assert_approx_eq!(target.target_point.x, 3.0);
        assert_approx_eq!(target.target_point.y, 5.0);
    }

    #[test]
    fn looks_past_the_next_waypoint() {
        let target = TargetProjector::new(1)
            .project(&square(), Point2d::new(5.0, 0.0), 1)
            .unwrap();
        assert_approx_eq!(target.direction.angle, 90.0);
        assert_approx_eq!(target.target_point.x, 5.0);
        assert_approx_eq!(target.target_point.y, 10.0);
    }

    #[test]
    fn vehicle_on_target_uses_track_bearing() {
        let target = TargetProjector::default()
            .project(&square(), Point2d::new(10.0, 10.0), 2)
            .unwrap();
        assert!(target.target_line.is_degenerate());
        assert_approx_eq!(target.bearing(), 90.0);
    }

    #[test]
    fn skips_duplicate_waypoints() {
        let topology = Topology::build(
            &[[0.0, 0.0], [10.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]],
            1.0,
        )
        .unwrap();
        let target = TargetProjector::default()
            .project(&topology, Point2d::new(10.0, 0.0), 2)
            .unwrap();
        assert_approx_eq!(target.direction.angle, 90.0);
    }

    #[test]
    fn unknown_waypoint_is_an_error() {
        assert_eq!(
            TargetProjector::default()
                .project(&square(), Point2d::new(0.0, 0.0), 4)
                .unwrap_err(),
            TrackError::WaypointNotFound(4)
        );
    }
}
