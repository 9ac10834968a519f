//! Detection of upcoming and past curvature along the track.

use crate::debug::debug_line;
use crate::error::TrackError;
use crate::math::{angle_delta, bearing, coincident, Point2d};
use crate::track::{Topology, Waypoint};
use cgmath::prelude::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Curvature of the track around the vehicle, classified against thresholds.
///
/// The classifications are independent of each other; any combination
/// of them may be present at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct CurveInfo {
    /// The magnitude of the bearing change over the lookahead window, in `[0, 180]`.
    pub ahead: f64,
    /// The magnitude of the bearing change over the lookbehind window, in `[0, 180]`.
    pub behind: f64,
    /// The signed bearing change ahead, positive when turning anticlockwise.
    pub ahead_turn: f64,
    /// The signed bearing change behind, positive when turning anticlockwise.
    pub behind_turn: f64,
    /// The arc length walked ahead of the vehicle.
    pub ahead_distance: f64,
    /// The arc length walked behind the vehicle.
    pub behind_distance: f64,
    /// The distance to the start of the next segment, in track widths.
    pub next_segment_ratio: f64,
    /// Set to `ahead` when a curve lies ahead.
    pub curve_enter: Option<f64>,
    /// Set to `ahead` when a straight lies ahead.
    pub straight_enter: Option<f64>,
    /// Set to `behind` when a curve lies behind.
    pub curve_exit: Option<f64>,
    /// Set to `behind` when a straight lies behind.
    pub straight_exit: Option<f64>,
    /// Set to the combined curvature when the whole window is curved.
    pub curve: Option<f64>,
    /// Set to the combined curvature when the whole window is straight.
    pub straight: Option<f64>,
}

impl CurveInfo {
    /// The combined curvature either side of the vehicle, in `[0, 360]`.
    ///
    /// Not wrapped, so a U-turn on both sides stays a curve.
    pub fn total(&self) -> f64 {
        self.ahead + self.behind
    }
}

/// The factors applied to the curvature multiplier for each classification.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurvatureWeights {
    /// Applied when the whole window is curved.
    pub curve: f64,
    /// Applied when a curve lies ahead.
    pub curve_enter: f64,
    /// Applied when a curve lies behind.
    pub curve_exit: f64,
    /// With a curve ahead, the multiplier is 0 when the next segment starts
    /// closer than this many track widths.
    pub approach_close_ratio: f64,
    /// With a curve ahead, the multiplier ramps up to its full value as the
    /// next segment's distance grows to this many track widths.
    pub approach_far_ratio: f64,
}

impl Default for CurvatureWeights {
    fn default() -> Self {
        Self {
            curve: 0.5,
            curve_enter: 0.5,
            curve_exit: 1.5,
            approach_close_ratio: 1.0,
            approach_far_ratio: 2.0,
        }
    }
}

impl CurvatureWeights {
    /// Scales the multiplier by how close the curve ahead is, in `[0, 1]`.
    ///
    /// 1 when there is no curve ahead or the next segment is at least
    /// `approach_far_ratio` track widths away, 0 when it is closer than
    /// `approach_close_ratio`, and linear in between.
    pub fn approach_factor(&self, info: &CurveInfo) -> f64 {
        let ratio = info.next_segment_ratio;
        if info.curve_enter.is_none() || ratio >= self.approach_far_ratio {
            1.0
        } else if ratio < self.approach_close_ratio {
            0.0
        } else {
            (ratio - self.approach_close_ratio)
                / (self.approach_far_ratio - self.approach_close_ratio)
        }
    }
}

/// Computes the curvature multiplier: 1 on a straight, smaller approaching a curve,
/// larger leaving one.
pub fn curvature_multiplier(info: &CurveInfo, weights: &CurvatureWeights) -> f64 {
    let mut multiplier = weights.approach_factor(info);
    if info.curve.is_some() {
        multiplier *= weights.curve;
    }
    if info.curve_enter.is_some() {
        multiplier *= weights.curve_enter;
    }
    if info.curve_exit.is_some() {
        multiplier *= weights.curve_exit;
    }
    multiplier
}

/// The result of walking along the ring away from the vehicle.
struct Walk {
    /// The bearing of the last waypoint pair walked, in the direction of travel.
    end_bearing: f64,
    /// The arc length walked.
    distance: f64,
}

/// Measures curvature by walking along the waypoint ring either side of the vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveDetector {
    /// Bearing changes above this many degrees are curves.
    pub curve_angle_threshold: f64,
    /// Bearing changes below this many degrees are straights.
    pub straight_angle_threshold: f64,
    /// The length of each walk, as a multiple of the track width.
    pub lookahead_factor: f64,
}

impl Default for CurveDetector {
    fn default() -> Self {
        Self {
            curve_angle_threshold: 60.0,
            straight_angle_threshold: 30.0,
            lookahead_factor: 1.5,
        }
    }
}

impl CurveDetector {
    /// Classifies the curvature of the track around the vehicle.
    ///
    /// # Parameters
    /// * `topology` - The track
    /// * `position` - The vehicle's position
    /// * `prev` - The index of the waypoint behind the vehicle
    /// * `next` - The index of the waypoint ahead of the vehicle
    /// * `track_width` - The track width, which scales the walk length
    pub fn detect(
        &self,
        topology: &Topology,
        position: Point2d,
        prev: u32,
        next: u32,
        track_width: f64,
    ) -> Result<CurveInfo, TrackError> {
        let prev_wp = topology.waypoint(prev)?;
        let next_wp = topology.waypoint(next)?;
        let segment = topology.closest_segment(prev)?;
        let next_segment = topology.next_segment(segment);
        let next_segment_start = topology.waypoint(next_segment.start_index())?;

        let direction = if coincident(prev_wp.pos, next_wp.pos) {
            segment.angle()
        } else {
            bearing(prev_wp.pos, next_wp.pos)
        };
        let limit = track_width * self.lookahead_factor;
        let ahead = Self::walk_ahead(topology, position, next_wp, direction, limit);
        let behind = Self::walk_behind(topology, position, prev_wp, direction, limit);

        let ahead_turn = angle_delta(direction, ahead.end_bearing);
        let behind_turn = angle_delta(behind.end_bearing, direction);
        let mut info = CurveInfo {
            ahead: ahead_turn.abs(),
            behind: behind_turn.abs(),
            ahead_turn,
            behind_turn,
            ahead_distance: ahead.distance,
            behind_distance: behind.distance,
            next_segment_ratio: position.distance(next_segment_start.pos) / track_width,
            ..Default::default()
        };
        self.classify(&mut info);

        log::trace!(
            "Curvature ahead {:.1} over {:.2}, behind {:.1} over {:.2}",
            info.ahead_turn,
            info.ahead_distance,
            info.behind_turn,
            info.behind_distance
        );

        Ok(info)
    }

    /// Sets the classifications of the curve info from its curvatures.
    fn classify(&self, info: &mut CurveInfo) {
        let total = info.total();
        let is_curve = |angle: f64| angle > self.curve_angle_threshold;
        let is_straight = |angle: f64| angle < self.straight_angle_threshold;
        info.curve_enter = Some(info.ahead).filter(|a| is_curve(*a));
        info.straight_enter = Some(info.ahead).filter(|a| is_straight(*a));
        info.curve_exit = Some(info.behind).filter(|a| is_curve(*a));
        info.straight_exit = Some(info.behind).filter(|a| is_straight(*a));
        info.curve = Some(total).filter(|a| is_curve(*a));
        info.straight = Some(total).filter(|a| is_straight(*a));
    }

    /// Walks forwards from the vehicle until `limit` is reached or a full lap is walked.
    fn walk_ahead(
        topology: &Topology,
        position: Point2d,
        next: &Waypoint,
        direction: f64,
        limit: f64,
    ) -> Walk {
        let mut walk = Walk {
            end_bearing: direction,
            distance: position.distance(next.pos),
        };
        for (from, to) in topology.walk_forward(next).circular_tuple_windows() {
            if walk.distance >= limit {
                break;
            }
            walk.distance += from.pos.distance(to.pos);
            if !coincident(from.pos, to.pos) {
                walk.end_bearing = bearing(from.pos, to.pos);
            }
            debug_line("lookahead", from.pos, to.pos);
        }
        walk
    }

    /// Walks backwards from the vehicle until `limit` is reached or a full lap is walked.
    fn walk_behind(
        topology: &Topology,
        position: Point2d,
        prev: &Waypoint,
        direction: f64,
        limit: f64,
    ) -> Walk {
        let mut walk = Walk {
            end_bearing: direction,
            distance: position.distance(prev.pos),
        };
        for (from, to) in topology.walk_backward(prev).circular_tuple_windows() {
            if walk.distance >= limit {
                break;
            }
            walk.distance += from.pos.distance(to.pos);
            if !coincident(from.pos, to.pos) {
                walk.end_bearing = bearing(to.pos, from.pos);
            }
            debug_line("lookbehind", to.pos, from.pos);
        }
        walk
    }
}
