//! The topology of a closed-loop track.

pub use segment::Segment;
pub use waypoint::Waypoint;

use crate::error::TrackError;
use crate::math::{angle_between, bearing, coincident, LineSegment2d, Point2d};
use crate::util::{rotated_range, rotated_range_rev};
use crate::{SegmentId, SegmentSet};
use cgmath::prelude::*;
use itertools::Itertools;
use smallvec::SmallVec;

mod segment;
mod waypoint;

/// Consecutive waypoint pairs whose bearings differ by less than this
/// many degrees are merged into the same segment.
pub const DEFAULT_COLLINEAR_THRESHOLD: f64 = 5.0; // deg

/// The waypoint ring and segment ring of a track.
///
/// A topology is built once per session from the track's waypoint list
/// and is never modified afterwards.
#[derive(Clone, Debug)]
pub struct Topology {
    /// The waypoints, indexed by their waypoint index.
    waypoints: Vec<Waypoint>,
    /// The segments.
    segments: SegmentSet,
    /// The segment IDs in ring order, starting with the segment owning waypoint 0.
    order: Vec<SegmentId>,
    /// Maps each waypoint index to the segment that owns it.
    owners: Vec<SegmentId>,
    /// The width of the track.
    track_width: f64,
    /// The length of the centre line.
    length: f64,
}

/// A segment which is still being extended.
struct SegmentRun {
    start: u32,
    end: u32,
    members: SmallVec<[u32; 8]>,
}

impl SegmentRun {
    fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end,
            members: smallvec::smallvec![start],
        }
    }

    /// The bearing of the run's chord, or `None` if it has no length yet.
    fn angle(&self, waypoints: &[Waypoint]) -> Option<f64> {
        let (a, b) = (
            waypoints[self.start as usize].pos,
            waypoints[self.end as usize].pos,
        );
        (!coincident(a, b)).then(|| bearing(a, b))
    }

    /// Appends the pair starting at `from` and ending at `to`.
    fn extend(&mut self, from: u32, to: u32) {
        self.members.push(from);
        self.end = to;
    }
}

impl Topology {
    /// Builds a topology from an ordered list of centre line points,
    /// with the default collinearity threshold.
    pub fn build(points: &[[f64; 2]], track_width: f64) -> Result<Self, TrackError> {
        Self::with_threshold(points, track_width, DEFAULT_COLLINEAR_THRESHOLD)
    }

    /// Builds a topology from an ordered list of centre line points.
    ///
    /// # Parameters
    /// * `points` - The centre line points, in driving order. The ring is closed
    ///   automatically, so the last point should not repeat the first (though it may).
    /// * `track_width` - The width of the track.
    /// * `threshold` - The collinearity threshold in degrees.
    pub fn with_threshold(
        points: &[[f64; 2]],
        track_width: f64,
        threshold: f64,
    ) -> Result<Self, TrackError> {
        if !(track_width.is_finite() && track_width > 0.0) {
            return Err(TrackError::InvalidTrackWidth(track_width));
        }
        if let Some(index) = points
            .iter()
            .position(|p| !(p[0].is_finite() && p[1].is_finite()))
        {
            return Err(TrackError::NonFinitePoint { index });
        }
        match points.first() {
            None => return Err(TrackError::TooFewPoints(0)),
            Some(first) if points.iter().all(|p| p == first) => {
                return Err(TrackError::TooFewPoints(1))
            }
            _ => {}
        }

        let waypoints = Self::create_waypoints(points);
        let runs = Self::create_runs(&waypoints, threshold);
        if runs.is_empty() {
            return Err(TrackError::NoSegments);
        }

        let mut segments = SegmentSet::with_capacity_and_key(runs.len());
        let order = runs
            .into_iter()
            .map(|run| {
                let line = LineSegment2d::from_ends(
                    waypoints[run.start as usize].pos,
                    waypoints[run.end as usize].pos,
                );
                segments.insert_with_key(|id| Segment {
                    id,
                    start: run.start,
                    end: run.end,
                    line,
                    members: run.members,
                    prev: id,
                    next: id,
                })
            })
            .collect::<Vec<_>>();

        // Close the segment ring
        for (&prev, &next) in order.iter().circular_tuple_windows() {
            segments[prev].next = next;
            segments[next].prev = prev;
        }

        let mut owners = vec![order[0]; waypoints.len()];
        for segment in segments.values() {
            for &index in &segment.members {
                owners[index as usize] = segment.id;
            }
        }

        let length: f64 = waypoints
            .iter()
            .circular_tuple_windows()
            .map(|(a, b)| a.pos.distance(b.pos))
            .sum();

        log::info!(
            "Built track topology: {} waypoints, {} segments, length {:.2}",
            waypoints.len(),
            order.len(),
            length
        );

        Ok(Self {
            waypoints,
            segments,
            order,
            owners,
            track_width,
            length,
        })
    }

    /// Creates the waypoint ring.
    fn create_waypoints(points: &[[f64; 2]]) -> Vec<Waypoint> {
        let count = points.len() as u32;
        points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let index = i as u32;
                Waypoint {
                    index,
                    pos: Point2d::new(p[0], p[1]),
                    prev: if index == 0 { count - 1 } else { index - 1 },
                    next: if index + 1 == count { 0 } else { index + 1 },
                }
            })
            .collect()
    }

    /// Partitions the waypoint pairs of the ring into runs of collinear pairs.
    fn create_runs(waypoints: &[Waypoint], threshold: f64) -> Vec<SegmentRun> {
        let mut runs: Vec<SegmentRun> = vec![];

        for (a, b) in waypoints.iter().circular_tuple_windows() {
            let extends = match runs.last() {
                None => false,
                // Zero length pairs have no direction and never break a run
                Some(_) if coincident(a.pos, b.pos) => true,
                Some(run) => match run.angle(waypoints) {
                    Some(angle) => angle_between(angle, bearing(a.pos, b.pos)) < threshold,
                    None => true,
                },
            };
            match runs.last_mut() {
                Some(run) if extends => run.extend(a.index, b.index),
                _ => runs.push(SegmentRun::new(a.index, b.index)),
            }
        }

        // Merge the runs either side of the seam if they are collinear
        if runs.len() > 2 {
            let last = &runs[runs.len() - 1];
            let collinear = match (last.angle(waypoints), runs[0].angle(waypoints)) {
                (Some(a), Some(b)) => angle_between(a, b) < threshold,
                _ => false,
            };
            if collinear {
                if let Some(last) = runs.pop() {
                    let first = &mut runs[0];
                    first.start = last.start;
                    first.members.insert_many(0, last.members);
                }
            }
        }

        runs
    }

    /// The number of waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Returns true if the topology has no waypoints. Never true for a built topology.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// The width of the track.
    pub fn track_width(&self) -> f64 {
        self.track_width
    }

    /// The length of the track's centre line.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Gets all the waypoints, ordered by index.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Gets the waypoint with the given index.
    pub fn waypoint(&self, index: u32) -> Result<&Waypoint, TrackError> {
        self.waypoints
            .get(index as usize)
            .ok_or(TrackError::WaypointNotFound(index))
    }

    /// Gets the waypoint following the given one.
    pub fn next_waypoint(&self, waypoint: &Waypoint) -> &Waypoint {
        &self.waypoints[waypoint.next as usize]
    }

    /// Gets the waypoint preceding the given one.
    pub fn prev_waypoint(&self, waypoint: &Waypoint) -> &Waypoint {
        &self.waypoints[waypoint.prev as usize]
    }

    /// Iterates over one lap of waypoints, forwards, starting from `start`.
    pub fn walk_forward(
        &self,
        start: &Waypoint,
    ) -> impl ExactSizeIterator<Item = &Waypoint> + Clone + '_ {
        rotated_range(self.len(), start.index as usize).map(|idx| &self.waypoints[idx])
    }

    /// Iterates over one lap of waypoints, backwards, starting from `start`.
    pub fn walk_backward(
        &self,
        start: &Waypoint,
    ) -> impl ExactSizeIterator<Item = &Waypoint> + Clone + '_ {
        rotated_range_rev(self.len(), start.index as usize).map(|idx| &self.waypoints[idx])
    }

    /// The number of segments.
    pub fn segment_count(&self) -> usize {
        self.order.len()
    }

    /// Iterates over the segments in ring order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.order.iter().map(|id| &self.segments[*id])
    }

    /// Gets the segment with the given ID.
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id)
    }

    /// Gets the segment following the given one.
    pub fn next_segment(&self, segment: &Segment) -> &Segment {
        &self.segments[segment.next]
    }

    /// Gets the segment preceding the given one.
    pub fn prev_segment(&self, segment: &Segment) -> &Segment {
        &self.segments[segment.prev]
    }

    /// Finds the segment which owns the waypoint with the given index.
    ///
    /// An unknown index means the telemetry and the topology disagree,
    /// which is reported rather than defaulted.
    pub fn closest_segment(&self, index: u32) -> Result<&Segment, TrackError> {
        self.owners
            .get(index as usize)
            .and_then(|id| self.segments.get(*id))
            .ok_or(TrackError::SegmentNotFound(index))
    }

    /// Returns true if this topology was built from the given points.
    pub fn matches(&self, points: &[[f64; 2]]) -> bool {
        points.len() == self.waypoints.len()
            && points
                .iter()
                .zip(&self.waypoints)
                .all(|(p, wp)| p[0] == wp.pos.x && p[1] == wp.pos.y)
    }
}
