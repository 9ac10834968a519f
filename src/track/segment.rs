use crate::math::LineSegment2d;
use crate::SegmentId;
use smallvec::SmallVec;

/// A maximal run of waypoints which are collinear within the angular tolerance.
///
/// A segment owns the start waypoint of every waypoint pair it covers, so
/// its `end` waypoint is the first member of the following segment.
#[derive(Clone, Debug)]
pub struct Segment {
    /// The segment's ID.
    pub(crate) id: SegmentId,
    /// The index of the first waypoint.
    pub(crate) start: u32,
    /// The index of the last waypoint.
    pub(crate) end: u32,
    /// The chord from the first to the last waypoint.
    pub(crate) line: LineSegment2d,
    /// The indices of the member waypoints, in ring order.
    pub(crate) members: SmallVec<[u32; 8]>,
    /// The preceding segment on the ring.
    pub(crate) prev: SegmentId,
    /// The succeeding segment on the ring.
    pub(crate) next: SegmentId,
}

impl Segment {
    /// Gets the segment's ID.
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// The index of the waypoint at the start of the segment.
    pub fn start_index(&self) -> u32 {
        self.start
    }

    /// The index of the waypoint at the end of the segment.
    pub fn end_index(&self) -> u32 {
        self.end
    }

    /// The straight line from the segment's start to its end.
    pub fn line(&self) -> &LineSegment2d {
        &self.line
    }

    /// The slope of the segment, infinite if vertical.
    pub fn slope(&self) -> f64 {
        self.line.slope
    }

    /// The bearing of the segment in degrees, in `[0, 360)`.
    pub fn angle(&self) -> f64 {
        self.line.angle
    }

    /// The straight-line length of the segment.
    pub fn length(&self) -> f64 {
        self.line.length
    }

    /// The waypoint indices owned by this segment.
    pub fn members(&self) -> &[u32] {
        &self.members
    }

    /// Returns true if the waypoint with the given index belongs to this segment.
    pub fn contains(&self, index: u32) -> bool {
        self.members.contains(&index)
    }

    /// The ID of the preceding segment on the ring.
    pub fn prev_id(&self) -> SegmentId {
        self.prev
    }

    /// The ID of the succeeding segment on the ring.
    pub fn next_id(&self) -> SegmentId {
        self.next
    }
}
