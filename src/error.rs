//! Error types.

use thiserror::Error;

/// Errors raised while building or querying a track topology.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackError {
    #[error("a track needs at least 2 distinct waypoints (got {0})")]
    TooFewPoints(usize),
    #[error("waypoint {index} has a non-finite coordinate")]
    NonFinitePoint { index: usize },
    #[error("track width must be positive and finite (got {0})")]
    InvalidTrackWidth(f64),
    #[error("waypoint list produced no segments")]
    NoSegments,
    #[error("no waypoint with index {0}")]
    WaypointNotFound(u32),
    #[error("no segment found for waypoint index {0}")]
    SegmentNotFound(u32),
}

/// Errors raised while validating a telemetry sample.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TelemetryError {
    #[error("{field} is not finite")]
    NonFinite { field: &'static str },
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("closest waypoint index {index} is out of range for a track of {count} waypoints")]
    WaypointOutOfRange { index: u32, count: usize },
    #[error("the first sample of a session must carry the track waypoints")]
    MissingWaypoints,
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} minimum {min} exceeds maximum {max}")]
    MinExceedsMax {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("action space defines no actions")]
    EmptyActionSpace,
}

/// Errors raised by a [RewardEngine](crate::RewardEngine) step.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Track(#[from] TrackError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("waypoint list differs from the one the session was started with")]
    WaypointMismatch,
}
