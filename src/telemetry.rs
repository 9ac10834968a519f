//! Raw and validated telemetry.

use crate::config::RewardConfig;
use crate::error::TelemetryError;
use crate::math::{heading360, Point2d};
use serde::{Deserialize, Serialize};

/// The raw telemetry of one simulation step, as supplied by the simulator.
///
/// Fields the engine does not use are ignored when deserialising.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub x: f64,
    pub y: f64,
    /// Signed heading in degrees, in `[-180, 180]`.
    pub heading: f64,
    pub speed: f64,
    pub steering_angle: f64,
    pub distance_from_center: f64,
    /// Percentage of the lap completed.
    pub progress: f64,
    pub steps: u64,
    /// The indices of the waypoints behind and ahead of the vehicle.
    pub closest_waypoints: [u32; 2],
    pub is_crashed: bool,
    pub is_offtrack: bool,
    pub is_reversed: bool,
    pub all_wheels_on_track: bool,
    pub is_left_of_center: bool,
    pub track_width: f64,
    pub track_length: f64,
    pub waypoints: Vec<[f64; 2]>,
    /// The simulation time in seconds, if known.
    pub sim_time: Option<f64>,
}

impl Params {
    /// Parses telemetry from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The failure flags of a step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Flags {
    pub crashed: bool,
    pub off_track: bool,
    pub reversed: bool,
    pub all_wheels_on_track: bool,
}

impl Flags {
    /// Returns true if the step should earn the floor reward.
    pub fn failed(&self) -> bool {
        self.crashed || self.off_track || self.reversed || !self.all_wheels_on_track
    }
}

/// A range-checked telemetry sample.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TelemetrySample {
    pub position: Point2d,
    /// Heading in degrees, in `[0, 360)`.
    pub heading: f64,
    pub speed: f64,
    pub steering_angle: f64,
    pub distance_from_center: f64,
    pub is_left_of_center: bool,
    /// Percentage of the lap completed.
    pub progress: f64,
    pub steps: u64,
    pub prev_waypoint: u32,
    pub next_waypoint: u32,
    pub flags: Flags,
    pub track_width: f64,
    /// Simulation time in seconds.
    pub sim_time: f64,
}

impl TelemetrySample {
    /// Validates raw telemetry against a track of `waypoint_count` waypoints.
    pub fn validate(
        params: &Params,
        config: &RewardConfig,
        waypoint_count: usize,
    ) -> Result<Self, TelemetryError> {
        for (field, value) in [
            ("x", params.x),
            ("y", params.y),
            ("heading", params.heading),
            ("speed", params.speed),
            ("steering_angle", params.steering_angle),
            ("distance_from_center", params.distance_from_center),
            ("progress", params.progress),
            ("track_width", params.track_width),
        ] {
            if !value.is_finite() {
                return Err(TelemetryError::NonFinite { field });
            }
        }
        check_range("heading", params.heading, -180.0, 180.0)?;
        check_range("speed", params.speed, 0.0, f64::MAX)?;
        check_range("steering_angle", params.steering_angle, -90.0, 90.0)?;
        check_range("distance_from_center", params.distance_from_center, 0.0, f64::MAX)?;
        check_range("track_width", params.track_width, f64::MIN_POSITIVE, f64::MAX)?;

        for index in params.closest_waypoints {
            if index as usize >= waypoint_count {
                return Err(TelemetryError::WaypointOutOfRange {
                    index,
                    count: waypoint_count,
                });
            }
        }

        let sim_time = match params.sim_time {
            Some(time) if time.is_finite() => time,
            Some(_) => return Err(TelemetryError::NonFinite { field: "sim_time" }),
            None => params.steps as f64 / config.fps,
        };

        let [prev_waypoint, next_waypoint] = params.closest_waypoints;
        Ok(Self {
            position: Point2d::new(params.x, params.y),
            heading: heading360(params.heading),
            speed: params.speed,
            steering_angle: params.steering_angle,
            distance_from_center: params.distance_from_center,
            is_left_of_center: params.is_left_of_center,
            progress: params.progress.max(0.0),
            steps: params.steps,
            prev_waypoint,
            next_waypoint,
            flags: Flags {
                crashed: params.is_crashed,
                off_track: params.is_offtrack,
                reversed: params.is_reversed,
                all_wheels_on_track: params.all_wheels_on_track,
            },
            track_width: params.track_width,
            sim_time,
        })
    }

    /// The fraction of the lap completed.
    pub fn progress_fraction(&self) -> f64 {
        self.progress / 100.0
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), TelemetryError> {
    if value < min || value > max {
        Err(TelemetryError::OutOfRange {
            field,
            min,
            max,
            value,
        })
    } else {
        Ok(())
    }
}
