//! Reward configuration.

use crate::compose::Composition;
use crate::curve::{CurvatureWeights, CurveDetector};
use crate::error::ConfigError;
use crate::reward::MIN_REWARD;
use crate::target::TargetProjector;
use crate::track::DEFAULT_COLLINEAR_THRESHOLD;
use crate::util::Interval;
use serde::{Deserialize, Serialize};

/// The tunable parameters of a [RewardEngine](crate::RewardEngine).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// The floor reward.
    pub min_reward: f64,
    /// The speed range of the vehicle in m/s.
    pub speed: Interval<f64>,
    /// The maximum absolute steering angle of the vehicle in degrees.
    pub max_steering: f64,
    /// Waypoint pairs within this many degrees of a segment's bearing join it.
    pub collinear_angle_threshold: f64,
    /// Curvatures above this many degrees are curves.
    pub curve_angle_threshold: f64,
    /// Curvatures below this many degrees are straights.
    pub straight_angle_threshold: f64,
    /// The length of the curvature walks as a multiple of the track width.
    pub lookahead_track_width_factor: f64,
    /// The number of waypoints past the next one used for the target direction.
    pub target_lookahead: usize,
    /// Heading errors of this many degrees or more earn the floor reward.
    pub max_heading_error: f64,
    /// Heading errors up to this many degrees earn the full reward.
    pub heading_tolerance: f64,
    /// How curvature scales the steering and speed targets.
    pub curvature: CurvatureWeights,
    /// How the sub-rewards are combined.
    pub composition: Composition,
    /// Simulation frames per second, for samples that carry no timestamp.
    pub fps: f64,
    /// Check that every sub-reward lies within its bounds before emitting a record.
    pub validate_records: bool,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            min_reward: MIN_REWARD,
            speed: Interval::new(1.5, 4.0),
            max_steering: 30.0,
            collinear_angle_threshold: DEFAULT_COLLINEAR_THRESHOLD,
            curve_angle_threshold: 60.0,
            straight_angle_threshold: 30.0,
            lookahead_track_width_factor: 1.5,
            target_lookahead: 0,
            max_heading_error: 30.0,
            heading_tolerance: 0.0,
            curvature: CurvatureWeights::default(),
            composition: Composition::default(),
            fps: 15.0,
            validate_records: false,
        }
    }
}

/// A range of an action in a model's action space.
#[derive(Clone, Copy, Debug, Deserialize)]
struct ActionRange {
    low: f64,
    high: f64,
}

/// A single action of a discrete action space.
#[derive(Clone, Copy, Debug, Deserialize)]
struct Action {
    speed: f64,
    steering_angle: f64,
}

/// The action space of a trained model.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum ActionSpace {
    Continuous {
        speed: ActionRange,
        steering_angle: ActionRange,
    },
    Discrete(Vec<Action>),
}

/// The part of a model metadata document describing its actions.
#[derive(Clone, Debug, Deserialize)]
struct ModelMetadata {
    action_space: ActionSpace,
}

impl RewardConfig {
    /// Parses a configuration from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Takes the speed range and maximum steering angle from a model metadata document.
    pub fn with_model_metadata(mut self, json: &str) -> Result<Self, ConfigError> {
        let metadata: ModelMetadata = serde_json::from_str(json)?;
        match metadata.action_space {
            ActionSpace::Continuous {
                speed,
                steering_angle,
            } => {
                if speed.low > speed.high {
                    return Err(ConfigError::MinExceedsMax {
                        field: "action_space.speed",
                        min: speed.low,
                        max: speed.high,
                    });
                }
                self.speed = Interval::new(speed.low, speed.high);
                self.max_steering = steering_angle.low.abs().max(steering_angle.high.abs());
            }
            ActionSpace::Discrete(actions) => {
                if actions.is_empty() {
                    return Err(ConfigError::EmptyActionSpace);
                }
                let speeds = actions.iter().map(|a| a.speed);
                self.speed = Interval::new(
                    speeds.clone().fold(f64::INFINITY, f64::min),
                    speeds.fold(f64::NEG_INFINITY, f64::max),
                );
                self.max_steering = actions
                    .iter()
                    .map(|a| a.steering_angle.abs())
                    .fold(0.0, f64::max);
            }
        }
        log::info!(
            "Using model action space: speed {:?}, max steering {}",
            self.speed,
            self.max_steering
        );
        self.validate()?;
        Ok(self)
    }

    /// Checks that the configuration is self-consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("min_reward", self.min_reward, 0.0, 1.0)?;
        check_positive("speed.max", self.speed.max)?;
        check_range("speed.min", self.speed.min, 0.0, f64::INFINITY)?;
        if !self.speed.is_ordered() {
            return Err(ConfigError::MinExceedsMax {
                field: "speed",
                min: self.speed.min,
                max: self.speed.max,
            });
        }
        check_positive("max_steering", self.max_steering)?;
        check_range("collinear_angle_threshold", self.collinear_angle_threshold, 0.0, 180.0)?;
        check_range("curve_angle_threshold", self.curve_angle_threshold, 0.0, 360.0)?;
        check_range("straight_angle_threshold", self.straight_angle_threshold, 0.0, 360.0)?;
        check_positive("lookahead_track_width_factor", self.lookahead_track_width_factor)?;
        check_positive("max_heading_error", self.max_heading_error)?;
        check_range(
            "heading_tolerance",
            self.heading_tolerance,
            0.0,
            self.max_heading_error,
        )?;
        check_positive("fps", self.fps)?;
        for (field, weight) in [
            ("curvature.curve", self.curvature.curve),
            ("curvature.curve_enter", self.curvature.curve_enter),
            ("curvature.curve_exit", self.curvature.curve_exit),
        ] {
            check_range(field, weight, 0.0, f64::INFINITY)?;
        }
        let (close, far) = (
            self.curvature.approach_close_ratio,
            self.curvature.approach_far_ratio,
        );
        check_range("curvature.approach_close_ratio", close, 0.0, f64::INFINITY)?;
        check_range("curvature.approach_far_ratio", far, 0.0, f64::INFINITY)?;
        if close >= far {
            return Err(ConfigError::MinExceedsMax {
                field: "curvature.approach",
                min: close,
                max: far,
            });
        }
        self.composition.validate()
    }

    /// The curve detector described by this configuration.
    pub fn curve_detector(&self) -> CurveDetector {
        CurveDetector {
            curve_angle_threshold: self.curve_angle_threshold,
            straight_angle_threshold: self.straight_angle_threshold,
            lookahead_factor: self.lookahead_track_width_factor,
        }
    }

    /// The target projector described by this configuration.
    pub fn target_projector(&self) -> TargetProjector {
        TargetProjector::new(self.target_lookahead)
    }
}

/// Checks that `value` is finite and lies within `[min, max]`.
pub(crate) fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ConfigError> {
    if value.is_nan() || value < min || value > max || value.is_infinite() {
        Err(ConfigError::OutOfRange {
            field,
            min,
            max,
            value,
        })
    } else {
        Ok(())
    }
}

/// Checks that `value` is finite and positive.
pub(crate) fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}
