use crate::compose::{Composed, RewardComposer};
use crate::config::RewardConfig;
use crate::curve::{curvature_multiplier, CurveInfo};
#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::emitter::{EventSink, NullSink, StepRecord};
use crate::error::{ConfigError, EngineError, TelemetryError, TrackError};
use crate::history::HistoricData;
use crate::reward::{
    centerline_reward, heading_error, heading_reward, speed_reward, steering_reward,
    target_speed, Reward, SubRewards,
};
use crate::target::TargetData;
use crate::telemetry::{Params, TelemetrySample};
use crate::track::Topology;
use crate::util::Interval;

/// The geometric signals a step's sub-rewards were computed from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepGeometry {
    pub curve: CurveInfo,
    pub target: TargetData,
    pub curvature_multiplier: f64,
    pub target_speed: f64,
    pub heading_error: f64,
}

/// The full breakdown of a step's reward.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    /// The final reward.
    pub reward: Reward,
    /// Absent when a failure flag cut the step short.
    pub sub_rewards: Option<SubRewards>,
    /// Absent when a failure flag cut the step short.
    pub geometry: Option<StepGeometry>,
    pub history: HistoricData,
    pub sample: TelemetrySample,
}

/// Computes a reward for each step of a simulation session.
///
/// The track topology is built from the first sample of the session, and the
/// previous sample is kept so that motion between steps can be measured.
/// A step that fails leaves the engine exactly as it was.
pub struct RewardEngine<S: EventSink = NullSink> {
    config: RewardConfig,
    /// The track, once the first sample has been seen.
    topology: Option<Topology>,
    /// The previous successfully evaluated sample.
    previous: Option<TelemetrySample>,
    /// The number of steps evaluated this session.
    step: u64,
    /// Receives a record of every step.
    sink: S,
}

impl RewardEngine<NullSink> {
    /// Creates an engine which discards its step records.
    pub fn new(config: RewardConfig) -> Result<Self, ConfigError> {
        Self::with_sink(config, NullSink)
    }
}

impl<S: EventSink> RewardEngine<S> {
    /// Creates an engine which sends its step records to `sink`.
    pub fn with_sink(config: RewardConfig, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            topology: None,
            previous: None,
            step: 0,
            sink,
        })
    }

    /// The configuration of the engine.
    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// The track topology, if it has been built.
    pub fn topology(&self) -> Option<&Topology> {
        self.topology.as_ref()
    }

    /// The previous successfully evaluated sample.
    pub fn previous(&self) -> Option<&TelemetrySample> {
        self.previous.as_ref()
    }

    /// The number of steps evaluated this session.
    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Forgets the previous sample, keeping the track topology.
    pub fn reset(&mut self) {
        self.previous = None;
        self.step = 0;
    }

    /// Computes the reward for one step.
    pub fn step(&mut self, params: &Params) -> Result<f64, EngineError> {
        self.evaluate(params).map(|outcome| outcome.reward.value())
    }

    /// Computes the reward for one step, with its full breakdown.
    pub fn evaluate(&mut self, params: &Params) -> Result<StepOutcome, EngineError> {
        let built = match &self.topology {
            Some(topology) => {
                if !params.waypoints.is_empty() && !topology.matches(&params.waypoints) {
                    return Err(EngineError::WaypointMismatch);
                }
                None
            }
            None => Some(self.build_topology(params)?),
        };
        let topology = built
            .as_ref()
            .or(self.topology.as_ref())
            .ok_or(TelemetryError::MissingWaypoints)?;

        let sample = TelemetrySample::validate(params, &self.config, topology.len())?;
        let history = HistoricData::update(&sample, self.previous.as_ref());

        let composer = RewardComposer::new(self.config.composition, self.config.min_reward);
        let mut geometry = None;
        let composed = composer.compose(&sample.flags, || {
            let step_geometry = Self::measure(&self.config, topology, &sample)?;
            geometry = Some(step_geometry);
            Ok::<_, TrackError>(Self::sub_rewards(&self.config, &sample, &step_geometry))
        })?;

        let step = self.step + 1;
        match &composed {
            Composed::Failed(_) => log::warn!(
                "Step {}: failure flags {:?}, floor reward",
                step,
                sample.flags
            ),
            Composed::Rewarded { reward, .. } => {
                log::debug!("Step {}: reward {:.5}", step, reward.value())
            }
        }

        let outcome = StepOutcome {
            reward: composed.reward(),
            sub_rewards: composed.sub_rewards().copied(),
            geometry,
            history,
            sample,
        };
        if self.config.validate_records {
            self.check_outcome(&outcome);
        }
        let record = self.record(step, &outcome);
        self.sink.emit(&record);

        if let Some(topology) = built {
            self.topology = Some(topology);
        }
        self.previous = Some(outcome.sample.clone());
        self.step = step;
        Ok(outcome)
    }

    /// Builds the track topology from the first sample of the session.
    fn build_topology(&self, params: &Params) -> Result<Topology, EngineError> {
        if params.waypoints.is_empty() {
            return Err(TelemetryError::MissingWaypoints.into());
        }
        let topology = Topology::with_threshold(
            &params.waypoints,
            params.track_width,
            self.config.collinear_angle_threshold,
        )?;
        Ok(topology)
    }

    /// Measures the track around the vehicle.
    fn measure(
        config: &RewardConfig,
        topology: &Topology,
        sample: &TelemetrySample,
    ) -> Result<StepGeometry, TrackError> {
        let curve = config.curve_detector().detect(
            topology,
            sample.position,
            sample.prev_waypoint,
            sample.next_waypoint,
            sample.track_width,
        )?;
        let target = config
            .target_projector()
            .project(topology, sample.position, sample.next_waypoint)?;
        let multiplier = curvature_multiplier(&curve, &config.curvature);
        Ok(StepGeometry {
            curve,
            target,
            curvature_multiplier: multiplier,
            target_speed: target_speed(config.speed, multiplier),
            heading_error: heading_error(&target, sample.heading),
        })
    }

    /// Computes the sub-rewards of a step.
    fn sub_rewards(
        config: &RewardConfig,
        sample: &TelemetrySample,
        geometry: &StepGeometry,
    ) -> SubRewards {
        let floor = config.min_reward;
        SubRewards {
            centerline: centerline_reward(sample.distance_from_center, sample.track_width, floor),
            heading: heading_reward(
                &geometry.target,
                sample.heading,
                config.max_heading_error,
                config.heading_tolerance,
                floor,
            ),
            steering: steering_reward(
                sample.steering_angle,
                geometry.curvature_multiplier,
                config.max_steering,
                floor,
            ),
            speed: speed_reward(sample.speed, geometry.target_speed, config.speed, floor),
        }
    }

    /// Logs any reward of the outcome outside `[floor, 1]`.
    fn check_outcome(&self, outcome: &StepOutcome) {
        let bounds = Interval::new(self.config.min_reward, 1.0);
        let in_range = |value: f64| value.is_finite() && bounds.contains(value);
        let mut values = vec![("reward", outcome.reward.value())];
        if let Some(sub_rewards) = &outcome.sub_rewards {
            let names = ["centerline", "heading", "steering", "speed"];
            values.extend(names.into_iter().zip(sub_rewards.values()));
        }
        for (name, value) in values {
            if !in_range(value) {
                log::error!("Step {}: {} reward {} is out of range", self.step + 1, name, value);
            }
        }
    }

    /// Creates the diagnostic record of a step.
    fn record(&self, step: u64, outcome: &StepOutcome) -> StepRecord {
        let geometry = outcome.geometry.as_ref();
        StepRecord {
            step,
            steps: outcome.sample.steps,
            reward: outcome.reward.value(),
            sub_rewards: outcome.sub_rewards,
            target_speed: geometry.map(|g| g.target_speed),
            curvature_multiplier: geometry.map(|g| g.curvature_multiplier),
            curve: geometry.map(|g| g.curve),
            target_point: geometry.map(|g| g.target.target_point),
            heading_error: geometry.map(|g| g.heading_error),
            history: outcome.history,
            #[cfg(feature = "debug")]
            debug: take_debug_frame(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::emitter::MemorySink;
    use assert_approx_eq::assert_approx_eq;

    fn square() -> Vec<[f64; 2]> {
        vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]
    }

    fn params(x: f64, steps: u64) -> Params {
        Params {
            x,
            y: 0.0,
            speed: 1.5,
            steps,
            closest_waypoints: [0, 1],
            all_wheels_on_track: true,
            track_width: 1.0,
            waypoints: square(),
            ..Default::default()
        }
    }

    #[test]
    fn builds_topology_on_first_step() {
        let mut engine = RewardEngine::new(RewardConfig::default()).unwrap();
        assert!(engine.topology().is_none());
        engine.step(&params(5.0, 1)).unwrap();
        assert_eq!(engine.topology().unwrap().len(), 4);
        assert_eq!(engine.step_count(), 1);
        assert!(engine.previous().is_some());
    }

    #[test]
    fn later_steps_may_omit_waypoints() {
        let mut engine = RewardEngine::new(RewardConfig::default()).unwrap();
        engine.step(&params(5.0, 1)).unwrap();
        let later = Params {
            waypoints: vec![],
            ..params(5.5, 2)
        };
        let outcome = engine.evaluate(&later).unwrap();
        assert_approx_eq!(outcome.history.distance, 0.5);
    }

    #[test]
    fn first_step_must_carry_waypoints() {
        let mut engine = RewardEngine::new(RewardConfig::default()).unwrap();
        let params = Params {
            waypoints: vec![],
            ..params(5.0, 1)
        };
        assert!(matches!(
            engine.step(&params),
            Err(EngineError::Telemetry(TelemetryError::MissingWaypoints))
        ));
        assert!(engine.topology().is_none());
    }

    #[test]
    fn rejects_a_different_track() {
        let mut engine = RewardEngine::new(RewardConfig::default()).unwrap();
        engine.step(&params(5.0, 1)).unwrap();
        let params = Params {
            waypoints: vec![[0.0, 0.0], [20.0, 0.0], [20.0, 20.0], [0.0, 20.0]],
            ..params(5.0, 2)
        };
        assert!(matches!(
            engine.step(&params),
            Err(EngineError::WaypointMismatch)
        ));
        assert_eq!(engine.step_count(), 1);
    }

    #[test]
    fn failed_step_leaves_state_untouched() {
        let mut engine = RewardEngine::new(RewardConfig::default()).unwrap();
        engine.step(&params(5.0, 1)).unwrap();
        let bad = Params {
            speed: f64::NAN,
            ..params(6.0, 2)
        };
        assert!(engine.step(&bad).is_err());
        assert_eq!(engine.step_count(), 1);
        assert_eq!(engine.previous().unwrap().position.x, 5.0);
    }

    #[test]
    fn bad_track_is_fatal() {
        let mut engine = RewardEngine::new(RewardConfig::default()).unwrap();
        let params = Params {
            waypoints: vec![[1.0, 1.0]],
            ..params(5.0, 1)
        };
        assert!(matches!(
            engine.step(&params),
            Err(EngineError::Track(TrackError::TooFewPoints(1)))
        ));
    }

    #[test]
    fn reset_keeps_topology() {
        let mut engine = RewardEngine::new(RewardConfig::default()).unwrap();
        engine.step(&params(5.0, 1)).unwrap();
        engine.reset();
        assert!(engine.previous().is_none());
        assert!(engine.topology().is_some());
        let outcome = engine
            .evaluate(&Params {
                waypoints: vec![],
                ..params(6.0, 2)
            })
            .unwrap();
        assert_eq!(outcome.history.prev_speed, None);
    }

    #[test]
    fn emits_a_record_per_step() {
        let config = RewardConfig {
            validate_records: true,
            ..Default::default()
        };
        let mut engine = RewardEngine::with_sink(config, MemorySink::new()).unwrap();
        engine.step(&params(5.0, 1)).unwrap();
        let crashed = Params {
            is_crashed: true,
            ..params(5.5, 2)
        };
        engine.step(&crashed).unwrap();

        let records = engine.sink().records();
        assert_eq!(records.len(), 2);
        assert!(records[0].sub_rewards.is_some());
        assert_eq!(records[0].target_speed, Some(4.0));
        assert_eq!(records[1].sub_rewards, None);
        assert_eq!(records[1].reward, RewardConfig::default().min_reward);
        assert_eq!(records[1].step, 2);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = RewardConfig {
            max_steering: -1.0,
            ..Default::default()
        };
        assert!(RewardEngine::new(config).is_err());
    }
}
