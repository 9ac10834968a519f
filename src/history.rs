//! Kinematics derived from consecutive telemetry samples.

use crate::math::vector_bearing;
use crate::telemetry::TelemetrySample;
use cgmath::prelude::*;
use serde::Serialize;

/// The change between the previous sample and the current one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct HistoricData {
    /// Distance travelled since the previous sample.
    pub distance: f64,
    pub dx: f64,
    pub dy: f64,
    /// Simulation time elapsed since the previous sample, in seconds.
    pub dt: f64,
    /// Average velocity since the previous sample. Infinite if no time elapsed.
    pub velocity: f64,
    /// The speed reported by the previous sample.
    pub prev_speed: Option<f64>,
    pub speed_change: f64,
    /// Progress made since the previous sample, in percent.
    pub progress_advancement: f64,
    /// The bearing of the displacement, in `[0, 360)`.
    pub direction: f64,
}

impl HistoricData {
    /// Derives the change from `previous` to `current`.
    ///
    /// The first sample of a session has no predecessor, and yields all zeros.
    pub fn update(current: &TelemetrySample, previous: Option<&TelemetrySample>) -> Self {
        let Some(previous) = previous else {
            return Self::default();
        };
        let delta = current.position - previous.position;
        let distance = delta.magnitude();
        let dt = current.sim_time - previous.sim_time;
        let velocity = if dt > 0.0 { distance / dt } else { f64::INFINITY };
        Self {
            distance,
            dx: delta.x,
            dy: delta.y,
            dt,
            velocity,
            prev_speed: Some(previous.speed),
            speed_change: current.speed - previous.speed,
            progress_advancement: current.progress - previous.progress,
            direction: vector_bearing(delta),
        }
    }

    /// Returns false if no time elapsed between the samples, leaving the velocity undefined.
    pub fn velocity_determined(&self) -> bool {
        self.velocity.is_finite()
    }
}
