//! Composition of the sub-rewards into the final reward.

use crate::config::check_range;
use crate::error::ConfigError;
use crate::reward::{Reward, SubRewards};
use crate::telemetry::Flags;
use serde::{Deserialize, Serialize};

/// The relative weights of the sub-rewards in a weighted mean.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubRewardWeights {
    pub centerline: f64,
    pub heading: f64,
    pub steering: f64,
    pub speed: f64,
}

impl Default for SubRewardWeights {
    fn default() -> Self {
        Self {
            centerline: 1.0,
            heading: 1.0,
            steering: 1.0,
            speed: 1.0,
        }
    }
}

impl SubRewardWeights {
    fn values(&self) -> [f64; 4] {
        [self.centerline, self.heading, self.steering, self.speed]
    }
}

/// How the sub-rewards are combined into the final reward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Composition {
    /// The arithmetic mean of the sub-rewards.
    #[default]
    Mean,
    /// A weighted mean of the sub-rewards.
    Weighted { weights: SubRewardWeights },
    /// The mean of the centerline, heading and steering rewards, scaled by the speed reward.
    Multiplicative,
}

impl Composition {
    /// Checks that the weights, if any, are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Composition::Weighted { weights } = self {
            for weight in weights.values() {
                check_range("composition.weights", weight, 0.0, f64::INFINITY)?;
            }
            let total = weights.values().iter().sum::<f64>();
            if total <= 0.0 {
                return Err(ConfigError::NotPositive {
                    field: "composition.weights",
                    value: total,
                });
            }
        }
        Ok(())
    }

    /// Combines the sub-rewards, before clamping.
    fn combine(&self, sub_rewards: &SubRewards) -> f64 {
        let values = sub_rewards.values();
        match self {
            Composition::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Composition::Weighted { weights } => {
                let weights = weights.values();
                let total = weights.iter().sum::<f64>();
                values.iter().zip(weights).map(|(v, w)| v * w).sum::<f64>() / total
            }
            Composition::Multiplicative => {
                let [centerline, heading, steering, speed] = values;
                (centerline + heading + steering) / 3.0 * speed
            }
        }
    }
}

/// The outcome of composing a step's reward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Composed {
    /// A failure flag was set, so the step earned the floor reward.
    Failed(Reward),
    /// The reward composed from the sub-rewards.
    Rewarded {
        reward: Reward,
        sub_rewards: SubRewards,
    },
}

impl Composed {
    /// The final reward.
    pub fn reward(&self) -> Reward {
        match self {
            Composed::Failed(reward) => *reward,
            Composed::Rewarded { reward, .. } => *reward,
        }
    }

    /// The sub-rewards, if they were computed.
    pub fn sub_rewards(&self) -> Option<&SubRewards> {
        match self {
            Composed::Failed(_) => None,
            Composed::Rewarded { sub_rewards, .. } => Some(sub_rewards),
        }
    }
}

/// Combines sub-rewards into the final reward under the failure policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardComposer {
    pub composition: Composition,
    /// The floor reward.
    pub floor: f64,
}

impl RewardComposer {
    pub fn new(composition: Composition, floor: f64) -> Self {
        Self { composition, floor }
    }

    /// Combines sub-rewards into a reward in `[floor, 1]`.
    pub fn combine(&self, sub_rewards: &SubRewards) -> Reward {
        Reward::new(self.composition.combine(sub_rewards), self.floor)
    }

    /// Composes the final reward.
    ///
    /// If any failure flag is set the floor reward is returned
    /// and `sub_rewards` is never called.
    pub fn compose<E>(
        &self,
        flags: &Flags,
        sub_rewards: impl FnOnce() -> Result<SubRewards, E>,
    ) -> Result<Composed, E> {
        if flags.failed() {
            return Ok(Composed::Failed(Reward::floor(self.floor)));
        }
        let sub_rewards = sub_rewards()?;
        Ok(Composed::Rewarded {
            reward: self.combine(&sub_rewards),
            sub_rewards,
        })
    }
}
