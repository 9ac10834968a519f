pub use cgmath;
pub use compose::{Composed, Composition, RewardComposer, SubRewardWeights};
pub use config::RewardConfig;
pub use curve::{curvature_multiplier, CurvatureWeights, CurveDetector, CurveInfo};
pub use emitter::{EventSink, JsonLinesSink, LogSink, MemorySink, NullSink, StepRecord};
pub use engine::{RewardEngine, StepGeometry, StepOutcome};
pub use error::{ConfigError, EngineError, TelemetryError, TrackError};
pub use history::HistoricData;
pub use reward::{Reward, SubRewards, MIN_REWARD};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use target::{TargetData, TargetProjector};
pub use telemetry::{Flags, Params, TelemetrySample};
pub use track::{Segment, Topology, Waypoint};
pub use util::Interval;

mod compose;
mod config;
mod curve;
mod debug;
mod emitter;
mod engine;
mod error;
mod history;
pub mod math;
pub mod reward;
mod target;
mod telemetry;
mod track;
mod util;

new_key_type! {
    /// Unique ID of a [Segment].
    pub struct SegmentId;
}

type SegmentSet = SlotMap<SegmentId, Segment>;
