mod engine;
mod pose;
mod ports;
mod state;

pub use engine::RoundEngine;
pub use pose::Pose;
pub use ports::{Classification, Frame, FrameSource, PoseClassifier};
pub use state::{RoundConfig, RoundEvent, RoundPhase, RoundState, RoundTally};
