use serde::{Deserialize, Serialize};

use posewave_domain::round::{RoundPhase, RoundState};

/// Point-in-time view of a running round for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundSnapshotDto {
    pub phase: String,
    pub paused: bool,
    pub score: u32,
    pub waves_cleared: u32,
    pub expected_pose: Option<String>,
    pub upcoming_pose: Option<String>,
    pub wave_ticks_left: u32,
    pub pose_ticks_left: u32,
}

impl From<&RoundState> for RoundSnapshotDto {
    fn from(state: &RoundState) -> Self {
        let phase = match state.phase() {
            RoundPhase::Wave => "wave",
            RoundPhase::Gameplay => "gameplay",
            RoundPhase::GameOver => "game_over",
        };

        Self {
            phase: phase.to_string(),
            paused: state.is_paused(),
            score: state.score(),
            waves_cleared: state.waves_cleared(),
            expected_pose: state.expected_pose().map(|p| p.label().to_string()),
            upcoming_pose: state.upcoming_pose().map(|p| p.label().to_string()),
            wave_ticks_left: state.wave_ticks_left(),
            pose_ticks_left: state.pose_ticks_left(),
        }
    }
}
