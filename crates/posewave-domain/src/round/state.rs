use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Pose;

/// Phases of one play round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Countdown before the next pose is appended to the sequence.
    Wave,
    /// The player performs the sequence against the per-pose timer.
    Gameplay,
    /// Terminal; the tally is handed to the session recorder.
    GameOver,
}

/// Tunables for the round state machine.
#[derive(Debug, Clone)]
pub struct RoundConfig {
    /// Wave countdown length, in 1-unit ticks.
    pub wave_countdown_ticks: u32,
    /// Per-pose countdown length, in 1-unit ticks.
    pub pose_countdown_ticks: u32,
    /// Points awarded per matched pose.
    pub pose_award: u32,
    /// Window during which a pose index may not be credited twice.
    pub credit_debounce: Duration,
    /// Frames are not captured until this much gameplay has elapsed.
    pub capture_warmup: Duration,
    /// Classifications below this confidence are treated as a mismatch.
    pub min_confidence: f64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            wave_countdown_ticks: 5,
            pose_countdown_ticks: 5,
            pose_award: 10,
            credit_debounce: Duration::seconds(2),
            capture_warmup: Duration::seconds(1),
            min_confidence: 0.5,
        }
    }
}

/// Final numbers of a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundTally {
    pub score: u32,
    pub waves_cleared: u32,
    pub time_spent_seconds: f64,
}

/// Observable outcomes of feeding a tick or a classification to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    WaveStarted { wave: u32, upcoming: Pose },
    WaveTick { remaining: u32 },
    GameplayStarted { expected: Pose },
    PoseTick { remaining: u32 },
    PoseMatched { pose: Pose, index: usize, score: u32 },
    PoseAdvanced { expected: Pose },
    WaveCleared { waves_cleared: u32 },
    GameOver { tally: RoundTally },
}

/// The single source of truth for one round.
///
/// Timer callbacks and classification callbacks all mutate this one record
/// through the engine; there are no shadow copies of any flag.
#[derive(Debug, Clone)]
pub struct RoundState {
    pub(super) phase: RoundPhase,
    pub(super) paused: bool,
    pub(super) score: u32,
    pub(super) waves_cleared: u32,
    pub(super) sequence: Vec<Pose>,
    pub(super) expected_index: usize,
    pub(super) wave_ticks_left: u32,
    pub(super) pose_ticks_left: u32,
    pub(super) upcoming_pose: Option<Pose>,
    pub(super) last_credit: Option<(usize, DateTime<Utc>)>,
    pub(super) started_at: DateTime<Utc>,
    pub(super) gameplay_entered_at: Option<DateTime<Utc>>,
    pub(super) epoch: u64,
}

impl RoundState {
    pub(super) fn fresh(started_at: DateTime<Utc>, epoch: u64) -> Self {
        Self {
            phase: RoundPhase::Wave,
            paused: false,
            score: 0,
            waves_cleared: 0,
            sequence: Vec::new(),
            expected_index: 0,
            wave_ticks_left: 0,
            pose_ticks_left: 0,
            upcoming_pose: None,
            last_credit: None,
            started_at,
            gameplay_entered_at: None,
            epoch,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn waves_cleared(&self) -> u32 {
        self.waves_cleared
    }

    pub fn sequence(&self) -> &[Pose] {
        &self.sequence
    }

    /// The pose the player must hit next; `None` outside `Gameplay`.
    pub fn expected_pose(&self) -> Option<Pose> {
        if self.phase == RoundPhase::Gameplay {
            self.sequence.get(self.expected_index).copied()
        } else {
            None
        }
    }

    pub fn expected_index(&self) -> usize {
        self.expected_index
    }

    pub fn wave_ticks_left(&self) -> u32 {
        self.wave_ticks_left
    }

    pub fn pose_ticks_left(&self) -> u32 {
        self.pose_ticks_left
    }

    /// The pose announced during the current wave countdown.
    pub fn upcoming_pose(&self) -> Option<Pose> {
        self.upcoming_pose
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Bumped on every reset; side effects of stale async work are dropped
    /// by comparing against it.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}
