use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{Pose, RoundConfig, RoundEvent, RoundPhase, RoundState, RoundTally};

/// The round state machine: `Wave -> Gameplay -> (GameOver | Wave)`.
///
/// Pure and synchronous. Time enters only through the `now` arguments, and
/// ticks are delivered by the owning controller; nothing here schedules
/// anything. Pausing skips delivered ticks rather than banking remaining
/// time, matching the interval-resumption behavior of the shipped game.
pub struct RoundEngine {
    config: RoundConfig,
    state: RoundState,
    rng: StdRng,
}

impl RoundEngine {
    pub fn new(config: RoundConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic pose selection for tests.
    pub fn with_rng(config: RoundConfig, rng: StdRng) -> Self {
        Self {
            config,
            state: RoundState::fresh(Utc::now(), 0),
            rng,
        }
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// Arm the first wave. Also used to restart after `GameOver`; counters
    /// reset and stale async results from the previous run are fenced off
    /// by the epoch bump.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Vec<RoundEvent> {
        let epoch = self.state.epoch + 1;
        self.state = RoundState::fresh(now, epoch);
        self.begin_wave()
    }

    /// Tear down without producing a tally (navigation away). Any late
    /// classification or tick is ignored from here on.
    pub fn halt(&mut self) {
        self.state.epoch += 1;
        self.state.phase = RoundPhase::GameOver;
    }

    pub fn pause(&mut self) {
        self.state.paused = true;
    }

    pub fn resume(&mut self) {
        self.state.paused = false;
    }

    /// Deliver one 1-unit timer tick.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<RoundEvent> {
        // A paused timer's tick is skipped, not banked
        if self.state.paused {
            return Vec::new();
        }

        match self.state.phase {
            RoundPhase::Wave => self.tick_wave(now),
            RoundPhase::Gameplay => self.tick_pose(now),
            RoundPhase::GameOver => Vec::new(),
        }
    }

    /// Deliver a classifier result for a captured frame.
    ///
    /// Re-checks the current phase and pause flag, so a response that
    /// resolves after the round moved on changes nothing. Callers that held
    /// the response across a reset must additionally compare `epoch()`.
    pub fn classification(
        &mut self,
        label: &str,
        confidence: f64,
        now: DateTime<Utc>,
    ) -> Vec<RoundEvent> {
        if self.state.phase != RoundPhase::Gameplay || self.state.paused {
            return Vec::new();
        }

        if confidence < self.config.min_confidence {
            return Vec::new();
        }

        let Some(expected) = self.state.sequence.get(self.state.expected_index).copied() else {
            return Vec::new();
        };

        if Pose::from_label(label) != Some(expected) {
            return Vec::new();
        }

        // One correct pose held across several rapid frames must score once
        let index = self.state.expected_index;
        if let Some((credited_index, credited_at)) = self.state.last_credit {
            if credited_index == index && now - credited_at < self.config.credit_debounce {
                return Vec::new();
            }
        }

        self.state.score += self.config.pose_award;
        self.state.last_credit = Some((index, now));

        let mut events = vec![RoundEvent::PoseMatched {
            pose: expected,
            index,
            score: self.state.score,
        }];

        self.state.expected_index += 1;
        if self.state.expected_index >= self.state.sequence.len() {
            self.state.waves_cleared += 1;
            events.push(RoundEvent::WaveCleared {
                waves_cleared: self.state.waves_cleared,
            });
            events.extend(self.begin_wave());
        } else {
            self.state.pose_ticks_left = self.config.pose_countdown_ticks;
            events.push(RoundEvent::PoseAdvanced {
                expected: self.state.sequence[self.state.expected_index],
            });
        }

        events
    }

    /// Whether the capture loop may sample a frame right now.
    ///
    /// Gameplay only, unpaused, and past the warm-up grace period that
    /// covers the wave-to-gameplay transition animation.
    pub fn capture_allowed(&self, now: DateTime<Utc>) -> bool {
        self.state.phase == RoundPhase::Gameplay
            && !self.state.paused
            && self
                .state
                .gameplay_entered_at
                .is_some_and(|entered| now - entered >= self.config.capture_warmup)
    }

    pub fn epoch(&self) -> u64 {
        self.state.epoch
    }

    pub fn tally(&self, now: DateTime<Utc>) -> RoundTally {
        RoundTally {
            score: self.state.score,
            waves_cleared: self.state.waves_cleared,
            time_spent_seconds: (now - self.state.started_at).num_milliseconds() as f64 / 1000.0,
        }
    }

    fn begin_wave(&mut self) -> Vec<RoundEvent> {
        let exclude = self.state.sequence.last().copied();
        let upcoming = Pose::random_excluding(&mut self.rng, exclude);

        self.state.phase = RoundPhase::Wave;
        self.state.upcoming_pose = Some(upcoming);
        self.state.wave_ticks_left = self.config.wave_countdown_ticks;

        vec![RoundEvent::WaveStarted {
            wave: self.state.waves_cleared + 1,
            upcoming,
        }]
    }

    fn tick_wave(&mut self, now: DateTime<Utc>) -> Vec<RoundEvent> {
        if self.state.wave_ticks_left == 0 {
            // Not armed yet (reset() was never called)
            return Vec::new();
        }

        self.state.wave_ticks_left -= 1;
        if self.state.wave_ticks_left > 0 {
            return vec![RoundEvent::WaveTick {
                remaining: self.state.wave_ticks_left,
            }];
        }

        let pose = self
            .state
            .upcoming_pose
            .take()
            .expect("armed wave always has an upcoming pose");
        self.state.sequence.push(pose);
        self.state.expected_index = 0;
        self.state.phase = RoundPhase::Gameplay;
        self.state.pose_ticks_left = self.config.pose_countdown_ticks;
        self.state.gameplay_entered_at = Some(now);

        vec![RoundEvent::GameplayStarted {
            expected: self.state.sequence[0],
        }]
    }

    fn tick_pose(&mut self, now: DateTime<Utc>) -> Vec<RoundEvent> {
        self.state.pose_ticks_left = self.state.pose_ticks_left.saturating_sub(1);
        if self.state.pose_ticks_left > 0 {
            return vec![RoundEvent::PoseTick {
                remaining: self.state.pose_ticks_left,
            }];
        }

        self.state.phase = RoundPhase::GameOver;
        vec![RoundEvent::GameOver {
            tally: self.tally(now),
        }]
    }
}
