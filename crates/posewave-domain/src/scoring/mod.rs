use serde::{Deserialize, Serialize};

use crate::session::DailyBuckets;

/// Cumulative score totals for one account's full history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    total: u64,
    max: u64,
}

impl ScoreSummary {
    /// Sum every session's score across every bucket and track the largest
    /// single-session score.
    ///
    /// Sessions decoded from corrupt records already carry score 0, so a bad
    /// entry lowers nothing and aborts nothing. Empty history yields zeros.
    pub fn summarize(history: &DailyBuckets) -> Self {
        let mut total = 0u64;
        let mut max = 0u64;

        for session in history.iter_sessions() {
            let score = session.score() as u64;
            total += score;
            max = max.max(score);
        }

        Self { total, max }
    }

    pub fn restore(total: u64, max: u64) -> Self {
        Self { total, max }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn max(&self) -> u64 {
        self.max
    }
}
