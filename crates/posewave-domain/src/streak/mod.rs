use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::session::DailyBuckets;

/// A day still counts toward the streak if the most recent play date is at
/// most this many days before today. Today, yesterday and the day before
/// all qualify; two fully missed days zero the streak.
pub const STREAK_GRACE_DAYS: i64 = 2;

/// Consecutive-day play streak, recomputed from scratch on every read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayStreak {
    days: u32,
    last_play_date: Option<NaiveDate>,
}

impl PlayStreak {
    /// Count consecutive calendar days with at least one session, ending at
    /// the most recent play date.
    ///
    /// The most recent play date only qualifies if it falls within the
    /// grace window ending at `today`; otherwise the streak is 0 no matter
    /// how long the earlier unbroken run was. Within a qualifying run, the
    /// first gap terminates the count.
    pub fn calculate(history: &DailyBuckets, today: NaiveDate) -> Self {
        let dates = history.dates_desc();
        Self::from_dates_desc(&dates, today)
    }

    /// Same computation over a pre-extracted descending date list.
    pub fn from_dates_desc(dates_desc: &[NaiveDate], today: NaiveDate) -> Self {
        let Some(&latest) = dates_desc.first() else {
            return Self::default();
        };

        let idle_days = (today - latest).num_days();
        if idle_days > STREAK_GRACE_DAYS {
            return Self {
                days: 0,
                last_play_date: Some(latest),
            };
        }

        let mut days = 0u32;
        for (i, &date) in dates_desc.iter().enumerate() {
            let expected = latest - Duration::days(i as i64);
            if date != expected {
                break;
            }
            days += 1;
        }

        Self {
            days,
            last_play_date: Some(latest),
        }
    }

    pub fn restore(days: u32, last_play_date: Option<NaiveDate>) -> Self {
        Self {
            days,
            last_play_date,
        }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn last_play_date(&self) -> Option<NaiveDate> {
        self.last_play_date
    }
}
