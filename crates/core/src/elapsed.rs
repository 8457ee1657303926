//! Elapsed-time counter
//!
//! Breaks the span between two instants into whole days, hours, minutes and
//! seconds, the way a "days since I started" counter displays it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElapsedTime {
    pub days: i64,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl ElapsedTime {
    /// Span from `start` to `now`. A start in the future yields zero.
    pub fn between(start: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let total = (now - start).num_seconds().max(0);
        let days = total / 86_400;
        let rem = total % 86_400;
        Self {
            days,
            hours: (rem / 3600) as u32,
            minutes: ((rem % 3600) / 60) as u32,
            seconds: (rem % 60) as u32,
        }
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}
