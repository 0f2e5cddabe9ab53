//! Status inference from OpenClaw session recency
//!
//! The dashboard buckets agents by how many whole minutes have passed since
//! their session was last updated.
//!
//! # Thresholds
//!
//! | Age (minutes) | Status |
//! |---------------|--------|
//! | < 2 | Busy |
//! | 2-9 | Online |
//! | 10-59 | Idle |
//! | >= 60 | Offline |

use crate::data::{AgentStatus, UNKNOWN_AGE};

/// Threshold constants (in minutes, exclusive upper bounds)
const BUSY_BELOW_MIN: i64 = 2;
const ONLINE_BELOW_MIN: i64 = 10;
const IDLE_BELOW_MIN: i64 = 60;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Map age in minutes to a status band.
///
/// Accepts any integer; each band is inclusive on its lower bound.
pub fn classify_age(age_min: i64) -> AgentStatus {
    match age_min {
        m if m < BUSY_BELOW_MIN => AgentStatus::Busy,
        m if m < ONLINE_BELOW_MIN => AgentStatus::Online,
        m if m < IDLE_BELOW_MIN => AgentStatus::Idle,
        _ => AgentStatus::Offline,
    }
}

/// Whole minutes between `updated_at` and `now` (both epoch milliseconds).
///
/// A missing or zero timestamp yields `UNKNOWN_AGE`. Timestamps ahead of
/// `now` (clock skew) count as age 0, never as a negative age.
pub fn age_minutes(updated_at: Option<i64>, now_ms: i64) -> i64 {
    match updated_at {
        Some(ts) if ts != 0 => (now_ms.saturating_sub(ts) / MILLIS_PER_MINUTE).max(0),
        _ => UNKNOWN_AGE,
    }
}
