//! Week timestamp arithmetic anchored to the semester start.
//!
//! The portal addresses schedule weeks by an epoch-seconds timestamp inside
//! the requested week; callers address them by an integer offset in weeks
//! (negative = past weeks).

use chrono::{DateTime, Utc};

/// 2022-08-29 00:00:00 UTC, the Monday the semester calendar is anchored to.
pub const SEMESTER_START: i64 = 1_661_731_200;

pub const WEEK_SECONDS: i64 = 7 * 24 * 3600;

/// The epoch-seconds timestamp the portal expects for the given week offset.
///
/// Total over all `i64` offsets; saturates at the integer range rather than
/// wrapping, which keeps the mapping monotonic.
pub fn api_timestamp(week_delta: i64) -> i64 {
    SEMESTER_START.saturating_add(week_delta.saturating_mul(WEEK_SECONDS))
}

/// The caller-facing calendar timestamp labelling the same week.
pub fn week_start(week_delta: i64) -> DateTime<Utc> {
    let secs = api_timestamp(week_delta);
    DateTime::from_timestamp(secs, 0).unwrap_or(if secs < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}
