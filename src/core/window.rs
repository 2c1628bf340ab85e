//! # Time window and segment planning
//!
//! A window `[until, now]` split into `segment_count` evenly spaced instants.
//!
//! ```text
//! until                                                 now
//!   |-----------|-----------|-----------|-----------|----|
//!   t0          t1          t2          t3          ...
//! ```
//!
//! - `t0 == until`
//! - `t(i) = until + floor(i * (now - until) / segment_count)`, in nanoseconds
//! - the last instant is strictly before `now`
//!
//! Offsets are computed from the window start for every `i`, so rounding
//! never accumulates across segments.

use chrono::{DateTime, Duration, Utc};

use super::error::{ValidationError, ValidationResult};

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Parse an ISO-8601 / RFC 3339 instant and normalize it to UTC
pub fn parse_instant(value: &str) -> ValidationResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| ValidationError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// A validated reconstruction window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Earlier bound, the first segment instant
    pub until: DateTime<Utc>,
    /// Later bound ("present"), never reached by a segment instant
    pub now: DateTime<Utc>,
    /// Number of segment instants, at least 1
    pub segment_count: usize,
}

impl TimeWindow {
    /// Build a window, rejecting a non-positive segment count and
    /// windows whose end is not after their start
    ///
    /// An inverted window would yield a non-increasing instant sequence;
    /// it is reported as invalid input rather than corrected.
    pub fn new(
        until: DateTime<Utc>,
        now: DateTime<Utc>,
        segment_count: i64,
    ) -> ValidationResult<Self> {
        if segment_count <= 0 {
            return Err(ValidationError::NonPositiveSegments(segment_count));
        }
        let segment_count = usize::try_from(segment_count).map_err(|_| {
            ValidationError::TooManySegments {
                got: segment_count,
                max: usize::MAX,
            }
        })?;
        if now <= until {
            return Err(ValidationError::InvertedWindow {
                until: until.to_rfc3339(),
                now: now.to_rfc3339(),
            });
        }

        Ok(Self {
            until,
            now,
            segment_count,
        })
    }

    /// Length of the window
    pub fn span(&self) -> Duration {
        self.now - self.until
    }

    /// The ordered segment instants of this window
    pub fn instants(&self) -> Vec<DateTime<Utc>> {
        let span = self.span();
        let total = span.num_seconds() as i128 * NANOS_PER_SECOND + span.subsec_nanos() as i128;
        let count = self.segment_count as i128;

        (0..self.segment_count)
            .map(|i| {
                let offset = total * i as i128 / count;
                let secs = (offset / NANOS_PER_SECOND) as i64;
                let nanos = (offset % NANOS_PER_SECOND) as i64;
                self.until + Duration::seconds(secs) + Duration::nanoseconds(nanos)
            })
            .collect()
    }
}

/// Compute the segment instants between `until` and `now`
///
/// Fails with a validation error when `segment_count <= 0` or `now <= until`.
pub fn plan_segments(
    until: DateTime<Utc>,
    now: DateTime<Utc>,
    segment_count: i64,
) -> ValidationResult<Vec<DateTime<Utc>>> {
    Ok(TimeWindow::new(until, now, segment_count)?.instants())
}
