// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Weekly replenishment anchor calculation.
//!
//! The replenishment cycle fires at local midnight of the next Monday in a
//! reference timezone. When the IANA timezone cannot be resolved, a fixed
//! UTC offset is used instead.
//!
//! ## Invariants
//!
//! - The anchor is strictly after "now"; a "now" that falls exactly on a
//!   boundary advances a full week
//! - The computed wait is never negative
//! - Midnight removed by a DST transition resolves to the first valid
//!   instant after the gap

use crate::error::DomainError;
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

/// Default reference timezone for the weekly anchor.
pub const DEFAULT_REFERENCE_TIMEZONE: &str = "America/New_York";

/// Fixed offset used when the reference timezone is unavailable (UTC-5).
pub const DEFAULT_FALLBACK_UTC_OFFSET_SECONDS: i32 = -5 * 3600;

/// The timezone in which weekly anchors are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceZone {
    /// A named IANA timezone with full DST rules.
    Named(Tz),
    /// A fixed offset from UTC.
    Fixed(chrono::FixedOffset),
}

impl ReferenceZone {
    /// Parses a named IANA timezone.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimezone` if the name is not known.
    pub fn named(name: &str) -> Result<Self, DomainError> {
        name.parse::<Tz>()
            .map(Self::Named)
            .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
    }

    /// Builds a fixed-offset zone, with the offset given in seconds east of UTC.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUtcOffset` if the offset is out of range.
    pub fn fixed(offset_seconds: i32) -> Result<Self, DomainError> {
        chrono::FixedOffset::east_opt(offset_seconds)
            .map(Self::Fixed)
            .ok_or(DomainError::InvalidUtcOffset(offset_seconds))
    }

    /// Returns the next weekly anchor strictly after `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if date arithmetic overflows.
    pub fn next_weekly_anchor(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, DomainError> {
        match self {
            Self::Named(tz) => next_monday_midnight(tz, now),
            Self::Fixed(offset) => next_monday_midnight(offset, now),
        }
    }
}

impl std::fmt::Display for ReferenceZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(tz) => write!(f, "{}", tz.name()),
            Self::Fixed(offset) => write!(f, "UTC{offset}"),
        }
    }
}

/// Time remaining until `target`, clamped at zero.
#[must_use]
pub fn duration_until(target: DateTime<Utc>, now: DateTime<Utc>) -> std::time::Duration {
    (target - now).to_std().unwrap_or(std::time::Duration::ZERO)
}

fn next_monday_midnight<Z: TimeZone>(
    zone: &Z,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, DomainError> {
    let local_date: NaiveDate = now.with_timezone(zone).date_naive();
    let days_until_monday: u32 = (7 - local_date.weekday().num_days_from_monday()) % 7;

    let this_monday: NaiveDate = local_date
        .checked_add_days(Days::new(u64::from(days_until_monday)))
        .ok_or_else(|| overflow("advancing to the next Monday"))?;

    let anchor: DateTime<Utc> = local_midnight(zone, this_monday)?;
    if anchor > now {
        return Ok(anchor);
    }

    // Today is Monday and midnight has already passed (or is exactly now).
    let next_monday: NaiveDate = this_monday
        .checked_add_days(Days::new(7))
        .ok_or_else(|| overflow("advancing a full week"))?;
    local_midnight(zone, next_monday)
}

fn local_midnight<Z: TimeZone>(zone: &Z, date: NaiveDate) -> Result<DateTime<Utc>, DomainError> {
    let midnight: NaiveDateTime = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| overflow("constructing local midnight"))?;

    if let Some(resolved) = zone.from_local_datetime(&midnight).earliest() {
        return Ok(resolved.with_timezone(&Utc));
    }

    // Midnight falls inside a DST gap; gaps are at most one hour.
    let after_gap: NaiveDateTime = midnight
        .checked_add_signed(TimeDelta::hours(1))
        .ok_or_else(|| overflow("skipping a DST gap"))?;
    zone.from_local_datetime(&after_gap)
        .earliest()
        .map(|resolved| resolved.with_timezone(&Utc))
        .ok_or_else(|| overflow("resolving local midnight"))
}

fn overflow(operation: &str) -> DomainError {
    DomainError::DateArithmeticOverflow {
        operation: operation.to_string(),
    }
}
