// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use affiliate_budget_domain::{
    DEFAULT_FALLBACK_UTC_OFFSET_SECONDS, DEFAULT_REFERENCE_TIMEZONE, DomainError, ReferenceZone,
};
use std::time::Duration;
use tracing::warn;

/// Default bound on a single store call made by the scheduler.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// IANA timezone name in which the weekly anchor is computed.
    pub reference_timezone: String,
    /// Offset in seconds east of UTC, used when the timezone cannot be resolved.
    pub fallback_utc_offset_seconds: i32,
    /// Upper bound on each store call made from scheduler tasks.
    pub store_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            reference_timezone: DEFAULT_REFERENCE_TIMEZONE.to_string(),
            fallback_utc_offset_seconds: DEFAULT_FALLBACK_UTC_OFFSET_SECONDS,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

impl SchedulerConfig {
    /// Resolves the reference zone, falling back to the fixed offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the timezone is unknown and the fallback offset is
    /// out of range.
    pub fn reference_zone(&self) -> Result<ReferenceZone, DomainError> {
        match ReferenceZone::named(&self.reference_timezone) {
            Ok(zone) => Ok(zone),
            Err(err) => {
                warn!(
                    timezone = %self.reference_timezone,
                    fallback_offset_seconds = self.fallback_utc_offset_seconds,
                    error = %err,
                    "Reference timezone unavailable, using fixed offset"
                );
                ReferenceZone::fixed(self.fallback_utc_offset_seconds)
            }
        }
    }
}
