// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use affiliate_budget_domain::DomainError;
use affiliate_budget_persistence::PersistenceError;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The store rejected or failed the operation.
    #[error("Store operation failed: {0}")]
    Store(#[from] PersistenceError),

    /// The store did not answer within the configured bound.
    #[error("Store operation '{operation}' timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// The blocking task running a store call panicked or was cancelled.
    #[error("Store task for '{operation}' failed: {reason}")]
    Join {
        operation: &'static str,
        reason: String,
    },

    /// The scheduler configuration is unusable.
    #[error("Invalid scheduler configuration: {0}")]
    Configuration(#[from] DomainError),

    /// `start` was called more than once.
    #[error("Scheduler has already been started")]
    AlreadyStarted,
}
