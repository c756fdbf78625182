// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Budget arithmetic for the three-bucket affiliate balance.
//!
//! These functions are pure; the persistence layer applies their results
//! inside a single locked transaction.
//!
//! ## Invariants
//!
//! - A reservation consumes the one-time balance before the weekly balance
//! - `split.weekly + split.one_time == amount` for every successful split
//! - A replenished weekly balance is never negative

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// How a reservation was drawn from the two spendable buckets.
///
/// The split is returned to the caller so that a later refund can restore
/// exactly the amounts deducted from each bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ReservationSplit {
    /// Amount deducted from the weekly balance.
    pub weekly: u64,
    /// Amount deducted from the one-time balance.
    pub one_time: u64,
}

impl ReservationSplit {
    #[must_use]
    pub const fn new(weekly: u64, one_time: u64) -> Self {
        Self { weekly, one_time }
    }

    /// Total amount covered by this split.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub const fn total(&self) -> Option<u64> {
        self.weekly.checked_add(self.one_time)
    }
}

/// Splits a reservation across the one-time and weekly buckets.
///
/// The one-time balance is exhausted first; the remainder comes from the
/// weekly balance.
///
/// # Errors
///
/// Returns `DomainError::InsufficientBalance` if both buckets together
/// cannot cover `amount`.
pub fn split_reservation(
    amount: u64,
    weekly_balance: u64,
    one_time_balance: u64,
) -> Result<ReservationSplit, DomainError> {
    let available: u64 = weekly_balance.saturating_add(one_time_balance);
    if available < amount {
        return Err(DomainError::InsufficientBalance {
            requested: amount,
            available,
        });
    }

    let one_time: u64 = amount.min(one_time_balance);
    let weekly: u64 = amount - one_time;

    Ok(ReservationSplit { weekly, one_time })
}

/// Computes the weekly balance after replenishment.
///
/// An allocation that is smaller than the currently reserved total yields
/// zero rather than a negative balance.
#[must_use]
pub const fn replenished_weekly_balance(weekly_allocation: u64, reserved: u64) -> u64 {
    weekly_allocation.saturating_sub(reserved)
}

/// Computes the value still locked against a campaign.
///
/// # Errors
///
/// Returns an error if `amount_per_code × unredeemed` overflows.
pub fn unredeemed_value(
    amount_per_code: u64,
    code_count: u64,
    redeemed_count: u64,
) -> Result<u64, DomainError> {
    let unredeemed: u64 = code_count.saturating_sub(redeemed_count);
    amount_per_code
        .checked_mul(unredeemed)
        .ok_or_else(|| DomainError::AmountOverflow {
            operation: String::from("computing unredeemed campaign value"),
        })
}
