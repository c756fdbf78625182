// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Balance journal entries.
//!
//! Every mutation of an affiliate's weekly or one-time balance is recorded
//! as an adjustment in the same transaction as the mutation itself.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The operation that produced a balance adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// Budget locked against a new campaign.
    Reservation,
    /// A prior reservation returned to its buckets.
    Refund,
    /// Weekly balance reset by the replenishment sweep.
    Replenishment,
    /// Unredeemed campaign value returned after expiration.
    Reclamation,
    /// One-time balance credited by an administrator.
    OneTimeTopUp,
    /// Weekly balance credited outside of reclamation.
    WeeklyCredit,
}

impl AdjustmentKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reservation => "reservation",
            Self::Refund => "refund",
            Self::Replenishment => "replenishment",
            Self::Reclamation => "reclamation",
            Self::OneTimeTopUp => "one_time_top_up",
            Self::WeeklyCredit => "weekly_credit",
        }
    }
}

impl FromStr for AdjustmentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reservation" => Ok(Self::Reservation),
            "refund" => Ok(Self::Refund),
            "replenishment" => Ok(Self::Replenishment),
            "reclamation" => Ok(Self::Reclamation),
            "one_time_top_up" => Ok(Self::OneTimeTopUp),
            "weekly_credit" => Ok(Self::WeeklyCredit),
            _ => Err(DomainError::InvalidAdjustmentKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded change to an affiliate's balances.
///
/// Deltas are signed: reservations are negative, credits positive. A
/// replenishment records the difference between the old and new weekly
/// balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceAdjustment {
    pub adjustment_id: i64,
    pub affiliate_id: String,
    pub kind: AdjustmentKind,
    /// The campaign involved, for reservations and reclamations.
    pub campaign_id: Option<i64>,
    pub weekly_delta: i64,
    pub one_time_delta: i64,
    /// Unix timestamp in seconds.
    pub created_at: i64,
}
