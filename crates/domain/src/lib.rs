// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Domain types and pure budget arithmetic for the affiliate budget scheduler.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod adjustment;
mod balance;
mod codes;
mod error;
mod types;
mod weekly_anchor;

#[cfg(test)]
mod tests;

pub use adjustment::{AdjustmentKind, BalanceAdjustment};
pub use balance::{
    ReservationSplit, replenished_weekly_balance, split_reservation, unredeemed_value,
};
pub use codes::generate_redemption_codes;
pub use error::DomainError;
pub use types::{
    ActiveCampaign, Affiliate, AffiliateStatus, Campaign, NewCampaign, WeeklyConfig,
    validate_affiliate_id,
};
pub use weekly_anchor::{
    DEFAULT_FALLBACK_UTC_OFFSET_SECONDS, DEFAULT_REFERENCE_TIMEZONE, ReferenceZone,
    duration_until,
};
