// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row and insert models for the ledger tables.
//!
//! Amounts are stored as signed 64-bit integers and exposed to callers as
//! `u64`. Every conversion goes through [`amount_to_db`] or
//! [`amount_from_db`] so an out-of-range value surfaces as
//! `PersistenceError::InvalidAmount` instead of wrapping.

use affiliate_budget_domain::{
    AdjustmentKind, Affiliate, AffiliateStatus, BalanceAdjustment, Campaign,
};
use diesel::prelude::*;
use num_traits::ToPrimitive;

use crate::diesel_schema::{affiliates, balance_adjustments, campaigns, redemption_codes};
use crate::error::PersistenceError;

/// Converts a ledger amount to its stored representation.
pub(crate) fn amount_to_db(amount: u64) -> Result<i64, PersistenceError> {
    amount
        .to_i64()
        .ok_or_else(|| PersistenceError::InvalidAmount(format!("{amount} exceeds ledger range")))
}

/// Converts a stored amount back to a ledger amount.
pub(crate) fn amount_from_db(amount: i64) -> Result<u64, PersistenceError> {
    amount
        .to_u64()
        .ok_or_else(|| PersistenceError::InvalidAmount(format!("negative stored amount {amount}")))
}

/// Current unix time in seconds.
pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = affiliates)]
pub(crate) struct AffiliateRow {
    pub affiliate_id: String,
    pub status: String,
    pub weekly_allocation: i64,
    pub weekly_balance: i64,
    pub one_time_balance: i64,
}

impl AffiliateRow {
    pub(crate) fn into_affiliate(self) -> Result<Affiliate, PersistenceError> {
        Ok(Affiliate {
            status: self.status.parse::<AffiliateStatus>()?,
            weekly_allocation: amount_from_db(self.weekly_allocation)?,
            weekly_balance: amount_from_db(self.weekly_balance)?,
            one_time_balance: amount_from_db(self.one_time_balance)?,
            affiliate_id: self.affiliate_id,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = affiliates)]
pub(crate) struct NewAffiliateRow<'a> {
    pub affiliate_id: &'a str,
    pub status: &'a str,
    pub weekly_allocation: i64,
    pub weekly_balance: i64,
    pub one_time_balance: i64,
    pub created_at: i64,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = campaigns)]
pub(crate) struct CampaignRow {
    pub campaign_id: i64,
    pub owner_id: String,
    pub amount_per_code: i64,
    pub code_count: i64,
    pub expiration: i64,
    pub weekly_reserved: i64,
    pub one_time_reserved: i64,
    pub reclaimed_at: Option<i64>,
}

impl CampaignRow {
    /// Value still locked against this campaign given its redeemed code count.
    pub(crate) fn unredeemed_value(&self, redeemed_count: i64) -> Result<u64, PersistenceError> {
        Ok(affiliate_budget_domain::unredeemed_value(
            amount_from_db(self.amount_per_code)?,
            amount_from_db(self.code_count)?,
            amount_from_db(redeemed_count)?,
        )?)
    }

    pub(crate) fn into_campaign(self, redeemed_count: i64) -> Result<Campaign, PersistenceError> {
        Ok(Campaign {
            campaign_id: self.campaign_id,
            amount_per_code: amount_from_db(self.amount_per_code)?,
            code_count: amount_from_db(self.code_count)?,
            redeemed_count: amount_from_db(redeemed_count)?,
            expiration: self.expiration,
            weekly_reserved: amount_from_db(self.weekly_reserved)?,
            one_time_reserved: amount_from_db(self.one_time_reserved)?,
            reclaimed_at: self.reclaimed_at,
            owner_id: self.owner_id,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = campaigns)]
pub(crate) struct NewCampaignRow<'a> {
    pub owner_id: &'a str,
    pub amount_per_code: i64,
    pub code_count: i64,
    pub expiration: i64,
    pub weekly_reserved: i64,
    pub one_time_reserved: i64,
    pub created_at: i64,
}

#[derive(Insertable)]
#[diesel(table_name = redemption_codes)]
pub(crate) struct NewRedemptionCodeRow<'a> {
    pub campaign_id: i64,
    pub code: &'a str,
    pub is_redeemed: i32,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = balance_adjustments)]
pub(crate) struct BalanceAdjustmentRow {
    pub adjustment_id: i64,
    pub affiliate_id: String,
    pub campaign_id: Option<i64>,
    pub kind: String,
    pub weekly_delta: i64,
    pub one_time_delta: i64,
    pub created_at: i64,
}

impl BalanceAdjustmentRow {
    pub(crate) fn into_adjustment(self) -> Result<BalanceAdjustment, PersistenceError> {
        Ok(BalanceAdjustment {
            adjustment_id: self.adjustment_id,
            affiliate_id: self.affiliate_id,
            kind: self.kind.parse::<AdjustmentKind>()?,
            campaign_id: self.campaign_id,
            weekly_delta: self.weekly_delta,
            one_time_delta: self.one_time_delta,
            created_at: self.created_at,
        })
    }
}

/// A journal entry to append alongside a balance mutation.
#[derive(Insertable)]
#[diesel(table_name = balance_adjustments)]
pub struct NewAdjustment<'a> {
    pub affiliate_id: &'a str,
    pub campaign_id: Option<i64>,
    pub kind: &'a str,
    pub weekly_delta: i64,
    pub one_time_delta: i64,
    pub created_at: i64,
}

impl<'a> NewAdjustment<'a> {
    pub(crate) fn new(
        affiliate_id: &'a str,
        kind: AdjustmentKind,
        weekly_delta: i64,
        one_time_delta: i64,
    ) -> Self {
        Self {
            affiliate_id,
            campaign_id: None,
            kind: kind.as_str(),
            weekly_delta,
            one_time_delta,
            created_at: unix_now(),
        }
    }

    pub(crate) const fn for_campaign(mut self, campaign_id: i64) -> Self {
        self.campaign_id = Some(campaign_id);
        self
    }
}
