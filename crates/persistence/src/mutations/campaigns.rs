// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Campaign creation, code redemption and reclamation.
//!
//! ## Reclamation Marker
//!
//! `reclaimed_at` is set in the same transaction that credits the owner's
//! weekly balance. A campaign with the marker set is excluded from active
//! campaign enumeration and from the owner's allocated total, and a second
//! reclamation returns zero. This makes reclamation exactly-once even if the
//! process restarts between a timer firing and the commit.

use affiliate_budget_domain::{
    AdjustmentKind, AffiliateStatus, Campaign, NewCampaign, ReservationSplit, split_reservation,
};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{
    CampaignRow, NewAdjustment, NewCampaignRow, NewRedemptionCodeRow, amount_from_db,
    amount_to_db, unix_now,
};
use crate::diesel_schema::{affiliates, campaigns, redemption_codes};
use crate::error::PersistenceError;

backend_fn! {
/// Creates a campaign and its codes, reserving the campaign's total value
/// from the owner's balances.
///
/// The reservation, the campaign row, every code row and the journal entry
/// commit together or not at all.
///
/// # Errors
///
/// Returns a validation error for bad parameters, `AffiliateNotFound` or
/// `AffiliateNotApproved` for the owner, `InsufficientBalance` if the owner
/// cannot cover the total, or a database error (including a code that is
/// already used by another campaign).
pub fn create_campaign(
    conn: &mut _,
    new_campaign: &NewCampaign,
) -> Result<Campaign, PersistenceError> {
    new_campaign.validate()?;

    let owner_id: &str = new_campaign.owner_id.as_str();
    let total: u64 = new_campaign.total_value()?;
    let amount_per_code: i64 = amount_to_db(new_campaign.amount_per_code)?;
    let code_count: i64 = amount_to_db(new_campaign.code_count())?;

    let campaign: Campaign = conn.write_transaction(|conn| {
        let (weekly, one_time): (i64, i64) = conn
            .lock_affiliate_balances(owner_id)?
            .ok_or_else(|| PersistenceError::AffiliateNotFound(owner_id.to_string()))?;

        let status: String = affiliates::table
            .filter(affiliates::affiliate_id.eq(owner_id))
            .select(affiliates::status)
            .first(conn)?;
        if status != AffiliateStatus::Approved.as_str() {
            return Err(PersistenceError::AffiliateNotApproved(owner_id.to_string()));
        }

        let split: ReservationSplit =
            split_reservation(total, amount_from_db(weekly)?, amount_from_db(one_time)?)?;
        let weekly_reserved: i64 = amount_to_db(split.weekly)?;
        let one_time_reserved: i64 = amount_to_db(split.one_time)?;

        diesel::update(affiliates::table)
            .filter(affiliates::affiliate_id.eq(owner_id))
            .set((
                affiliates::weekly_balance.eq(weekly - weekly_reserved),
                affiliates::one_time_balance.eq(one_time - one_time_reserved),
            ))
            .execute(conn)?;

        diesel::insert_into(campaigns::table)
            .values(&NewCampaignRow {
                owner_id,
                amount_per_code,
                code_count,
                expiration: new_campaign.expiration,
                weekly_reserved,
                one_time_reserved,
                created_at: unix_now(),
            })
            .execute(conn)?;
        let campaign_id: i64 = conn.get_last_insert_rowid()?;

        let code_rows: Vec<NewRedemptionCodeRow<'_>> = new_campaign
            .codes
            .iter()
            .map(|code| NewRedemptionCodeRow {
                campaign_id,
                code: code.as_str(),
                is_redeemed: 0,
            })
            .collect();
        diesel::insert_into(redemption_codes::table)
            .values(&code_rows)
            .execute(conn)?;

        conn.append_adjustment(
            &NewAdjustment::new(
                owner_id,
                AdjustmentKind::Reservation,
                -weekly_reserved,
                -one_time_reserved,
            )
            .for_campaign(campaign_id),
        )?;

        Ok(Campaign {
            campaign_id,
            owner_id: owner_id.to_string(),
            amount_per_code: new_campaign.amount_per_code,
            code_count: new_campaign.code_count(),
            redeemed_count: 0,
            expiration: new_campaign.expiration,
            weekly_reserved: split.weekly,
            one_time_reserved: split.one_time,
            reclaimed_at: None,
        })
    })?;

    info!(
        campaign_id = campaign.campaign_id,
        owner_id,
        total,
        expiration = campaign.expiration,
        "Created campaign"
    );
    Ok(campaign)
}
}

backend_fn! {
/// Marks one of a campaign's codes as redeemed.
///
/// Redemption is monotonic: returns `true` if the code changed state and
/// `false` if it was already redeemed. Codes of a reclaimed campaign can no
/// longer be redeemed because their value has been returned to the owner.
///
/// # Errors
///
/// Returns `CampaignNotFound`, `CampaignReclaimed`, `NotFound` for an
/// unknown code, or a database error.
pub fn mark_code_redeemed(
    conn: &mut _,
    campaign_id: i64,
    code: &str,
) -> Result<bool, PersistenceError> {
    let redeemed: bool = conn.write_transaction(|conn| {
        let reclaimed_at: Option<i64> = campaigns::table
            .filter(campaigns::campaign_id.eq(campaign_id))
            .select(campaigns::reclaimed_at)
            .first::<Option<i64>>(conn)
            .optional()?
            .ok_or(PersistenceError::CampaignNotFound(campaign_id))?;
        if reclaimed_at.is_some() {
            return Err(PersistenceError::CampaignReclaimed(campaign_id));
        }

        let is_redeemed: i32 = redemption_codes::table
            .filter(redemption_codes::campaign_id.eq(campaign_id))
            .filter(redemption_codes::code.eq(code))
            .select(redemption_codes::is_redeemed)
            .first::<i32>(conn)
            .optional()?
            .ok_or_else(|| {
                PersistenceError::NotFound(format!("Code {code} in campaign {campaign_id}"))
            })?;
        if is_redeemed != 0 {
            return Ok(false);
        }

        // Re-checks the marker in the same statement so a reclamation
        // committed since the read above wins.
        let rows_affected: usize = diesel::update(redemption_codes::table)
            .filter(redemption_codes::campaign_id.eq(campaign_id))
            .filter(redemption_codes::code.eq(code))
            .filter(redemption_codes::is_redeemed.eq(0))
            .filter(
                redemption_codes::campaign_id.eq_any(
                    campaigns::table
                        .filter(campaigns::reclaimed_at.is_null())
                        .select(campaigns::campaign_id),
                ),
            )
            .set((
                redemption_codes::is_redeemed.eq(1),
                redemption_codes::redeemed_at.eq(Some(unix_now())),
            ))
            .execute(conn)?;

        Ok(rows_affected == 1)
    })?;

    debug!(campaign_id, code, redeemed, "Marked code redeemed");
    Ok(redeemed)
}
}

backend_fn! {
/// Returns a campaign's unredeemed value to its owner's weekly balance and
/// marks the campaign reclaimed.
///
/// Returns the amount credited. A missing campaign, one that was already
/// reclaimed, or one whose codes are all redeemed credits nothing and
/// returns zero. The marker is set even when the value is zero.
///
/// # Errors
///
/// Returns a database error, or `InvalidAmount` if the credit would overflow
/// the owner's weekly balance. Nothing is committed on error.
pub fn reclaim_campaign(conn: &mut _, campaign_id: i64) -> Result<u64, PersistenceError> {
    let reclaimed: u64 = conn.write_transaction(|conn| {
        let claimed: usize = diesel::update(campaigns::table)
            .filter(campaigns::campaign_id.eq(campaign_id))
            .filter(campaigns::reclaimed_at.is_null())
            .set(campaigns::reclaimed_at.eq(Some(unix_now())))
            .execute(conn)?;
        if claimed == 0 {
            debug!(campaign_id, "Campaign missing or already reclaimed");
            return Ok(0);
        }

        let row: CampaignRow = campaigns::table
            .filter(campaigns::campaign_id.eq(campaign_id))
            .select(CampaignRow::as_select())
            .first(conn)?;
        let redeemed_count: i64 = redemption_codes::table
            .filter(redemption_codes::campaign_id.eq(campaign_id))
            .filter(redemption_codes::is_redeemed.eq(1))
            .count()
            .get_result(conn)?;

        let value: u64 = row.unredeemed_value(redeemed_count)?;
        if value == 0 {
            return Ok(0);
        }
        let credit: i64 = amount_to_db(value)?;

        let (weekly, _): (i64, i64) = conn
            .lock_affiliate_balances(&row.owner_id)?
            .ok_or_else(|| PersistenceError::AffiliateNotFound(row.owner_id.clone()))?;
        let new_weekly: i64 = weekly.checked_add(credit).ok_or_else(|| {
            PersistenceError::InvalidAmount(String::from("reclamation overflows weekly balance"))
        })?;

        diesel::update(affiliates::table)
            .filter(affiliates::affiliate_id.eq(&row.owner_id))
            .set(affiliates::weekly_balance.eq(new_weekly))
            .execute(conn)?;

        conn.append_adjustment(
            &NewAdjustment::new(&row.owner_id, AdjustmentKind::Reclamation, credit, 0)
                .for_campaign(campaign_id),
        )?;

        Ok(value)
    })?;

    if reclaimed > 0 {
        info!(campaign_id, amount = reclaimed, "Reclaimed unredeemed campaign value");
    }
    Ok(reclaimed)
}
}
