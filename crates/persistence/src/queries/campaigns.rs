// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Campaign registry queries.
//!
//! A campaign is live until it is reclaimed. Expired campaigns whose timer
//! has not yet run still count toward their owner's allocated total, so the
//! replenishment sweep never hands out value that reclamation will credit
//! again.

use std::collections::HashMap;

use affiliate_budget_domain::{ActiveCampaign, Campaign};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use crate::data_models::CampaignRow;
use crate::diesel_schema::{campaigns, redemption_codes};
use crate::error::PersistenceError;

backend_fn! {
/// Retrieves a campaign together with its redeemed code count.
///
/// # Errors
///
/// Returns an error if the database query fails. Returns `Ok(None)` if the
/// campaign is not found.
pub fn get_campaign(conn: &mut _, campaign_id: i64) -> Result<Option<Campaign>, PersistenceError> {
    let Some(row) = campaigns::table
        .filter(campaigns::campaign_id.eq(campaign_id))
        .select(CampaignRow::as_select())
        .first::<CampaignRow>(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let redeemed_count: i64 = redemption_codes::table
        .filter(redemption_codes::campaign_id.eq(campaign_id))
        .filter(redemption_codes::is_redeemed.eq(1))
        .count()
        .get_result(conn)?;

    row.into_campaign(redeemed_count).map(Some)
}
}

backend_fn! {
/// Lists campaigns that expire and have not been reclaimed, soonest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_active_campaigns(conn: &mut _) -> Result<Vec<ActiveCampaign>, PersistenceError> {
    let rows: Vec<(i64, String, i64)> = campaigns::table
        .filter(campaigns::expiration.gt(0_i64))
        .filter(campaigns::reclaimed_at.is_null())
        .order((campaigns::expiration.asc(), campaigns::campaign_id.asc()))
        .select((
            campaigns::campaign_id,
            campaigns::owner_id,
            campaigns::expiration,
        ))
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("get_active_campaigns: {e}")))?;

    debug!(count = rows.len(), "Loaded active campaigns");

    Ok(rows
        .into_iter()
        .map(|(campaign_id, owner_id, expiration)| ActiveCampaign {
            campaign_id,
            owner_id,
            expiration,
        })
        .collect())
}
}

backend_fn! {
/// Computes the value still locked against a campaign.
///
/// Returns zero, not an error, when the campaign does not exist, is fully
/// redeemed, or has already been reclaimed.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_unredeemed_value(conn: &mut _, campaign_id: i64) -> Result<u64, PersistenceError> {
    let Some(row) = campaigns::table
        .filter(campaigns::campaign_id.eq(campaign_id))
        .filter(campaigns::reclaimed_at.is_null())
        .select(CampaignRow::as_select())
        .first::<CampaignRow>(conn)
        .optional()?
    else {
        return Ok(0);
    };

    let redeemed_count: i64 = redemption_codes::table
        .filter(redemption_codes::campaign_id.eq(campaign_id))
        .filter(redemption_codes::is_redeemed.eq(1))
        .count()
        .get_result(conn)?;

    row.unredeemed_value(redeemed_count)
}
}

backend_fn! {
/// Sums the unredeemed value of an owner's live campaigns.
///
/// A campaign is live until it is reclaimed, whether or not it has an
/// expiration.
///
/// # Errors
///
/// Returns an error if the database query fails or the total overflows.
pub fn allocated_balance_by_owner(
    conn: &mut _,
    affiliate_id: &str,
) -> Result<u64, PersistenceError> {
    let rows: Vec<CampaignRow> = campaigns::table
        .filter(campaigns::owner_id.eq(affiliate_id))
        .filter(campaigns::reclaimed_at.is_null())
        .select(CampaignRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("allocated_balance_by_owner: {e}")))?;
    if rows.is_empty() {
        return Ok(0);
    }

    let redeemed_campaigns: Vec<i64> = redemption_codes::table
        .inner_join(campaigns::table)
        .filter(campaigns::owner_id.eq(affiliate_id))
        .filter(campaigns::reclaimed_at.is_null())
        .filter(redemption_codes::is_redeemed.eq(1))
        .select(redemption_codes::campaign_id)
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("allocated_balance_by_owner: {e}")))?;

    let mut redeemed: HashMap<i64, i64> = HashMap::new();
    for campaign_id in redeemed_campaigns {
        *redeemed.entry(campaign_id).or_insert(0) += 1;
    }

    rows.iter().try_fold(0_u64, |total, row| {
        let value: u64 = row.unredeemed_value(redeemed.get(&row.campaign_id).copied().unwrap_or(0))?;
        total.checked_add(value).ok_or_else(|| {
            PersistenceError::InvalidAmount(format!("allocated total for {affiliate_id} overflows"))
        })
    })
}
}
