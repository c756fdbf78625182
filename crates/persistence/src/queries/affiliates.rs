// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Affiliate queries.

use affiliate_budget_domain::{Affiliate, AffiliateStatus, BalanceAdjustment, WeeklyConfig};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use crate::data_models::{AffiliateRow, BalanceAdjustmentRow, amount_from_db};
use crate::diesel_schema::{affiliates, balance_adjustments};
use crate::error::PersistenceError;

backend_fn! {
/// Retrieves an affiliate by id.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored value is
/// malformed. Returns `Ok(None)` if the affiliate is not found.
pub fn get_affiliate(
    conn: &mut _,
    affiliate_id: &str,
) -> Result<Option<Affiliate>, PersistenceError> {
    let row: Option<AffiliateRow> = affiliates::table
        .filter(affiliates::affiliate_id.eq(affiliate_id))
        .select(AffiliateRow::as_select())
        .first(conn)
        .optional()?;

    row.map(AffiliateRow::into_affiliate).transpose()
}
}

backend_fn! {
/// Lists the weekly allocation of every approved affiliate, ordered by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_weekly_configs(conn: &mut _) -> Result<Vec<WeeklyConfig>, PersistenceError> {
    let rows: Vec<(String, i64)> = affiliates::table
        .filter(affiliates::status.eq(AffiliateStatus::Approved.as_str()))
        .order(affiliates::affiliate_id.asc())
        .select((affiliates::affiliate_id, affiliates::weekly_allocation))
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("get_weekly_configs: {e}")))?;

    debug!(count = rows.len(), "Loaded weekly configs");

    rows.into_iter()
        .map(|(affiliate_id, weekly_allocation)| {
            Ok(WeeklyConfig {
                affiliate_id,
                weekly_allocation: amount_from_db(weekly_allocation)?,
            })
        })
        .collect()
}
}

backend_fn! {
/// Lists an affiliate's balance journal in the order it was written.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_balance_adjustments(
    conn: &mut _,
    affiliate_id: &str,
) -> Result<Vec<BalanceAdjustment>, PersistenceError> {
    balance_adjustments::table
        .filter(balance_adjustments::affiliate_id.eq(affiliate_id))
        .order(balance_adjustments::adjustment_id.asc())
        .select(BalanceAdjustmentRow::as_select())
        .load::<BalanceAdjustmentRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_balance_adjustments: {e}")))?
        .into_iter()
        .map(BalanceAdjustmentRow::into_adjustment)
        .collect()
}
}
