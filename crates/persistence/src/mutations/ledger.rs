// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Balance ledger primitives.
//!
//! Each operation locks the affiliate's balances, applies its change and
//! appends a journal row inside one write transaction. A failure at any step
//! rolls the whole transaction back; no partial bucket update is committed.

use affiliate_budget_domain::{AdjustmentKind, ReservationSplit, split_reservation};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{NewAdjustment, amount_from_db, amount_to_db};
use crate::diesel_schema::affiliates;
use crate::error::PersistenceError;

backend_fn! {
/// Reserves `amount` from an affiliate's balances.
///
/// The one-time balance is consumed first and the remainder is taken from
/// the weekly balance. The returned split records exactly how much came from
/// each bucket so a later refund can restore them.
///
/// # Errors
///
/// Returns `PersistenceError::InsufficientBalance` if the two buckets
/// together cannot cover `amount`, `AffiliateNotFound` if the affiliate does
/// not exist, or a database error. Nothing is committed on error.
pub fn reserve_balance(
    conn: &mut _,
    affiliate_id: &str,
    amount: u64,
) -> Result<ReservationSplit, PersistenceError> {
    let split: ReservationSplit = conn.write_transaction(|conn| {
        let (weekly, one_time): (i64, i64) = conn
            .lock_affiliate_balances(affiliate_id)?
            .ok_or_else(|| PersistenceError::AffiliateNotFound(affiliate_id.to_string()))?;

        let split: ReservationSplit =
            split_reservation(amount, amount_from_db(weekly)?, amount_from_db(one_time)?)?;
        let weekly_deducted: i64 = amount_to_db(split.weekly)?;
        let one_time_deducted: i64 = amount_to_db(split.one_time)?;

        diesel::update(affiliates::table)
            .filter(affiliates::affiliate_id.eq(affiliate_id))
            .set((
                affiliates::weekly_balance.eq(weekly - weekly_deducted),
                affiliates::one_time_balance.eq(one_time - one_time_deducted),
            ))
            .execute(conn)?;

        conn.append_adjustment(&NewAdjustment::new(
            affiliate_id,
            AdjustmentKind::Reservation,
            -weekly_deducted,
            -one_time_deducted,
        ))?;

        Ok(split)
    })?;

    info!(
        affiliate_id,
        amount,
        weekly = split.weekly,
        one_time = split.one_time,
        "Reserved balance"
    );
    Ok(split)
}
}

backend_fn! {
/// Returns amounts to an affiliate's weekly and one-time buckets.
///
/// There is no upper-bound check and no deduplication: refunds are trusted
/// to mirror a prior reservation's split.
///
/// # Errors
///
/// Returns `AffiliateNotFound` if the affiliate does not exist,
/// `InvalidAmount` if a bucket would overflow, or a database error.
pub fn refund_balance(
    conn: &mut _,
    affiliate_id: &str,
    weekly_amount: u64,
    one_time_amount: u64,
) -> Result<(), PersistenceError> {
    let weekly_credit: i64 = amount_to_db(weekly_amount)?;
    let one_time_credit: i64 = amount_to_db(one_time_amount)?;

    conn.write_transaction(|conn| {
        let (weekly, one_time): (i64, i64) = conn
            .lock_affiliate_balances(affiliate_id)?
            .ok_or_else(|| PersistenceError::AffiliateNotFound(affiliate_id.to_string()))?;

        let new_weekly: i64 = weekly.checked_add(weekly_credit).ok_or_else(|| {
            PersistenceError::InvalidAmount(String::from("refund overflows weekly balance"))
        })?;
        let new_one_time: i64 = one_time.checked_add(one_time_credit).ok_or_else(|| {
            PersistenceError::InvalidAmount(String::from("refund overflows one-time balance"))
        })?;

        diesel::update(affiliates::table)
            .filter(affiliates::affiliate_id.eq(affiliate_id))
            .set((
                affiliates::weekly_balance.eq(new_weekly),
                affiliates::one_time_balance.eq(new_one_time),
            ))
            .execute(conn)?;

        conn.append_adjustment(&NewAdjustment::new(
            affiliate_id,
            AdjustmentKind::Refund,
            weekly_credit,
            one_time_credit,
        ))
    })?;

    info!(
        affiliate_id,
        weekly = weekly_amount,
        one_time = one_time_amount,
        "Refunded balance"
    );
    Ok(())
}
}

backend_fn! {
/// Overwrites an affiliate's weekly balance.
///
/// Used by the replenishment sweep. The journal records the difference
/// between the previous and the new balance, including a zero difference.
///
/// # Errors
///
/// Returns `AffiliateNotFound` if the affiliate does not exist, or a
/// database error.
pub fn set_weekly_balance(
    conn: &mut _,
    affiliate_id: &str,
    value: u64,
) -> Result<(), PersistenceError> {
    let new_weekly: i64 = amount_to_db(value)?;

    conn.write_transaction(|conn| {
        let (weekly, _): (i64, i64) = conn
            .lock_affiliate_balances(affiliate_id)?
            .ok_or_else(|| PersistenceError::AffiliateNotFound(affiliate_id.to_string()))?;

        diesel::update(affiliates::table)
            .filter(affiliates::affiliate_id.eq(affiliate_id))
            .set(affiliates::weekly_balance.eq(new_weekly))
            .execute(conn)?;

        conn.append_adjustment(&NewAdjustment::new(
            affiliate_id,
            AdjustmentKind::Replenishment,
            new_weekly - weekly,
            0,
        ))
    })?;

    debug!(affiliate_id, weekly_balance = value, "Set weekly balance");
    Ok(())
}
}

backend_fn! {
/// Adds `delta` to an affiliate's weekly balance.
///
/// # Errors
///
/// Returns `AffiliateNotFound` if the affiliate does not exist,
/// `InvalidAmount` if the balance would overflow, or a database error.
pub fn add_weekly_balance(
    conn: &mut _,
    affiliate_id: &str,
    delta: u64,
) -> Result<(), PersistenceError> {
    let credit: i64 = amount_to_db(delta)?;

    conn.write_transaction(|conn| {
        let (weekly, _): (i64, i64) = conn
            .lock_affiliate_balances(affiliate_id)?
            .ok_or_else(|| PersistenceError::AffiliateNotFound(affiliate_id.to_string()))?;

        let new_weekly: i64 = weekly.checked_add(credit).ok_or_else(|| {
            PersistenceError::InvalidAmount(String::from("credit overflows weekly balance"))
        })?;

        diesel::update(affiliates::table)
            .filter(affiliates::affiliate_id.eq(affiliate_id))
            .set(affiliates::weekly_balance.eq(new_weekly))
            .execute(conn)?;

        conn.append_adjustment(&NewAdjustment::new(
            affiliate_id,
            AdjustmentKind::WeeklyCredit,
            credit,
            0,
        ))
    })?;

    info!(affiliate_id, delta, "Added to weekly balance");
    Ok(())
}
}
