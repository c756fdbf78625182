// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Affiliate lifecycle mutations.

use affiliate_budget_domain::{
    AdjustmentKind, Affiliate, AffiliateStatus, validate_affiliate_id,
};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::{NewAdjustment, NewAffiliateRow, amount_to_db, unix_now};
use crate::diesel_schema::affiliates;
use crate::error::PersistenceError;

backend_fn! {
/// Creates a pending affiliate with empty balances.
///
/// # Errors
///
/// Returns `AffiliateExists` if the id is already registered, a validation
/// error for a blank id, or a database error.
pub fn create_affiliate(conn: &mut _, affiliate_id: &str) -> Result<Affiliate, PersistenceError> {
    validate_affiliate_id(affiliate_id)?;

    conn.write_transaction(|conn| {
        let existing: i64 = affiliates::table
            .filter(affiliates::affiliate_id.eq(affiliate_id))
            .count()
            .get_result(conn)?;
        if existing > 0 {
            return Err(PersistenceError::AffiliateExists(affiliate_id.to_string()));
        }

        diesel::insert_into(affiliates::table)
            .values(&NewAffiliateRow {
                affiliate_id,
                status: AffiliateStatus::Pending.as_str(),
                weekly_allocation: 0,
                weekly_balance: 0,
                one_time_balance: 0,
                created_at: unix_now(),
            })
            .execute(conn)?;
        Ok(())
    })?;

    info!(affiliate_id, "Created affiliate");

    Ok(Affiliate {
        affiliate_id: affiliate_id.to_string(),
        status: AffiliateStatus::Pending,
        weekly_allocation: 0,
        weekly_balance: 0,
        one_time_balance: 0,
    })
}
}

backend_fn! {
/// Sets an affiliate's approval status.
///
/// # Errors
///
/// Returns `AffiliateNotFound` if no row was updated, or a database error.
pub fn set_affiliate_status(
    conn: &mut _,
    affiliate_id: &str,
    status: AffiliateStatus,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(affiliates::table)
        .filter(affiliates::affiliate_id.eq(affiliate_id))
        .set(affiliates::status.eq(status.as_str()))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::AffiliateNotFound(affiliate_id.to_string()));
    }

    info!(affiliate_id, %status, "Updated affiliate status");
    Ok(())
}
}

backend_fn! {
/// Sets an affiliate's recurring weekly allocation.
///
/// The weekly balance is left untouched until the next replenishment sweep.
///
/// # Errors
///
/// Returns `AffiliateNotFound` if no row was updated, or a database error.
pub fn set_weekly_allocation(
    conn: &mut _,
    affiliate_id: &str,
    allocation: u64,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(affiliates::table)
        .filter(affiliates::affiliate_id.eq(affiliate_id))
        .set(affiliates::weekly_allocation.eq(amount_to_db(allocation)?))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::AffiliateNotFound(affiliate_id.to_string()));
    }

    info!(affiliate_id, allocation, "Updated weekly allocation");
    Ok(())
}
}

backend_fn! {
/// Credits an affiliate's one-time balance.
///
/// # Errors
///
/// Returns `AffiliateNotFound` if the affiliate does not exist,
/// `InvalidAmount` if the balance would overflow, or a database error.
pub fn add_one_time_balance(
    conn: &mut _,
    affiliate_id: &str,
    amount: u64,
) -> Result<(), PersistenceError> {
    let credit: i64 = amount_to_db(amount)?;

    conn.write_transaction(|conn| {
        let (_, one_time): (i64, i64) = conn
            .lock_affiliate_balances(affiliate_id)?
            .ok_or_else(|| PersistenceError::AffiliateNotFound(affiliate_id.to_string()))?;

        let new_one_time: i64 = one_time.checked_add(credit).ok_or_else(|| {
            PersistenceError::InvalidAmount(String::from("top-up overflows one-time balance"))
        })?;

        diesel::update(affiliates::table)
            .filter(affiliates::affiliate_id.eq(affiliate_id))
            .set(affiliates::one_time_balance.eq(new_one_time))
            .execute(conn)?;

        conn.append_adjustment(&NewAdjustment::new(
            affiliate_id,
            AdjustmentKind::OneTimeTopUp,
            0,
            credit,
        ))
    })?;

    info!(affiliate_id, amount, "Added one-time balance");
    Ok(())
}
}
