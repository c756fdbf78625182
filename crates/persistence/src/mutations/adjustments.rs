// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use crate::data_models::NewAdjustment;
use crate::diesel_schema::balance_adjustments;
use crate::error::PersistenceError;

backend_fn! {
/// Appends one row to the balance journal.
///
/// Callers reach this through `PersistenceBackend::append_adjustment` so that
/// it runs on the same connection and transaction as the balance update.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_adjustment(
    conn: &mut _,
    adjustment: &NewAdjustment<'_>,
) -> Result<(), PersistenceError> {
    diesel::insert_into(balance_adjustments::table)
        .values(adjustment)
        .execute(conn)?;

    debug!(
        affiliate_id = adjustment.affiliate_id,
        kind = adjustment.kind,
        weekly_delta = adjustment.weekly_delta,
        one_time_delta = adjustment.one_time_delta,
        "Recorded balance adjustment"
    );
    Ok(())
}
}
