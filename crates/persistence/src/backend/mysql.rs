// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! MySQL/MariaDB-specific persistence utilities.
//!
//! `SQLite` remains the default backend for all standard tests. The `MySQL`
//! path is validated by `#[ignore]`d tests run through
//! `cargo xtask test-mariadb`, which provisions a `MariaDB` container and sets
//! `DATABASE_URL` and `AFFILIATE_BUDGET_TEST_BACKEND`.
//!
//! ## Schema Parity
//!
//! `MYSQL_MIGRATIONS` embeds `migrations_mysql/`, which must stay
//! schema-equivalent to the `SQLite` migrations in `migrations/`: same
//! tables, columns, nullability, uniqueness, checks, foreign keys and
//! indexes. Change both directories together.

use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer};
use diesel::{Connection, MysqlConnection, QueryableByName, RunQueryDsl};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::diesel_schema::affiliates;
use crate::error::PersistenceError;

/// Result type for foreign key check query.
#[derive(QueryableByName)]
struct ForeignKeyCheck {
    #[diesel(sql_type = Integer)]
    fk_checks: i32,
}

/// `MySQL`-specific migrations.
pub const MYSQL_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations_mysql");

/// Helper function to get the last inserted row ID.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_last_insert_rowid(conn: &mut MysqlConnection) -> Result<i64, PersistenceError> {
    Ok(diesel::select(sql::<BigInt>("LAST_INSERT_ID()")).get_result(conn)?)
}

/// Reads an affiliate's spendable balances with `SELECT ... FOR UPDATE`.
///
/// The row lock is held until the surrounding transaction commits or
/// rolls back, so concurrent reservations for one affiliate serialize.
///
/// # Errors
///
/// Returns an error if the query fails or the lock wait times out.
pub fn lock_affiliate_balances(
    conn: &mut MysqlConnection,
    affiliate_id: &str,
) -> Result<Option<(i64, i64)>, PersistenceError> {
    Ok(affiliates::table
        .filter(affiliates::affiliate_id.eq(affiliate_id))
        .select((affiliates::weekly_balance, affiliates::one_time_balance))
        .for_update()
        .first::<(i64, i64)>(conn)
        .optional()?)
}

/// Initialize a `MySQL` database at the given URL and run migrations.
///
/// # Errors
///
/// Returns an error if connection or migration fails.
pub fn initialize_database(database_url: &str) -> Result<MysqlConnection, PersistenceError> {
    info!("Initializing MySQL database");

    let mut conn: MysqlConnection = MysqlConnection::establish(database_url)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;

    run_migrations(&mut conn).map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;

    Ok(conn)
}

/// Run pending migrations on the provided `MySQL` connection.
///
/// # Errors
///
/// Returns an error if migration execution fails.
pub fn run_migrations(
    conn: &mut MysqlConnection,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Running MySQL database migrations");
    conn.run_pending_migrations(MYSQL_MIGRATIONS)?;
    Ok(())
}

/// Verify that foreign key enforcement is enabled on `MySQL`.
///
/// # Errors
///
/// Returns an error if verification fails.
pub fn verify_foreign_key_enforcement(conn: &mut MysqlConnection) -> Result<(), PersistenceError> {
    let result: Result<ForeignKeyCheck, _> =
        diesel::sql_query("SELECT @@foreign_key_checks AS fk_checks").get_result(conn);

    match result {
        Ok(check) if check.fk_checks == 1 => {
            info!("MySQL foreign key enforcement is enabled");
            Ok(())
        }
        Ok(_) => Err(PersistenceError::ForeignKeyEnforcementNotEnabled),
        Err(e) => Err(PersistenceError::QueryFailed(format!(
            "Failed to verify foreign key enforcement: {e}"
        ))),
    }
}
