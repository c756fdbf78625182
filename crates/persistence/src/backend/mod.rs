// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Database backend-specific code.
//!
//! This module isolates backend-specific initialization, migration,
//! locking and helper functions that cannot be expressed in backend-agnostic
//! Diesel DSL.
//!
//! ## Backend Support
//!
//! - `sqlite`: `SQLite` backend (default for development and testing)
//! - `mysql`: MySQL/MariaDB backend (validated via opt-in tests)
//!
//! ## Row Locking
//!
//! Balance mutations must serialize per affiliate. `MySQL` takes a row lock
//! with `SELECT ... FOR UPDATE` inside an ordinary transaction. `SQLite` has
//! no row locks; write transactions are opened with `BEGIN IMMEDIATE`, which
//! takes the database write lock before the balance is read.

pub mod mysql;
pub mod sqlite;

use diesel::{Connection, MysqlConnection, SqliteConnection};

use crate::data_models::NewAdjustment;
use crate::error::PersistenceError;
use crate::mutations::adjustments::{insert_adjustment_mysql, insert_adjustment_sqlite};

/// Trait for backend-specific operations.
///
/// This trait is implemented for both `SqliteConnection` and `MysqlConnection`
/// so that mutation bodies generated by `backend_fn!` can call one method name
/// regardless of which connection type they were expanded for.
pub trait PersistenceBackend: Connection {
    /// Retrieves the last inserted row ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError>;

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError>;

    /// Runs `f` inside a transaction that holds the write lock from its
    /// first statement.
    ///
    /// The transaction commits if `f` returns `Ok` and rolls back otherwise.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`, or a database error if the
    /// transaction cannot be opened or committed.
    fn write_transaction<T, F>(&mut self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut Self) -> Result<T, PersistenceError>;

    /// Reads `(weekly_balance, one_time_balance)` for an affiliate, locking
    /// the row until the surrounding transaction ends.
    ///
    /// Must be called inside [`PersistenceBackend::write_transaction`].
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails. A missing affiliate is `Ok(None)`.
    fn lock_affiliate_balances(
        &mut self,
        affiliate_id: &str,
    ) -> Result<Option<(i64, i64)>, PersistenceError>;

    /// Appends a balance journal entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    fn append_adjustment(&mut self, adjustment: &NewAdjustment<'_>)
    -> Result<(), PersistenceError>;
}

impl PersistenceBackend for SqliteConnection {
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError> {
        sqlite::get_last_insert_rowid(self)
    }

    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        sqlite::verify_foreign_key_enforcement(self)
    }

    fn write_transaction<T, F>(&mut self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut Self) -> Result<T, PersistenceError>,
    {
        self.immediate_transaction(f)
    }

    fn lock_affiliate_balances(
        &mut self,
        affiliate_id: &str,
    ) -> Result<Option<(i64, i64)>, PersistenceError> {
        sqlite::lock_affiliate_balances(self, affiliate_id)
    }

    fn append_adjustment(
        &mut self,
        adjustment: &NewAdjustment<'_>,
    ) -> Result<(), PersistenceError> {
        insert_adjustment_sqlite(self, adjustment)
    }
}

impl PersistenceBackend for MysqlConnection {
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError> {
        mysql::get_last_insert_rowid(self)
    }

    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        mysql::verify_foreign_key_enforcement(self)
    }

    fn write_transaction<T, F>(&mut self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut Self) -> Result<T, PersistenceError>,
    {
        self.transaction(f)
    }

    fn lock_affiliate_balances(
        &mut self,
        affiliate_id: &str,
    ) -> Result<Option<(i64, i64)>, PersistenceError> {
        mysql::lock_affiliate_balances(self, affiliate_id)
    }

    fn append_adjustment(
        &mut self,
        adjustment: &NewAdjustment<'_>,
    ) -> Result<(), PersistenceError> {
        insert_adjustment_mysql(self, adjustment)
    }
}
