// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-agnostic mutation modules.
//!
//! Every balance mutation runs inside [`PersistenceBackend::write_transaction`]
//! and appends a journal row before it commits.
//!
//! ## Module Organization
//!
//! - `adjustments`: Balance journal inserts
//! - `affiliates`: Affiliate lifecycle and administrative top-ups
//! - `campaigns`: Campaign creation, code redemption and reclamation
//! - `ledger`: Reservation, refund and weekly balance primitives
//!
//! [`PersistenceBackend::write_transaction`]: crate::backend::PersistenceBackend::write_transaction

pub mod adjustments;
pub mod affiliates;
pub mod campaigns;
pub mod ledger;

pub use affiliates::{
    add_one_time_balance_mysql, add_one_time_balance_sqlite, create_affiliate_mysql,
    create_affiliate_sqlite, set_affiliate_status_mysql, set_affiliate_status_sqlite,
    set_weekly_allocation_mysql, set_weekly_allocation_sqlite,
};
pub use campaigns::{
    create_campaign_mysql, create_campaign_sqlite, mark_code_redeemed_mysql,
    mark_code_redeemed_sqlite, reclaim_campaign_mysql, reclaim_campaign_sqlite,
};
pub use ledger::{
    add_weekly_balance_mysql, add_weekly_balance_sqlite, refund_balance_mysql,
    refund_balance_sqlite, reserve_balance_mysql, reserve_balance_sqlite,
    set_weekly_balance_mysql, set_weekly_balance_sqlite,
};
