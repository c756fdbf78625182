// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `affiliates`: Affiliate lookups, weekly configs and the balance journal
//! - `campaigns`: Campaign lookups, active campaigns and reserved value
//!
//! All query functions are generated in backend-specific monomorphic versions
//! (`_sqlite` and `_mysql`). The `Persistence` adapter in `lib.rs` dispatches
//! to the appropriate version based on the active backend connection.

pub mod affiliates;
pub mod campaigns;

pub use affiliates::{
    get_affiliate_mysql, get_affiliate_sqlite, get_weekly_configs_mysql,
    get_weekly_configs_sqlite, list_balance_adjustments_mysql, list_balance_adjustments_sqlite,
};
pub use campaigns::{
    allocated_balance_by_owner_mysql, allocated_balance_by_owner_sqlite,
    get_active_campaigns_mysql, get_active_campaigns_sqlite, get_campaign_mysql,
    get_campaign_sqlite, get_unredeemed_value_mysql, get_unredeemed_value_sqlite,
};
