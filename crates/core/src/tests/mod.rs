// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use crate::{SchedulerConfig, SharedStore};
use affiliate_budget_domain::{AffiliateStatus, Campaign, NewCampaign};
use affiliate_budget_persistence::Persistence;
use std::sync::Arc;
use std::time::Duration;

pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn new_store() -> SharedStore<Persistence> {
    Arc::new(tokio::sync::Mutex::new(
        Persistence::new_in_memory().expect("in-memory database"),
    ))
}

pub fn test_config() -> SchedulerConfig {
    SchedulerConfig {
        store_timeout: Duration::from_secs(2),
        ..SchedulerConfig::default()
    }
}

/// Creates an approved affiliate with the given allocation and balances.
pub fn create_approved_affiliate(
    persistence: &mut Persistence,
    affiliate_id: &str,
    weekly_allocation: u64,
    weekly_balance: u64,
    one_time_balance: u64,
) {
    persistence.create_affiliate(affiliate_id).unwrap();
    persistence
        .set_affiliate_status(affiliate_id, AffiliateStatus::Approved)
        .unwrap();
    persistence
        .set_weekly_allocation(affiliate_id, weekly_allocation)
        .unwrap();
    persistence
        .set_weekly_balance(affiliate_id, weekly_balance)
        .unwrap();
    if one_time_balance > 0 {
        persistence
            .add_one_time_balance(affiliate_id, one_time_balance)
            .unwrap();
    }
}

/// Creates a campaign with `count` codes prefixed by `prefix`.
pub fn create_campaign(
    persistence: &mut Persistence,
    owner_id: &str,
    prefix: &str,
    amount_per_code: u64,
    count: usize,
    expiration: i64,
) -> Campaign {
    persistence
        .create_campaign(&NewCampaign {
            owner_id: owner_id.to_string(),
            amount_per_code,
            expiration,
            codes: (0..count).map(|i| format!("{prefix}-{i}")).collect(),
        })
        .unwrap()
}

pub async fn weekly_balance(store: &SharedStore<Persistence>, affiliate_id: &str) -> u64 {
    store
        .lock()
        .await
        .get_affiliate(affiliate_id)
        .unwrap()
        .expect("affiliate exists")
        .weekly_balance
}

pub async fn is_reclaimed(store: &SharedStore<Persistence>, campaign_id: i64) -> bool {
    store
        .lock()
        .await
        .get_campaign(campaign_id)
        .unwrap()
        .expect("campaign exists")
        .is_reclaimed()
}
