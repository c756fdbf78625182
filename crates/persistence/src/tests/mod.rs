// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod campaign_tests;
mod ledger_tests;

use crate::Persistence;
use affiliate_budget_domain::{AffiliateStatus, Campaign, NewCampaign};

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

/// Builds a campaign request with `count` codes prefixed by `prefix`.
pub fn new_campaign(
    owner_id: &str,
    prefix: &str,
    amount_per_code: u64,
    count: usize,
    expiration: i64,
) -> NewCampaign {
    NewCampaign {
        owner_id: owner_id.to_string(),
        amount_per_code,
        expiration,
        codes: (0..count).map(|i| format!("{prefix}-{i}")).collect(),
    }
}

/// Creates a campaign and returns it.
pub fn create_test_campaign(
    persistence: &mut Persistence,
    owner_id: &str,
    prefix: &str,
    amount_per_code: u64,
    count: usize,
    expiration: i64,
) -> Campaign {
    persistence
        .create_campaign(&new_campaign(
            owner_id,
            prefix,
            amount_per_code,
            count,
            expiration,
        ))
        .unwrap()
}

/// Outcome of racing one reservation per connection.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RaceOutcome {
    pub reserved: usize,
    pub refused: usize,
}

/// Reserves `amount` for `affiliate_id` once on each connection, all threads
/// released together. Any error other than `InsufficientBalance` fails the test.
pub fn reserve_concurrently(
    connections: Vec<Persistence>,
    affiliate_id: &str,
    amount: u64,
) -> RaceOutcome {
    let barrier = std::sync::Arc::new(std::sync::Barrier::new(connections.len()));

    let handles: Vec<_> = connections
        .into_iter()
        .map(|mut persistence| {
            let barrier = std::sync::Arc::clone(&barrier);
            let affiliate_id = affiliate_id.to_string();
            std::thread::spawn(move || {
                barrier.wait();
                persistence.reserve_balance(&affiliate_id, amount)
            })
        })
        .collect();

    let mut outcome = RaceOutcome::default();
    for handle in handles {
        match handle.join().unwrap() {
            Ok(_) => outcome.reserved += 1,
            Err(crate::PersistenceError::InsufficientBalance { .. }) => outcome.refused += 1,
            Err(other) => panic!("unexpected reservation error: {other}"),
        }
    }
    outcome
}
