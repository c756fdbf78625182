// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The scheduler's view of the balance ledger and campaign registry.
//!
//! Store implementations are synchronous. Scheduler tasks reach them through
//! [`call_store`], which moves the call onto the blocking pool and bounds it
//! with a timeout so that a stalled database never wedges a timer task.

use crate::error::SchedulerError;
use affiliate_budget_domain::{ActiveCampaign, ReservationSplit, WeeklyConfig};
use affiliate_budget_persistence::{Persistence, PersistenceError};
use std::sync::Arc;
use std::time::Duration;

/// A store shared between the scheduler and the rest of the process.
pub type SharedStore<S> = Arc<tokio::sync::Mutex<S>>;

/// Ledger and registry operations consumed by the scheduler.
pub trait BudgetStore: Send + 'static {
    /// Reserves `amount`, one-time balance first.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientBalance` if the combined balance is too small.
    fn reserve_balance(
        &mut self,
        affiliate_id: &str,
        amount: u64,
    ) -> Result<ReservationSplit, PersistenceError>;

    /// Returns previously reserved amounts to their buckets.
    ///
    /// # Errors
    ///
    /// Returns an error if the affiliate is missing or the update fails.
    fn refund_balance(
        &mut self,
        affiliate_id: &str,
        weekly_amount: u64,
        one_time_amount: u64,
    ) -> Result<(), PersistenceError>;

    /// Overwrites the weekly balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the affiliate is missing or the update fails.
    fn set_weekly_balance(&mut self, affiliate_id: &str, value: u64)
    -> Result<(), PersistenceError>;

    /// Adds to the weekly balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the affiliate is missing or the update fails.
    fn add_weekly_balance(&mut self, affiliate_id: &str, delta: u64)
    -> Result<(), PersistenceError>;

    /// Lists approved affiliates and their weekly allocations.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn get_weekly_configs(&mut self) -> Result<Vec<WeeklyConfig>, PersistenceError>;

    /// Sums the unredeemed value of the affiliate's unreclaimed campaigns.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn allocated_balance_by_owner(&mut self, affiliate_id: &str) -> Result<u64, PersistenceError>;

    /// Lists unreclaimed campaigns that carry an expiration.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn get_active_campaigns(&mut self) -> Result<Vec<ActiveCampaign>, PersistenceError>;

    /// Value still locked against a campaign; zero when missing or reclaimed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn get_unredeemed_value(&mut self, campaign_id: i64) -> Result<u64, PersistenceError>;

    /// Credits a campaign's unredeemed value to its owner and marks it
    /// reclaimed. Returns the amount credited, zero on repeat calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails; nothing is committed.
    fn reclaim_campaign(&mut self, campaign_id: i64) -> Result<u64, PersistenceError>;
}

impl BudgetStore for Persistence {
    fn reserve_balance(
        &mut self,
        affiliate_id: &str,
        amount: u64,
    ) -> Result<ReservationSplit, PersistenceError> {
        Self::reserve_balance(self, affiliate_id, amount)
    }

    fn refund_balance(
        &mut self,
        affiliate_id: &str,
        weekly_amount: u64,
        one_time_amount: u64,
    ) -> Result<(), PersistenceError> {
        Self::refund_balance(self, affiliate_id, weekly_amount, one_time_amount)
    }

    fn set_weekly_balance(
        &mut self,
        affiliate_id: &str,
        value: u64,
    ) -> Result<(), PersistenceError> {
        Self::set_weekly_balance(self, affiliate_id, value)
    }

    fn add_weekly_balance(
        &mut self,
        affiliate_id: &str,
        delta: u64,
    ) -> Result<(), PersistenceError> {
        Self::add_weekly_balance(self, affiliate_id, delta)
    }

    fn get_weekly_configs(&mut self) -> Result<Vec<WeeklyConfig>, PersistenceError> {
        Self::get_weekly_configs(self)
    }

    fn allocated_balance_by_owner(&mut self, affiliate_id: &str) -> Result<u64, PersistenceError> {
        Self::allocated_balance_by_owner(self, affiliate_id)
    }

    fn get_active_campaigns(&mut self) -> Result<Vec<ActiveCampaign>, PersistenceError> {
        Self::get_active_campaigns(self)
    }

    fn get_unredeemed_value(&mut self, campaign_id: i64) -> Result<u64, PersistenceError> {
        Self::get_unredeemed_value(self, campaign_id)
    }

    fn reclaim_campaign(&mut self, campaign_id: i64) -> Result<u64, PersistenceError> {
        Self::reclaim_campaign(self, campaign_id)
    }
}

/// Runs `call` against the store on the blocking pool, bounded by `timeout`.
///
/// A call that times out is abandoned, not cancelled: the blocking task keeps
/// the store lock until its transaction commits or rolls back.
pub(crate) async fn call_store<S, T, F>(
    store: &SharedStore<S>,
    timeout: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, SchedulerError>
where
    S: BudgetStore,
    T: Send + 'static,
    F: FnOnce(&mut S) -> Result<T, PersistenceError> + Send + 'static,
{
    let store: SharedStore<S> = Arc::clone(store);
    let task = tokio::task::spawn_blocking(move || {
        let mut guard = store.blocking_lock();
        call(&mut *guard)
    });

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result.map_err(SchedulerError::from),
        Ok(Err(join_err)) => Err(SchedulerError::Join {
            operation,
            reason: join_err.to_string(),
        }),
        Err(_) => Err(SchedulerError::Timeout { operation, timeout }),
    }
}
