// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Campaign expiration and weekly replenishment for affiliate budgets.
//!
//! [`Scheduler`] owns two kinds of background work:
//!
//! - one timer task per expiring campaign, which returns the campaign's
//!   unredeemed value to its owner's weekly balance when it fires
//! - one replenishment loop, which resets every approved affiliate's weekly
//!   balance at Monday midnight in the reference timezone
//!
//! All durable state lives in the [`BudgetStore`]. Timers are rebuilt from
//! the store by [`Scheduler::start`], so pending timers are simply dropped
//! on shutdown.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod config;
mod error;
mod expiration;
mod replenishment;
mod store;

#[cfg(test)]
mod tests;

pub use config::{DEFAULT_STORE_TIMEOUT, SchedulerConfig};
pub use error::SchedulerError;
pub use expiration::ExpirationScheduler;
pub use replenishment::{ReplenishmentSummary, recompute_weekly_balances, run_weekly_cycle};
pub use store::{BudgetStore, SharedStore};

use affiliate_budget_domain::{ReferenceZone, ReservationSplit};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// The expiration scheduler and weekly replenishment cycle, sharing one store.
pub struct Scheduler<S> {
    store: SharedStore<S>,
    config: SchedulerConfig,
    zone: ReferenceZone,
    expirations: ExpirationScheduler<S>,
    shutdown_tx: watch::Sender<bool>,
    weekly_task: Mutex<Option<JoinHandle<()>>>,
    started: Mutex<bool>,
}

impl<S: BudgetStore> Scheduler<S> {
    /// Creates a scheduler over `store`. Nothing runs until [`Self::start`].
    ///
    /// # Errors
    ///
    /// Returns an error if neither the reference timezone nor the fallback
    /// offset can be resolved.
    pub fn new(store: SharedStore<S>, config: SchedulerConfig) -> Result<Self, SchedulerError> {
        let zone: ReferenceZone = config.reference_zone()?;
        let expirations = ExpirationScheduler::new(Arc::clone(&store), config.store_timeout);
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            store,
            config,
            zone,
            expirations,
            shutdown_tx,
            weekly_task: Mutex::new(None),
            started: Mutex::new(false),
        })
    }

    /// Runs one replenishment sweep, re-arms timers for every active
    /// campaign and spawns the weekly cycle.
    ///
    /// Failures in the initial sweep or the re-arm are logged; the scheduler
    /// still starts.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyStarted` on a second call.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        {
            let mut started = self.started.lock().unwrap_or_else(PoisonError::into_inner);
            if *started {
                return Err(SchedulerError::AlreadyStarted);
            }
            *started = true;
        }

        info!(zone = %self.zone, "Starting budget scheduler");

        match self.recompute_weekly_balances().await {
            Ok(summary) if summary.failed > 0 => warn!(
                updated = summary.updated,
                failed = summary.failed,
                "Startup replenishment completed with failures"
            ),
            Ok(_) => {}
            Err(err) => error!(error = %err, "Startup replenishment failed"),
        }

        if let Err(err) = self.expirations.schedule_existing_expirations().await {
            error!(error = %err, "Failed to re-arm existing campaign expirations");
        }

        let handle: JoinHandle<()> = tokio::spawn(run_weekly_cycle(
            Arc::clone(&self.store),
            self.config.store_timeout,
            self.zone,
            self.shutdown_tx.subscribe(),
        ));
        *self
            .weekly_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);

        Ok(())
    }

    /// Arms (or re-arms) the expiration timer for a campaign.
    ///
    /// See [`ExpirationScheduler::schedule_expiration`]. Returns `false`
    /// without arming anything once [`Self::shutdown`] has been called.
    pub fn schedule_expiration(&self, campaign_id: i64, owner_id: &str, expiration: i64) -> bool {
        if *self.shutdown_tx.borrow() {
            warn!(campaign_id, owner_id, "Scheduler is shut down, not scheduling expiration");
            return false;
        }
        self.expirations
            .schedule_expiration(campaign_id, owner_id, expiration)
    }

    /// Stops a pending expiration timer.
    pub fn cancel_expiration(&self, campaign_id: i64) -> bool {
        self.expirations.cancel_expiration(campaign_id)
    }

    /// Whether an expiration timer is pending for `campaign_id`.
    #[must_use]
    pub fn is_expiration_scheduled(&self, campaign_id: i64) -> bool {
        self.expirations.is_scheduled(campaign_id)
    }

    #[must_use]
    pub fn pending_expirations(&self) -> usize {
        self.expirations.pending_count()
    }

    /// Runs a replenishment sweep now.
    ///
    /// # Errors
    ///
    /// Returns an error if the approved affiliates cannot be listed.
    pub async fn recompute_weekly_balances(&self) -> Result<ReplenishmentSummary, SchedulerError> {
        recompute_weekly_balances(&self.store, self.config.store_timeout).await
    }

    /// Reserves `amount` from an affiliate through the shared store.
    ///
    /// # Errors
    ///
    /// Returns an error if the balance is insufficient, the store fails, or
    /// the call times out.
    pub async fn reserve_balance(
        &self,
        affiliate_id: &str,
        amount: u64,
    ) -> Result<ReservationSplit, SchedulerError> {
        let affiliate_id: String = affiliate_id.to_string();
        store::call_store(
            &self.store,
            self.config.store_timeout,
            "reserve_balance",
            move |store: &mut S| store.reserve_balance(&affiliate_id, amount),
        )
        .await
    }

    /// Returns a reservation split to its buckets through the shared store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the call times out.
    pub async fn refund_balance(
        &self,
        affiliate_id: &str,
        split: ReservationSplit,
    ) -> Result<(), SchedulerError> {
        let affiliate_id: String = affiliate_id.to_string();
        store::call_store(
            &self.store,
            self.config.store_timeout,
            "refund_balance",
            move |store: &mut S| store.refund_balance(&affiliate_id, split.weekly, split.one_time),
        )
        .await
    }

    /// The instant of the next weekly replenishment.
    ///
    /// # Errors
    ///
    /// Returns an error if date arithmetic overflows.
    pub fn next_replenishment(&self) -> Result<DateTime<Utc>, SchedulerError> {
        Ok(self.zone.next_weekly_anchor(Utc::now())?)
    }

    /// The store shared with this scheduler.
    #[must_use]
    pub fn store(&self) -> SharedStore<S> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub const fn reference_zone(&self) -> ReferenceZone {
        self.zone
    }

    /// Stops the weekly cycle and every pending timer.
    ///
    /// Reclamations already in progress finish on their own.
    pub async fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);

        let handle: Option<JoinHandle<()>> = self
            .weekly_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            match handle.await {
                Ok(()) => debug!("Weekly replenishment task joined"),
                Err(err) => error!(error = %err, "Weekly replenishment task ended abnormally"),
            }
        }

        let stopped: usize = self.expirations.abort_all();
        info!(stopped_timers = stopped, "Budget scheduler stopped");
    }
}
