// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Weekly budget replenishment.
//!
//! Every Monday at local midnight in the reference zone, each approved
//! affiliate's weekly balance is reset to its allocation minus the value
//! still locked in its unreclaimed campaigns, floored at zero.

use crate::error::SchedulerError;
use crate::store::{BudgetStore, SharedStore, call_store};
use affiliate_budget_domain::{
    ReferenceZone, WeeklyConfig, duration_until, replenished_weekly_balance,
};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Outcome of one replenishment sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplenishmentSummary {
    /// Affiliates whose weekly balance was recomputed.
    pub updated: usize,
    /// Affiliates skipped because a store call failed.
    pub failed: usize,
}

/// Recomputes the weekly balance of every approved affiliate.
///
/// Affiliates are processed independently; a failure is logged and counted
/// and the sweep moves on.
///
/// # Errors
///
/// Returns an error only if the list of approved affiliates cannot be read.
pub async fn recompute_weekly_balances<S: BudgetStore>(
    store: &SharedStore<S>,
    store_timeout: Duration,
) -> Result<ReplenishmentSummary, SchedulerError> {
    let configs: Vec<WeeklyConfig> = call_store(
        store,
        store_timeout,
        "get_weekly_configs",
        |store: &mut S| store.get_weekly_configs(),
    )
    .await?;

    let mut summary = ReplenishmentSummary::default();
    for config in configs {
        let affiliate_id: String = config.affiliate_id.clone();
        let allocation: u64 = config.weekly_allocation;

        let result = call_store(store, store_timeout, "replenish_affiliate", move |store: &mut S| {
            let allocated: u64 = store.allocated_balance_by_owner(&config.affiliate_id)?;
            let balance: u64 = replenished_weekly_balance(allocation, allocated);
            store.set_weekly_balance(&config.affiliate_id, balance)?;
            Ok((allocated, balance))
        })
        .await;

        match result {
            Ok((allocated, balance)) => {
                summary.updated += 1;
                debug!(
                    affiliate_id = %affiliate_id,
                    weekly_allocation = allocation,
                    allocated,
                    weekly_balance = balance,
                    "Replenished weekly balance"
                );
            }
            Err(err) => {
                summary.failed += 1;
                warn!(
                    affiliate_id = %affiliate_id,
                    error = %err,
                    "Failed to replenish weekly balance"
                );
            }
        }
    }

    info!(
        updated = summary.updated,
        failed = summary.failed,
        "Weekly replenishment sweep finished"
    );
    Ok(summary)
}

/// Runs replenishment at every weekly anchor until `shutdown` changes or
/// its sender is dropped.
pub async fn run_weekly_cycle<S: BudgetStore>(
    store: SharedStore<S>,
    store_timeout: Duration,
    zone: ReferenceZone,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let now: DateTime<Utc> = Utc::now();
        let anchor: DateTime<Utc> = match zone.next_weekly_anchor(now) {
            Ok(anchor) => anchor,
            Err(err) => {
                error!(zone = %zone, error = %err, "Cannot compute next weekly anchor, stopping");
                return;
            }
        };
        let wait: Duration = duration_until(anchor, now);
        info!(
            zone = %zone,
            anchor = %anchor,
            wait_secs = wait.as_secs(),
            "Next weekly replenishment scheduled"
        );

        tokio::select! {
            () = tokio::time::sleep(wait) => {}
            _ = shutdown.changed() => {
                info!("Weekly replenishment cycle stopping");
                return;
            }
        }

        if let Err(err) = recompute_weekly_balances(&store, store_timeout).await {
            error!(error = %err, "Weekly replenishment sweep failed");
        }
    }
}
