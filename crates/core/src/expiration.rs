// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-campaign expiration timers.
//!
//! Each campaign with a non-zero expiration gets one Tokio task that sleeps
//! until the expiration instant and then reclaims the campaign's unredeemed
//! value. The timer map is the only shared in-memory state.
//!
//! ## Invariants
//!
//! - At most one live timer per campaign id
//! - Re-scheduling a campaign stops the previous timer before arming the new one
//! - A timer removes its own map entry before touching the store, and only
//!   if the entry still belongs to it
//! - Store calls never run while the map lock is held

use crate::error::SchedulerError;
use crate::store::{BudgetStore, SharedStore, call_store};
use affiliate_budget_domain::ActiveCampaign;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

type TimerMap = Arc<Mutex<HashMap<i64, TimerEntry>>>;

struct TimerEntry {
    generation: u64,
    handle: JoinHandle<()>,
}

fn lock_timers(timers: &TimerMap) -> MutexGuard<'_, HashMap<i64, TimerEntry>> {
    timers.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Arms, replaces and cancels campaign expiration timers.
pub struct ExpirationScheduler<S> {
    store: SharedStore<S>,
    store_timeout: Duration,
    timers: TimerMap,
    next_generation: AtomicU64,
}

impl<S: BudgetStore> ExpirationScheduler<S> {
    #[must_use]
    pub fn new(store: SharedStore<S>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
            timers: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Arms the expiration timer for a campaign.
    ///
    /// An `expiration` of zero means the campaign never expires and nothing
    /// is scheduled. An expiration in the past fires immediately on a spawned
    /// task. Any timer already armed for `campaign_id` is stopped first.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// Returns `true` if a timer was armed.
    pub fn schedule_expiration(&self, campaign_id: i64, owner_id: &str, expiration: i64) -> bool {
        if expiration == 0 {
            debug!(campaign_id, owner_id, "Campaign never expires, not scheduling");
            return false;
        }

        let now: i64 = Utc::now().timestamp();
        let delay: Duration =
            Duration::from_secs(u64::try_from(expiration.saturating_sub(now)).unwrap_or(0));
        let generation: u64 = self.next_generation.fetch_add(1, Ordering::Relaxed);

        let timers: TimerMap = Arc::clone(&self.timers);
        let store: SharedStore<S> = Arc::clone(&self.store);
        let store_timeout: Duration = self.store_timeout;
        let owner: String = owner_id.to_string();

        // The map stays locked until the new entry is in place, so a timer
        // with a zero delay cannot look for its entry before it exists.
        let mut map = lock_timers(&self.timers);
        let handle: JoinHandle<()> = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !take_own_entry(&timers, campaign_id, generation) {
                return;
            }
            handle_expiration(&store, store_timeout, campaign_id, &owner).await;
        });

        if let Some(previous) = map.insert(campaign_id, TimerEntry { generation, handle }) {
            previous.handle.abort();
            debug!(campaign_id, "Replaced existing expiration timer");
        }
        drop(map);

        info!(
            campaign_id,
            owner_id,
            expiration,
            delay_secs = delay.as_secs(),
            "Scheduled campaign expiration"
        );
        true
    }

    /// Stops and removes the pending timer for a campaign.
    ///
    /// A reclamation that has already started runs to completion. Returns
    /// `true` if a pending timer was removed.
    pub fn cancel_expiration(&self, campaign_id: i64) -> bool {
        let Some(entry) = lock_timers(&self.timers).remove(&campaign_id) else {
            return false;
        };
        entry.handle.abort();
        info!(campaign_id, "Cancelled campaign expiration");
        true
    }

    /// Re-arms timers for every unreclaimed campaign with an expiration.
    ///
    /// Campaigns whose expiration has already passed are reclaimed right
    /// away. Returns the number of timers armed.
    ///
    /// # Errors
    ///
    /// Returns an error if the active campaigns cannot be listed.
    pub async fn schedule_existing_expirations(&self) -> Result<usize, SchedulerError> {
        let campaigns: Vec<ActiveCampaign> = call_store(
            &self.store,
            self.store_timeout,
            "get_active_campaigns",
            |store: &mut S| store.get_active_campaigns(),
        )
        .await?;

        let mut armed: usize = 0;
        for campaign in &campaigns {
            if self.schedule_expiration(campaign.campaign_id, &campaign.owner_id, campaign.expiration)
            {
                armed += 1;
            } else {
                warn!(
                    campaign_id = campaign.campaign_id,
                    "Active campaign listed without an expiration, skipping"
                );
            }
        }

        info!(
            listed = campaigns.len(),
            armed, "Re-armed expirations for existing campaigns"
        );
        Ok(armed)
    }

    /// Whether a timer is pending for `campaign_id`.
    #[must_use]
    pub fn is_scheduled(&self, campaign_id: i64) -> bool {
        lock_timers(&self.timers).contains_key(&campaign_id)
    }

    /// Number of pending timers.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        lock_timers(&self.timers).len()
    }

    /// Stops every pending timer. Returns how many were stopped.
    pub fn abort_all(&self) -> usize {
        let drained: Vec<TimerEntry> = lock_timers(&self.timers)
            .drain()
            .map(|(_, entry)| entry)
            .collect();
        for entry in &drained {
            entry.handle.abort();
        }
        drained.len()
    }
}

/// Removes the entry for `campaign_id` if it was armed with `generation`.
fn take_own_entry(timers: &TimerMap, campaign_id: i64, generation: u64) -> bool {
    let mut map = lock_timers(timers);
    if map
        .get(&campaign_id)
        .is_some_and(|entry| entry.generation == generation)
    {
        map.remove(&campaign_id);
        return true;
    }
    debug!(campaign_id, generation, "Timer superseded before firing");
    false
}

async fn handle_expiration<S: BudgetStore>(
    store: &SharedStore<S>,
    store_timeout: Duration,
    campaign_id: i64,
    owner_id: &str,
) {
    let result = call_store(store, store_timeout, "reclaim_campaign", move |store: &mut S| {
        store.reclaim_campaign(campaign_id)
    })
    .await;

    match result {
        Ok(0) => debug!(campaign_id, owner_id, "Campaign expired with nothing to reclaim"),
        Ok(amount) => info!(campaign_id, owner_id, amount, "Campaign expired"),
        Err(err) => error!(
            campaign_id,
            owner_id,
            error = %err,
            "Failed to reclaim expired campaign"
        ),
    }
}
