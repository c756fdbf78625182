// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for reservation, refund and weekly balance primitives.

use crate::tests::{RaceOutcome, create_approved_affiliate, reserve_concurrently};
use crate::{Persistence, PersistenceError};
use affiliate_budget_domain::{AdjustmentKind, Affiliate, BalanceAdjustment, ReservationSplit};

fn balances(persistence: &mut Persistence, affiliate_id: &str) -> (u64, u64) {
    let affiliate: Affiliate = persistence.get_affiliate(affiliate_id).unwrap().unwrap();
    (affiliate.weekly_balance, affiliate.one_time_balance)
}

#[test]
fn test_reserve_from_weekly_only() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 1000, 1000, 0);

    let split: ReservationSplit = persistence.reserve_balance("org-1", 300).unwrap();

    assert_eq!(split, ReservationSplit::new(300, 0));
    assert_eq!(balances(&mut persistence, "org-1"), (700, 0));
}

#[test]
fn test_reserve_exhausts_one_time_first() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 100, 100, 50);

    let split: ReservationSplit = persistence.reserve_balance("org-1", 120).unwrap();

    assert_eq!(split.weekly, 70);
    assert_eq!(split.one_time, 50);
    assert_eq!(balances(&mut persistence, "org-1"), (30, 0));
}

#[test]
fn test_reserve_insufficient_balance_commits_nothing() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 100, 100, 50);
    let journal_before: usize = persistence.list_balance_adjustments("org-1").unwrap().len();

    let result = persistence.reserve_balance("org-1", 151);

    assert_eq!(
        result,
        Err(PersistenceError::InsufficientBalance {
            requested: 151,
            available: 150,
        })
    );
    assert_eq!(balances(&mut persistence, "org-1"), (100, 50));
    assert_eq!(
        persistence.list_balance_adjustments("org-1").unwrap().len(),
        journal_before
    );
}

#[test]
fn test_reserve_for_missing_affiliate_fails() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let result = persistence.reserve_balance("nobody", 1);
    assert_eq!(
        result,
        Err(PersistenceError::AffiliateNotFound(String::from("nobody")))
    );
}

#[test]
fn test_reserve_then_refund_restores_both_buckets() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 400, 400, 80);

    for amount in [0, 1, 80, 81, 480] {
        let split: ReservationSplit = persistence.reserve_balance("org-1", amount).unwrap();
        assert_eq!(split.total(), Some(amount));
        persistence
            .refund_balance("org-1", split.weekly, split.one_time)
            .unwrap();
        assert_eq!(balances(&mut persistence, "org-1"), (400, 80));
    }
}

#[test]
fn test_refund_has_no_upper_bound() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 100, 100, 0);

    persistence.refund_balance("org-1", 500, 20).unwrap();

    assert_eq!(balances(&mut persistence, "org-1"), (600, 20));
}

#[test]
fn test_reservation_and_refund_are_journaled_with_signed_deltas() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 100, 100, 50);

    let split: ReservationSplit = persistence.reserve_balance("org-1", 120).unwrap();
    persistence
        .refund_balance("org-1", split.weekly, split.one_time)
        .unwrap();

    let journal: Vec<BalanceAdjustment> = persistence.list_balance_adjustments("org-1").unwrap();
    let reservation: &BalanceAdjustment = &journal[journal.len() - 2];
    let refund: &BalanceAdjustment = &journal[journal.len() - 1];

    assert_eq!(reservation.kind, AdjustmentKind::Reservation);
    assert_eq!((reservation.weekly_delta, reservation.one_time_delta), (-70, -50));
    assert_eq!(reservation.campaign_id, None);
    assert_eq!(refund.kind, AdjustmentKind::Refund);
    assert_eq!((refund.weekly_delta, refund.one_time_delta), (70, 50));
}

#[test]
fn test_set_weekly_balance_records_difference() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 1000, 1000, 0);

    persistence.set_weekly_balance("org-1", 700).unwrap();

    assert_eq!(balances(&mut persistence, "org-1"), (700, 0));
    let journal: Vec<BalanceAdjustment> = persistence.list_balance_adjustments("org-1").unwrap();
    let last: &BalanceAdjustment = journal.last().unwrap();
    assert_eq!(last.kind, AdjustmentKind::Replenishment);
    assert_eq!(last.weekly_delta, -300);
}

#[test]
fn test_add_weekly_balance_credits_weekly_only() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 1000, 700, 10);

    persistence.add_weekly_balance("org-1", 300).unwrap();

    assert_eq!(balances(&mut persistence, "org-1"), (1000, 10));
    let journal: Vec<BalanceAdjustment> = persistence.list_balance_adjustments("org-1").unwrap();
    assert_eq!(journal.last().unwrap().kind, AdjustmentKind::WeeklyCredit);
}

#[test]
fn test_amounts_beyond_ledger_range_are_rejected() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 0, 0, 0);

    let result = persistence.add_weekly_balance("org-1", u64::MAX);
    assert!(matches!(result, Err(PersistenceError::InvalidAmount(_))));
    assert_eq!(balances(&mut persistence, "org-1"), (0, 0));
}

#[test]
fn test_weekly_balance_overflow_rolls_back() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 0, 0, 0);
    let max: u64 = u64::try_from(i64::MAX).unwrap();

    persistence.add_weekly_balance("org-1", max).unwrap();
    let result = persistence.add_weekly_balance("org-1", 1);

    assert!(matches!(result, Err(PersistenceError::InvalidAmount(_))));
    assert_eq!(balances(&mut persistence, "org-1"), (max, 0));
}

#[test]
fn test_concurrent_reservations_on_separate_connections_serialize() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("budget.db");
    {
        let mut setup = Persistence::new_with_file(&path).unwrap();
        create_approved_affiliate(&mut setup, "org-1", 500, 500, 0);
    }

    // Connections are opened up front so migrations never race.
    let connections: Vec<Persistence> = (0..8)
        .map(|_| Persistence::new_with_file(&path).unwrap())
        .collect();

    let outcome = reserve_concurrently(connections, "org-1", 100);

    assert_eq!(
        outcome,
        RaceOutcome {
            reserved: 5,
            refused: 3
        }
    );
    let mut persistence = Persistence::new_with_file(&path).unwrap();
    assert_eq!(balances(&mut persistence, "org-1"), (0, 0));
    let reservations = persistence
        .list_balance_adjustments("org-1")
        .unwrap()
        .into_iter()
        .filter(|adjustment| adjustment.kind == AdjustmentKind::Reservation)
        .count();
    assert_eq!(reservations, 5);
}
