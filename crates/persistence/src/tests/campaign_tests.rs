// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for campaign creation, redemption and reclamation.

use crate::tests::{create_approved_affiliate, create_test_campaign, new_campaign};
use crate::{Persistence, PersistenceError};
use affiliate_budget_domain::{
    ActiveCampaign, AdjustmentKind, AffiliateStatus, BalanceAdjustment, Campaign, DomainError,
};

const FUTURE: i64 = 4_102_444_800;

#[test]
fn test_create_campaign_reserves_total_value() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 1000, 1000, 0);

    let campaign: Campaign = create_test_campaign(&mut persistence, "org-1", "c1", 100, 3, FUTURE);

    assert_eq!(campaign.weekly_reserved, 300);
    assert_eq!(campaign.one_time_reserved, 0);
    assert_eq!(campaign.redeemed_count, 0);
    assert_eq!(
        persistence.get_affiliate("org-1").unwrap().unwrap().weekly_balance,
        700
    );
    assert_eq!(persistence.allocated_balance_by_owner("org-1").unwrap(), 300);
    assert_eq!(
        persistence.get_campaign(campaign.campaign_id).unwrap(),
        Some(campaign.clone())
    );

    let journal: Vec<BalanceAdjustment> = persistence.list_balance_adjustments("org-1").unwrap();
    let reservation: &BalanceAdjustment = journal.last().unwrap();
    assert_eq!(reservation.kind, AdjustmentKind::Reservation);
    assert_eq!(reservation.campaign_id, Some(campaign.campaign_id));
    assert_eq!(reservation.weekly_delta, -300);
}

#[test]
fn test_create_campaign_requires_approved_owner() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    persistence.create_affiliate("org-1").unwrap();
    persistence.add_one_time_balance("org-1", 1000).unwrap();

    let result = persistence.create_campaign(&new_campaign("org-1", "c1", 100, 1, FUTURE));
    assert_eq!(
        result,
        Err(PersistenceError::AffiliateNotApproved(String::from("org-1")))
    );

    persistence
        .set_affiliate_status("org-1", AffiliateStatus::Approved)
        .unwrap();
    assert!(
        persistence
            .create_campaign(&new_campaign("org-1", "c1", 100, 1, FUTURE))
            .is_ok()
    );
}

#[test]
fn test_create_campaign_with_insufficient_balance_commits_nothing() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 250, 250, 0);

    let result = persistence.create_campaign(&new_campaign("org-1", "c1", 100, 3, FUTURE));

    assert_eq!(
        result,
        Err(PersistenceError::InsufficientBalance {
            requested: 300,
            available: 250,
        })
    );
    assert!(persistence.get_active_campaigns().unwrap().is_empty());
    assert_eq!(persistence.allocated_balance_by_owner("org-1").unwrap(), 0);
}

#[test]
fn test_create_campaign_rejects_invalid_parameters() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 1000, 1000, 0);

    let result = persistence.create_campaign(&new_campaign("org-1", "c1", 0, 1, FUTURE));
    assert_eq!(
        result,
        Err(PersistenceError::Validation(DomainError::InvalidAmountPerCode(0)))
    );
}

#[test]
fn test_code_reused_across_campaigns_rolls_back_reservation() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 1000, 1000, 0);
    create_test_campaign(&mut persistence, "org-1", "dup", 100, 2, FUTURE);

    let result = persistence.create_campaign(&new_campaign("org-1", "dup", 100, 2, FUTURE));

    assert!(matches!(result, Err(PersistenceError::DatabaseError(_))));
    assert_eq!(
        persistence.get_affiliate("org-1").unwrap().unwrap().weekly_balance,
        800
    );
    assert_eq!(persistence.get_active_campaigns().unwrap().len(), 1);
}

#[test]
fn test_active_campaigns_exclude_never_expiring_and_reclaimed() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 1000, 1000, 0);

    let later: Campaign = create_test_campaign(&mut persistence, "org-1", "a", 10, 1, FUTURE + 10);
    let sooner: Campaign = create_test_campaign(&mut persistence, "org-1", "b", 10, 1, FUTURE);
    create_test_campaign(&mut persistence, "org-1", "c", 10, 1, 0);
    let reclaimed: Campaign = create_test_campaign(&mut persistence, "org-1", "d", 10, 1, FUTURE);
    persistence.reclaim_campaign(reclaimed.campaign_id).unwrap();

    let active: Vec<ActiveCampaign> = persistence.get_active_campaigns().unwrap();
    let ids: Vec<i64> = active.iter().map(|c| c.campaign_id).collect();
    assert_eq!(ids, vec![sooner.campaign_id, later.campaign_id]);
    assert!(active.iter().all(|c| c.owner_id == "org-1"));
}

#[test]
fn test_unredeemed_value_tracks_redemptions() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 1000, 1000, 0);
    let campaign: Campaign = create_test_campaign(&mut persistence, "org-1", "c1", 100, 3, FUTURE);

    assert_eq!(persistence.get_unredeemed_value(campaign.campaign_id).unwrap(), 300);

    assert!(persistence.mark_code_redeemed(campaign.campaign_id, "c1-0").unwrap());
    assert!(!persistence.mark_code_redeemed(campaign.campaign_id, "c1-0").unwrap());
    assert_eq!(persistence.get_unredeemed_value(campaign.campaign_id).unwrap(), 200);
    assert_eq!(persistence.allocated_balance_by_owner("org-1").unwrap(), 200);

    persistence.mark_code_redeemed(campaign.campaign_id, "c1-1").unwrap();
    persistence.mark_code_redeemed(campaign.campaign_id, "c1-2").unwrap();
    assert_eq!(persistence.get_unredeemed_value(campaign.campaign_id).unwrap(), 0);

    let stored: Campaign = persistence.get_campaign(campaign.campaign_id).unwrap().unwrap();
    assert_eq!(stored.redeemed_count, 3);
}

#[test]
fn test_unredeemed_value_of_missing_campaign_is_zero() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    assert_eq!(persistence.get_unredeemed_value(42).unwrap(), 0);
    assert!(persistence.get_campaign(42).unwrap().is_none());
}

#[test]
fn test_mark_unknown_code_fails() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 1000, 1000, 0);
    let campaign: Campaign = create_test_campaign(&mut persistence, "org-1", "c1", 100, 1, FUTURE);

    assert!(matches!(
        persistence.mark_code_redeemed(campaign.campaign_id, "nope"),
        Err(PersistenceError::NotFound(_))
    ));
    assert_eq!(
        persistence.mark_code_redeemed(999, "c1-0"),
        Err(PersistenceError::CampaignNotFound(999))
    );
}

#[test]
fn test_reclaim_credits_weekly_balance_once() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 1000, 1000, 0);
    let campaign: Campaign = create_test_campaign(&mut persistence, "org-1", "c1", 100, 3, FUTURE);
    persistence.mark_code_redeemed(campaign.campaign_id, "c1-0").unwrap();

    assert_eq!(persistence.reclaim_campaign(campaign.campaign_id).unwrap(), 200);
    assert_eq!(persistence.reclaim_campaign(campaign.campaign_id).unwrap(), 0);

    assert_eq!(
        persistence.get_affiliate("org-1").unwrap().unwrap().weekly_balance,
        900
    );
    assert_eq!(persistence.get_unredeemed_value(campaign.campaign_id).unwrap(), 0);
    assert_eq!(persistence.allocated_balance_by_owner("org-1").unwrap(), 0);
    assert!(
        persistence
            .get_campaign(campaign.campaign_id)
            .unwrap()
            .unwrap()
            .is_reclaimed()
    );

    let reclamations: Vec<BalanceAdjustment> = persistence
        .list_balance_adjustments("org-1")
        .unwrap()
        .into_iter()
        .filter(|entry| entry.kind == AdjustmentKind::Reclamation)
        .collect();
    assert_eq!(reclamations.len(), 1);
    assert_eq!(reclamations[0].weekly_delta, 200);
    assert_eq!(reclamations[0].campaign_id, Some(campaign.campaign_id));
}

#[test]
fn test_reclaim_credits_weekly_even_when_funded_from_one_time() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 0, 0, 300);
    let campaign: Campaign = create_test_campaign(&mut persistence, "org-1", "c1", 100, 3, FUTURE);
    assert_eq!(campaign.one_time_reserved, 300);

    assert_eq!(persistence.reclaim_campaign(campaign.campaign_id).unwrap(), 300);

    let affiliate = persistence.get_affiliate("org-1").unwrap().unwrap();
    assert_eq!((affiliate.weekly_balance, affiliate.one_time_balance), (300, 0));
}

#[test]
fn test_reclaim_fully_redeemed_campaign_credits_nothing() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 1000, 1000, 0);
    let campaign: Campaign = create_test_campaign(&mut persistence, "org-1", "c1", 100, 1, FUTURE);
    persistence.mark_code_redeemed(campaign.campaign_id, "c1-0").unwrap();

    assert_eq!(persistence.reclaim_campaign(campaign.campaign_id).unwrap(), 0);
    assert_eq!(
        persistence.get_affiliate("org-1").unwrap().unwrap().weekly_balance,
        900
    );
    assert!(persistence.get_active_campaigns().unwrap().is_empty());
}

#[test]
fn test_reclaim_missing_campaign_is_a_no_op() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    assert_eq!(persistence.reclaim_campaign(12345).unwrap(), 0);
}

#[test]
fn test_codes_of_reclaimed_campaign_cannot_be_redeemed() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_approved_affiliate(&mut persistence, "org-1", 1000, 1000, 0);
    let campaign: Campaign = create_test_campaign(&mut persistence, "org-1", "c1", 100, 2, FUTURE);
    persistence.reclaim_campaign(campaign.campaign_id).unwrap();

    assert_eq!(
        persistence.mark_code_redeemed(campaign.campaign_id, "c1-0"),
        Err(PersistenceError::CampaignReclaimed(campaign.campaign_id))
    );
}
