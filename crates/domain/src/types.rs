// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// Approval state of an affiliate organization.
///
/// Only `Approved` affiliates take part in weekly replenishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AffiliateStatus {
    /// Created on first request, awaiting administrative review.
    #[default]
    Pending,
    /// Approved; the affiliate may fund campaigns.
    Approved,
    /// Rejected by an administrator.
    Rejected,
}

impl AffiliateStatus {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for AffiliateStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidAffiliateStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for AffiliateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An affiliate and its three-part budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliate {
    /// Opaque user identifier of the owning organization.
    pub affiliate_id: String,
    pub status: AffiliateStatus,
    /// Configured recurring budget per week.
    pub weekly_allocation: u64,
    /// Currently spendable portion of the recurring budget.
    pub weekly_balance: u64,
    /// Non-recurring top-up balance, consumed before the weekly balance.
    pub one_time_balance: u64,
}

impl Affiliate {
    /// Total spendable balance across both buckets.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub const fn spendable(&self) -> Option<u64> {
        self.weekly_balance.checked_add(self.one_time_balance)
    }

    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == AffiliateStatus::Approved
    }
}

/// A giveaway campaign ("event") as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub campaign_id: i64,
    /// The owning affiliate.
    pub owner_id: String,
    /// Value released per redeemed code.
    pub amount_per_code: u64,
    pub code_count: u64,
    /// Number of codes already redeemed.
    pub redeemed_count: u64,
    /// Unix timestamp in seconds; `0` means the campaign never expires.
    pub expiration: i64,
    /// Amount drawn from the weekly balance when the campaign was created.
    pub weekly_reserved: u64,
    /// Amount drawn from the one-time balance when the campaign was created.
    pub one_time_reserved: u64,
    /// Unix timestamp at which unredeemed value was returned, if it was.
    pub reclaimed_at: Option<i64>,
}

impl Campaign {
    /// Returns `true` if the campaign has an expiration instant.
    #[must_use]
    pub const fn expires(&self) -> bool {
        self.expiration > 0
    }

    #[must_use]
    pub const fn is_reclaimed(&self) -> bool {
        self.reclaimed_at.is_some()
    }

    /// The budget currently locked against this campaign.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not fit in a `u64`.
    pub fn reserved_value(&self) -> Result<u64, DomainError> {
        crate::balance::unredeemed_value(self.amount_per_code, self.code_count, self.redeemed_count)
    }
}

/// A campaign that still needs an expiration timer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveCampaign {
    pub campaign_id: i64,
    pub owner_id: String,
    /// Unix timestamp in seconds; always positive.
    pub expiration: i64,
}

/// The replenishment configuration of one approved affiliate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyConfig {
    pub affiliate_id: String,
    pub weekly_allocation: u64,
}

/// Parameters for creating a campaign together with its codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCampaign {
    pub owner_id: String,
    pub amount_per_code: u64,
    /// Unix timestamp in seconds; `0` means never expires.
    pub expiration: i64,
    /// One redemption code per unit; the campaign's code count is its length.
    pub codes: Vec<String>,
}

impl NewCampaign {
    /// Number of codes in the campaign.
    #[must_use]
    pub fn code_count(&self) -> u64 {
        self.codes.len() as u64
    }

    /// Total budget the campaign locks at creation.
    ///
    /// # Errors
    ///
    /// Returns an error if the product overflows.
    pub fn total_value(&self) -> Result<u64, DomainError> {
        self.amount_per_code
            .checked_mul(self.code_count())
            .ok_or_else(|| DomainError::AmountOverflow {
                operation: String::from("computing campaign total value"),
            })
    }

    /// Validates the campaign parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner id is blank, the amount per code is zero,
    /// there are no codes, a code is blank or repeated, the expiration is
    /// negative, or the total value overflows.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_affiliate_id(&self.owner_id)?;
        if self.amount_per_code == 0 {
            return Err(DomainError::InvalidAmountPerCode(self.amount_per_code));
        }
        if self.codes.is_empty() {
            return Err(DomainError::InvalidCodeCount(0));
        }
        if self.expiration < 0 {
            return Err(DomainError::InvalidExpiration(self.expiration));
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(self.codes.len());
        for code in &self.codes {
            if code.trim().is_empty() {
                return Err(DomainError::InvalidCode(code.clone()));
            }
            if !seen.insert(code.as_str()) {
                return Err(DomainError::DuplicateCode(code.clone()));
            }
        }

        self.total_value()?;
        Ok(())
    }
}

/// Validates an affiliate identifier.
///
/// # Errors
///
/// Returns an error if the identifier is empty or only whitespace.
pub fn validate_affiliate_id(affiliate_id: &str) -> Result<(), DomainError> {
    if affiliate_id.trim().is_empty() {
        return Err(DomainError::InvalidAffiliateId(String::from(
            "affiliate id cannot be empty",
        )));
    }
    Ok(())
}
