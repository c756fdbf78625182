// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Affiliate identifier is empty or invalid.
    InvalidAffiliateId(String),
    /// Affiliate status string is not recognized.
    InvalidAffiliateStatus(String),
    /// Balance adjustment kind string is not recognized.
    InvalidAdjustmentKind(String),
    /// The combined weekly and one-time balance cannot cover a reservation.
    InsufficientBalance {
        /// The amount that was requested.
        requested: u64,
        /// The amount that was available across both buckets.
        available: u64,
    },
    /// A campaign must release a positive amount per code.
    InvalidAmountPerCode(u64),
    /// A campaign must contain at least one code.
    InvalidCodeCount(u64),
    /// A redemption code is empty.
    InvalidCode(String),
    /// The same redemption code appears more than once in a campaign.
    DuplicateCode(String),
    /// Expiration timestamps must be zero (never) or a positive unix time.
    InvalidExpiration(i64),
    /// Budget arithmetic overflowed.
    AmountOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// The reference timezone could not be resolved.
    InvalidTimezone(String),
    /// The fallback UTC offset is out of range.
    InvalidUtcOffset(i32),
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAffiliateId(msg) => write!(f, "Invalid affiliate id: {msg}"),
            Self::InvalidAffiliateStatus(status) => {
                write!(f, "Invalid affiliate status: {status}")
            }
            Self::InvalidAdjustmentKind(kind) => write!(f, "Invalid adjustment kind: {kind}"),
            Self::InsufficientBalance {
                requested,
                available,
            } => {
                write!(
                    f,
                    "Insufficient balance: requested {requested}, available {available}"
                )
            }
            Self::InvalidAmountPerCode(amount) => {
                write!(
                    f,
                    "Invalid amount per code: {amount}. Must be greater than 0"
                )
            }
            Self::InvalidCodeCount(count) => {
                write!(f, "Invalid code count: {count}. Must be greater than 0")
            }
            Self::InvalidCode(code) => write!(f, "Invalid redemption code: '{code}'"),
            Self::DuplicateCode(code) => write!(f, "Duplicate redemption code: {code}"),
            Self::InvalidExpiration(expiration) => {
                write!(
                    f,
                    "Invalid expiration: {expiration}. Must be 0 or a positive unix timestamp"
                )
            }
            Self::AmountOverflow { operation } => {
                write!(f, "Amount overflow while {operation}")
            }
            Self::InvalidTimezone(name) => write!(f, "Invalid timezone: {name}"),
            Self::InvalidUtcOffset(seconds) => {
                write!(f, "Invalid UTC offset: {seconds} seconds")
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
