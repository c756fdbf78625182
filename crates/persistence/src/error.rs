// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use affiliate_budget_domain::DomainError;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// The requested affiliate does not exist.
    AffiliateNotFound(String),
    /// An affiliate with this id already exists.
    AffiliateExists(String),
    /// The affiliate is not approved to fund campaigns.
    AffiliateNotApproved(String),
    /// The requested campaign does not exist.
    CampaignNotFound(i64),
    /// The campaign's unredeemed value has already been returned.
    CampaignReclaimed(i64),
    /// The affiliate's combined balance cannot cover a reservation.
    InsufficientBalance { requested: u64, available: u64 },
    /// An amount does not fit the ledger's storage range.
    InvalidAmount(String),
    /// Input rejected by domain validation.
    Validation(DomainError),
    /// The requested resource was not found.
    NotFound(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::AffiliateNotFound(id) => write!(f, "Affiliate not found: {id}"),
            Self::AffiliateExists(id) => write!(f, "Affiliate already exists: {id}"),
            Self::AffiliateNotApproved(id) => write!(f, "Affiliate is not approved: {id}"),
            Self::CampaignNotFound(id) => write!(f, "Campaign not found: {id}"),
            Self::CampaignReclaimed(id) => write!(f, "Campaign {id} has already been reclaimed"),
            Self::InsufficientBalance {
                requested,
                available,
            } => write!(
                f,
                "Insufficient balance: requested {requested}, available {available}"
            ),
            Self::InvalidAmount(msg) => write!(f, "Invalid amount: {msg}"),
            Self::Validation(err) => write!(f, "Validation failed: {err}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<DomainError> for PersistenceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InsufficientBalance {
                requested,
                available,
            } => Self::InsufficientBalance {
                requested,
                available,
            },
            other => Self::Validation(other),
        }
    }
}
