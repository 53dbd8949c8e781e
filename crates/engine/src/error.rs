//! The module contains the error the engine can throw.
//!
//! Reconciliation errors are computed before anything is written:
//!
//! - [`InvalidAmount`] an amount is zero, negative or out of range.
//! - [`MissingField`] a required request field is absent.
//! - [`InsufficientFunds`] the mutation would overdraw the balance.
//! - [`UnknownCategory`] the category is not part of the fixed table and the
//!   policy rejects it.
//!
//! Ledger lookups fail with [`NotFound`] or [`Forbidden`]. Anything coming from
//! the database is wrapped in [`StorageUnavailable`] and is never a
//! reconciliation failure.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`MissingField`]: EngineError::MissingField
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`UnknownCategory`]: EngineError::UnknownCategory
//!  [`NotFound`]: EngineError::NotFound
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`StorageUnavailable`]: EngineError::StorageUnavailable
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Missing field: {0}")]
    MissingField(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error(transparent)]
    StorageUnavailable(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for errors raised by the storage layer.
    ///
    /// Callers may retry the whole read-reconcile-write cycle on these.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }

    /// A balance or spend would leave the `i64` range.
    pub(crate) fn amount_out_of_range() -> Self {
        Self::InvalidAmount("amount out of range".to_string())
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::MissingField(a), Self::MissingField(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::UnknownCategory(a), Self::UnknownCategory(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::StorageUnavailable(a), Self::StorageUnavailable(b)) => {
                a.to_string() == b.to_string()
            }
            _ => false,
        }
    }
}
