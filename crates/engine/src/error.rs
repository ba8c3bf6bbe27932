//! The module contains the error the engine can throw.
//!
//! Validation failures are reported before any write reaches the store:
//!
//! - [`InvalidAmount`] thrown when a money value or quantity is rejected.
//! - [`InvalidName`] thrown when a required text field is blank.
//! - [`KeyNotFound`] thrown when an item is not found.
//! - [`ExistingKey`] thrown when a name, phone or barcode is already taken.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidName`]: EngineError::InvalidName
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),
    #[error("Invoice has no items")]
    EmptyInvoice,
    #[error("Invalid backup: {0}")]
    InvalidBackup(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InsufficientStock(a), Self::InsufficientStock(b)) => a == b,
            (Self::EmptyInvoice, Self::EmptyInvoice) => true,
            (Self::InvalidBackup(a), Self::InvalidBackup(b)) => a == b,
            (Self::Export(a), Self::Export(b)) => a == b,
            (Self::Serialization(a), Self::Serialization(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl EngineError {
    /// Returns `true` for errors raised by input validation, as opposed to
    /// storage or serialization failures.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::InvalidName(_)
                | Self::KeyNotFound(_)
                | Self::ExistingKey(_)
                | Self::InsufficientStock(_)
                | Self::EmptyInvoice
                | Self::InvalidBackup(_)
        )
    }
}
