//! The module contains the errors the ledger can throw.
//!
//! Bad numeric input is never an error: it is coerced to zero by
//! [`Money::coerce`]. The errors are:
//!
//! - [`InvalidAmount`] thrown when a payment would carry a non-positive amount.
//! - [`DuplicateEntry`] thrown when an entry id is already in the store.
//! - [`CorruptStore`] thrown when the persisted slot cannot be parsed.
//! - [`ImageRead`] thrown when a receipt file cannot be read.
//!
//!  [`Money::coerce`]: crate::Money::coerce
//!  [`InvalidAmount`]: LedgerError::InvalidAmount
//!  [`DuplicateEntry`]: LedgerError::DuplicateEntry
//!  [`CorruptStore`]: LedgerError::CorruptStore
//!  [`ImageRead`]: LedgerError::ImageRead
use std::path::PathBuf;

use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("\"{0}\" already present!")]
    DuplicateEntry(String),
    #[error("stored \"{key}\" is not a valid entry list: {source}")]
    CorruptStore {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot read receipt image {}: {source}", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::DuplicateEntry(a), Self::DuplicateEntry(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a == b,
            (Self::CorruptStore { key: a, .. }, Self::CorruptStore { key: b, .. }) => a == b,
            (Self::ImageRead { path: a, .. }, Self::ImageRead { path: b, .. }) => a == b,
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            (Self::Json(a), Self::Json(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
