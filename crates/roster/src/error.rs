//! Error types raised by the roster store.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by [`Roster`](crate::Roster) operations.
///
/// Absence of a user id is not an error: lookups and removals signal it
/// with `None`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file holds structured data that does not describe a
    /// roster. The file is left untouched; the caller decides whether to
    /// abort or reinitialize.
    #[error("corrupt roster file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("failed to read roster file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A persistence write failed. The in-memory mapping keeps the mutated
    /// state; callers needing disk consistency retry `save`.
    #[error("failed to write roster file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize roster: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("a transaction is already open on this roster")]
    TransactionInProgress,
}
