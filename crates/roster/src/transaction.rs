//! All-or-nothing update scope over a [`Roster`].
//!
//! A [`Transaction`] captures the roster's autocommit flag and a deep copy
//! of its mapping at entry, then forces autocommit off so body operations
//! never touch disk. Exactly one of commit/rollback takes effect:
//! [`Transaction::commit`] persists the mutated mapping with a single save,
//! while [`Transaction::rollback`] restores the snapshot and writes
//! nothing, leaving the pre-transaction file authoritative. Dropping the
//! guard without committing (early return, panic, future cancellation)
//! counts as a rollback.
//!
//! A transaction is exclusively scoped: the guard holds the only access
//! path to the roster for its lifetime, and it is not safe to share across
//! concurrent callers. A multi-threaded embedding must wrap the roster in
//! a single mutual-exclusion lock held for the full transaction lifetime.
//! Nested transactions are rejected at `begin` time.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::profile::Profile;
use crate::store::Roster;

/// Scoped guard over a roster's mapping. See the module docs.
#[derive(Debug)]
pub struct Transaction<'r> {
    roster: &'r mut Roster,
    /// Mapping as of entry; `None` once the transaction settled on commit.
    snapshot: Option<BTreeMap<String, Profile>>,
    prior_autocommit: bool,
}

impl<'r> Transaction<'r> {
    pub(crate) fn begin(roster: &'r mut Roster) -> Result<Self> {
        if roster.in_transaction {
            return Err(StoreError::TransactionInProgress);
        }

        let prior_autocommit = roster.autocommit;
        let snapshot = roster.entries.clone();
        roster.autocommit = false;
        roster.in_transaction = true;
        debug!("transaction: begin ({} tracked user(s))", snapshot.len());

        Ok(Self {
            roster,
            snapshot: Some(snapshot),
            prior_autocommit,
        })
    }

    /// Persist every change made in this transaction with a single save,
    /// then restore the roster's autocommit flag.
    ///
    /// If the save fails, the error propagates and the in-memory mapping
    /// keeps the mutated state; the caller may retry [`Roster::save`].
    pub fn commit(mut self) -> Result<()> {
        self.snapshot = None;
        debug!("transaction: commit");
        self.roster.save()
    }

    /// Discard every change made in this transaction, restoring the mapping
    /// captured at entry. Nothing is written to disk.
    ///
    /// Dropping the guard without committing has the same effect.
    pub fn rollback(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            debug!("transaction: rollback to {} tracked user(s)", snapshot.len());
            self.roster.entries = snapshot;
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        self.restore();
        self.roster.autocommit = self.prior_autocommit;
        self.roster.in_transaction = false;
    }
}

impl Deref for Transaction<'_> {
    type Target = Roster;

    fn deref(&self) -> &Roster {
        self.roster
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut Roster {
        self.roster
    }
}

impl Roster {
    /// Run `body` inside a transaction: commit on `Ok`, roll back on `Err`.
    ///
    /// The body's error is re-raised unchanged after the rollback
    /// completes. A commit failure surfaces through the same error type via
    /// `From<StoreError>`.
    pub fn with_transaction<T, E>(
        &mut self,
        body: impl FnOnce(&mut Roster) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut tx = self.begin()?;
        match body(&mut *tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                tx.rollback();
                Err(err)
            }
        }
    }
}
