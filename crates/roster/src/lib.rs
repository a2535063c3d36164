//! Transactional roster store for tracked platform users.
//!
//! The roster is an in-memory map from user id to [`Profile`], backed by a
//! single JSON file. Incremental writes go through the autocommit mode;
//! batched all-or-nothing updates go through [`Transaction`].
//!
//! Modules are organized by responsibility:
//! - [`profile`] holds the record types stored under each id
//! - [`store`] owns the mapping, the backing file, and persistence
//! - [`transaction`] provides the scoped commit/rollback guard
pub mod error;
pub mod profile;
pub mod store;
pub mod transaction;

pub use error::{Result, StoreError};
pub use profile::{ChallengeRef, Profile, SolutionRef, Validation};
pub use store::Roster;
pub use transaction::Transaction;
