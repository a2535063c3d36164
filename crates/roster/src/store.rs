//! Persistent keyed roster of tracked user profiles.
//!
//! The roster owns a map from user id to [`Profile`] and a backing JSON
//! file. With autocommit on, every mutation persists the full mapping
//! before returning; with autocommit off, nothing reaches disk until
//! [`Roster::save`] (or a transaction commit) is called.
//!
//! # File Format
//!
//! A single JSON object keyed by user id:
//! ```text
//! {"42": {"id": "42", "displayName": "Ann", ...}, ...}
//! ```
//!
//! A missing file, or one that is not syntactically valid JSON, is treated
//! as an empty roster and repaired to `{}` on open. A file that parses but
//! does not describe a roster (wrong top-level shape, invalid record) fails
//! the whole open and is left untouched.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::profile::Profile;
use crate::transaction::Transaction;

/// Ordered mapping from user id to [`Profile`] with a JSON file behind it.
#[derive(Debug)]
pub struct Roster {
    pub(crate) entries: BTreeMap<String, Profile>,
    path: PathBuf,
    pub(crate) autocommit: bool,
    pub(crate) in_transaction: bool,
}

impl Roster {
    /// Open the roster backed by the file at `path`.
    ///
    /// A missing or syntactically invalid file initializes an empty roster
    /// and immediately rewrites `path` as `{}`, so the backing file always
    /// holds a valid serialized roster after a successful open. Valid JSON
    /// of the wrong shape fails with [`StoreError::Corrupt`] instead: no
    /// partial load, and the original file is not overwritten.
    pub fn open(path: impl AsRef<Path>, autocommit: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let loaded = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => Some(parse_entries(&path, value)?),
                Err(err) => {
                    debug!(
                        "roster file {} is not valid JSON ({}), reinitializing",
                        path.display(),
                        err
                    );
                    None
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no roster file at {}, starting empty", path.display());
                None
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        let repair = loaded.is_none();
        let roster = Self {
            entries: loaded.unwrap_or_default(),
            path,
            autocommit,
            in_transaction: false,
        };
        if repair {
            roster.save()?;
        }

        debug!("roster opened: {} tracked user(s)", roster.len());
        Ok(roster)
    }

    /// Look up a profile by user id. No side effect.
    pub fn get(&self, id: &str) -> Option<&Profile> {
        self.entries.get(id)
    }

    /// Insert or replace the profile stored under `profile.id`.
    ///
    /// Persists the full roster before returning when autocommit is on.
    pub fn set(&mut self, profile: Profile) -> Result<()> {
        debug!("roster: set user {}", profile.id);
        self.entries.insert(profile.id.clone(), profile);
        if self.autocommit {
            self.save()?;
        }
        Ok(())
    }

    /// Remove the profile stored under `id`, returning the prior value.
    ///
    /// `None` signals the id was not tracked; that is not an error.
    /// Persists when something was removed and autocommit is on.
    pub fn remove(&mut self, id: &str) -> Result<Option<Profile>> {
        debug!("roster: remove user {}", id);
        let previous = self.entries.remove(id);
        if previous.is_some() && self.autocommit {
            self.save()?;
        }
        Ok(previous)
    }

    /// Snapshot of the tracked ids at call time.
    ///
    /// The returned vector is detached from the roster, so a caller may
    /// `set`/`remove` while looping over it without skipping or repeating
    /// entries.
    pub fn ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Read-only view over the stored profiles, in id order.
    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn autocommit(&self) -> bool {
        self.autocommit
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize the full mapping to the backing file, overwriting it.
    ///
    /// The write goes to a temp sibling first and is renamed into place, so
    /// a crash mid-write cannot clobber the previous on-disk roster.
    pub fn save(&self) -> Result<()> {
        info!("roster: commit to disk (path: {})", self.path.display());
        let json = serde_json::to_string_pretty(&self.entries)?;

        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        fs::write(&temp_path, json).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        Ok(())
    }

    /// Clear the mapping and immediately persist the empty roster,
    /// regardless of autocommit.
    pub fn reset(&mut self) -> Result<()> {
        info!("roster: reset");
        self.entries.clear();
        self.save()
    }

    /// Start an all-or-nothing update scope. See [`Transaction`].
    pub fn begin(&mut self) -> Result<Transaction<'_>> {
        Transaction::begin(self)
    }
}

fn parse_entries(path: &Path, value: Value) -> Result<BTreeMap<String, Profile>> {
    let Value::Object(object) = value else {
        return Err(StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: "top-level value is not an object".to_string(),
        });
    };

    let mut entries = BTreeMap::new();
    for (id, fields) in object {
        let profile: Profile =
            serde_json::from_value(fields).map_err(|err| StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("record {id}: {err}"),
            })?;
        if profile.id != id {
            return Err(StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("record keyed {id} declares id {}", profile.id),
            });
        }
        entries.insert(id, profile);
    }
    Ok(entries)
}
