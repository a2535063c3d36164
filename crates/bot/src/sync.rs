//! Periodic roster synchronization against the platform API.
//!
//! Each cycle refreshes every tracked profile inside a single transaction:
//! either the whole cycle's refresh lands on disk, or none of it does.
//! Awaiting platform fetches while the transaction is open is safe here
//! because the worker owns the roster outright; nothing else can touch it
//! until the cycle ends. Cancelling the worker mid-cycle (dropping its
//! future) rolls the open transaction back; it never half-commits.

use std::time::Duration;

use async_trait::async_trait;
use platform_api::{ApiError, ChallengeDetail, PlatformClient};
use roster::{Profile, Roster};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// A newly observed validation, enriched with challenge details when the
/// lookup succeeded.
#[derive(Clone, Debug)]
pub struct SolveEvent {
    pub user_id: String,
    pub display_name: String,
    pub challenge_id: String,
    pub challenge: Option<ChallengeDetail>,
}

/// Source of fresh profile data for the sync loop.
///
/// [`PlatformClient`] is the production implementation; tests substitute an
/// in-memory fake.
#[async_trait]
pub trait ProfileSource {
    async fn fetch_profile(&self, id: &str) -> Result<Profile, ApiError>;
    async fn fetch_challenge(&self, id: &str) -> Result<ChallengeDetail, ApiError>;
}

#[async_trait]
impl ProfileSource for PlatformClient {
    async fn fetch_profile(&self, id: &str) -> Result<Profile, ApiError> {
        PlatformClient::fetch_profile(self, id).await
    }

    async fn fetch_challenge(&self, id: &str) -> Result<ChallengeDetail, ApiError> {
        PlatformClient::fetch_challenge(self, id).await
    }
}

/// Worker that owns the roster and keeps it in sync with the platform.
pub struct SyncWorker<S> {
    roster: Roster,
    source: S,
    events_tx: mpsc::Sender<SolveEvent>,
    poll_interval: Duration,
}

impl<S: ProfileSource> SyncWorker<S> {
    pub fn new(
        roster: Roster,
        source: S,
        events_tx: mpsc::Sender<SolveEvent>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            roster,
            source,
            events_tx,
            poll_interval,
        }
    }

    /// Run sync cycles forever, one per poll interval.
    ///
    /// A failed cycle is logged and the loop keeps going; the rollback has
    /// already restored the roster. The caller stops the worker by dropping
    /// this future (e.g. racing it against a shutdown signal).
    pub async fn run(mut self) {
        info!(
            "sync worker started: every {}s, {} tracked user(s)",
            self.poll_interval.as_secs(),
            self.roster.len()
        );

        loop {
            sleep(self.poll_interval).await;
            if let Err(err) = self.run_cycle().await {
                warn!("sync cycle failed and was rolled back: {}", err);
            }
        }
    }

    /// One polling cycle: refresh every tracked profile inside a single
    /// transaction, reporting validations not seen before.
    ///
    /// A fetch failure skips the affected user for this cycle (retry policy
    /// lives here, never in the store); a store failure aborts and rolls
    /// back the whole cycle.
    pub async fn run_cycle(&mut self) -> roster::Result<()> {
        let Self {
            roster,
            source,
            events_tx,
            ..
        } = self;

        let mut tx = roster.begin()?;
        let mut refreshed = 0usize;

        for id in tx.ids() {
            let fresh = match source.fetch_profile(&id).await {
                Ok(profile) => profile,
                Err(err) => {
                    warn!("skipping user {} this cycle: {}", id, err);
                    continue;
                }
            };

            let newly_validated = match tx.get(&id) {
                Some(previous) => new_validations(previous, &fresh),
                None => Vec::new(),
            };

            for challenge_id in newly_validated {
                let challenge = match source.fetch_challenge(&challenge_id).await {
                    Ok(detail) => Some(detail),
                    Err(err) => {
                        debug!("no details for challenge {}: {}", challenge_id, err);
                        None
                    }
                };

                let event = SolveEvent {
                    user_id: id.clone(),
                    display_name: fresh.display_name.clone(),
                    challenge_id,
                    challenge,
                };
                if events_tx.send(event).await.is_err() {
                    debug!("solve event receiver dropped");
                }
            }

            tx.set(fresh)?;
            refreshed += 1;
        }

        tx.commit()?;
        debug!("sync cycle complete: {} profile(s) refreshed", refreshed);
        Ok(())
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Mutable access to the roster between cycles, for command handling.
    ///
    /// The deployment model interleaves commands and synchronization
    /// cooperatively on one worker; the borrow rules keep this unusable
    /// while a cycle (and its transaction) is in flight.
    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }
}

/// Ids of validations present in `fresh` that `previous` has not been
/// credited for.
fn new_validations(previous: &Profile, fresh: &Profile) -> Vec<String> {
    fresh
        .validations
        .iter()
        .filter(|validation| !previous.has_validated(&validation.challenge_id))
        .map(|validation| validation.challenge_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    use chrono::NaiveDateTime;
    use roster::Validation;
    use tempfile::TempDir;

    struct FakeSource {
        profiles: HashMap<String, Profile>,
        challenges: HashMap<String, ChallengeDetail>,
    }

    #[async_trait]
    impl ProfileSource for FakeSource {
        async fn fetch_profile(&self, id: &str) -> Result<Profile, ApiError> {
            self.profiles.get(id).cloned().ok_or(ApiError::NotFound {
                url: format!("fake://auteurs/{id}"),
            })
        }

        async fn fetch_challenge(&self, id: &str) -> Result<ChallengeDetail, ApiError> {
            self.challenges.get(id).cloned().ok_or(ApiError::NotFound {
                url: format!("fake://challenges/{id}"),
            })
        }
    }

    fn profile(id: &str, name: &str, validated: &[&str]) -> Profile {
        Profile {
            id: id.to_string(),
            display_name: name.to_string(),
            status: "active".to_string(),
            score: "100".to_string(),
            rank: 1,
            challenges: Vec::new(),
            solutions: Vec::new(),
            validations: validated
                .iter()
                .map(|challenge_id| Validation {
                    challenge_id: challenge_id.to_string(),
                    date: NaiveDateTime::parse_from_str(
                        "2021-01-17 16:39:53",
                        "%Y-%m-%d %H:%M:%S",
                    )
                    .unwrap(),
                })
                .collect(),
        }
    }

    fn challenge(title: &str) -> ChallengeDetail {
        ChallengeDetail {
            title: title.to_string(),
            category: "Web".to_string(),
            subtitle: "Basics".to_string(),
            score: "30".to_string(),
            difficulty: "facile".to_string(),
        }
    }

    fn worker_with(
        temp_dir: &TempDir,
        stored: Vec<Profile>,
        source: FakeSource,
    ) -> (SyncWorker<FakeSource>, mpsc::Receiver<SolveEvent>) {
        let mut roster =
            Roster::open(temp_dir.path().join("roster.json"), true).unwrap();
        for profile in stored {
            roster.set(profile).unwrap();
        }
        let (events_tx, events_rx) = mpsc::channel(16);
        (
            SyncWorker::new(roster, source, events_tx, Duration::from_secs(30)),
            events_rx,
        )
    }

    #[tokio::test]
    async fn test_cycle_reports_new_validations_and_updates_disk() {
        let temp_dir = TempDir::new().unwrap();
        let source = FakeSource {
            profiles: HashMap::from([(
                "42".to_string(),
                profile("42", "Ann", &["5", "8"]),
            )]),
            challenges: HashMap::from([("8".to_string(), challenge("XSS"))]),
        };
        let (mut worker, mut events_rx) =
            worker_with(&temp_dir, vec![profile("42", "Ann", &["5"])], source);

        worker.run_cycle().await.unwrap();

        let event = events_rx.try_recv().unwrap();
        assert_eq!(event.user_id, "42");
        assert_eq!(event.challenge_id, "8");
        assert_eq!(event.challenge.as_ref().unwrap().title, "XSS");
        assert!(events_rx.try_recv().is_err());

        assert!(worker.roster().get("42").unwrap().has_validated("8"));
        let disk = fs::read_to_string(temp_dir.path().join("roster.json")).unwrap();
        assert!(disk.contains("\"8\""));
    }

    #[tokio::test]
    async fn test_already_credited_validations_are_not_reported_again() {
        let temp_dir = TempDir::new().unwrap();
        let source = FakeSource {
            profiles: HashMap::from([(
                "42".to_string(),
                profile("42", "Ann", &["5"]),
            )]),
            challenges: HashMap::new(),
        };
        let (mut worker, mut events_rx) =
            worker_with(&temp_dir, vec![profile("42", "Ann", &["5"])], source);

        worker.run_cycle().await.unwrap();
        worker.run_cycle().await.unwrap();

        assert!(events_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_user_but_cycle_commits_others() {
        let temp_dir = TempDir::new().unwrap();
        let source = FakeSource {
            profiles: HashMap::from([(
                "42".to_string(),
                profile("42", "Ann", &["5"]),
            )]),
            challenges: HashMap::new(),
        };
        let (mut worker, _events_rx) = worker_with(
            &temp_dir,
            vec![profile("42", "Ann", &[]), profile("99", "Bob", &[])],
            source,
        );

        worker.run_cycle().await.unwrap();

        // Ann was refreshed, Bob kept his stale profile.
        assert!(worker.roster().get("42").unwrap().has_validated("5"));
        assert_eq!(worker.roster().get("99").unwrap().display_name, "Bob");
    }

    #[tokio::test]
    async fn test_commands_interleave_between_cycles() {
        let temp_dir = TempDir::new().unwrap();
        let source = FakeSource {
            profiles: HashMap::from([
                ("42".to_string(), profile("42", "Ann", &[])),
                ("99".to_string(), profile("99", "Bob", &[])),
            ]),
            challenges: HashMap::new(),
        };
        let (mut worker, _events_rx) = worker_with(
            &temp_dir,
            vec![profile("42", "Ann", &[]), profile("99", "Bob", &[])],
            source,
        );

        worker.run_cycle().await.unwrap();
        crate::commands::unregister(worker.roster_mut(), "99").unwrap();
        worker.run_cycle().await.unwrap();

        // The unregistered user stays gone: the next cycle only refreshes
        // ids still tracked at its start.
        assert!(worker.roster().get("99").is_none());
        assert_eq!(worker.roster().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_challenge_details_still_reports_solve() {
        let temp_dir = TempDir::new().unwrap();
        let source = FakeSource {
            profiles: HashMap::from([(
                "42".to_string(),
                profile("42", "Ann", &["8"]),
            )]),
            challenges: HashMap::new(),
        };
        let (mut worker, mut events_rx) =
            worker_with(&temp_dir, vec![profile("42", "Ann", &[])], source);

        worker.run_cycle().await.unwrap();

        let event = events_rx.try_recv().unwrap();
        assert_eq!(event.challenge_id, "8");
        assert!(event.challenge.is_none());
    }
}
