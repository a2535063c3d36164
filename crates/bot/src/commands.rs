//! Roster management operations for the command layer.
//!
//! These run outside any transaction and rely on the store's autocommit,
//! so every accepted change is on disk before the function returns. They
//! must never race a sync cycle: the deployment model interleaves command
//! handling and synchronization cooperatively on one worker.

use platform_api::{ApiError, PlatformClient, UserSummary};
use roster::{Roster, StoreError};
use thiserror::Error;
use tracing::info;

pub type Result<T> = std::result::Result<T, CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    /// User ids on the platform are positive integers.
    #[error("invalid user id {0:?}: expected a positive integer")]
    InvalidUserId(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Start tracking a user: fetch the current profile and store it.
///
/// Returns the display name for confirmation messages.
pub async fn register(
    roster: &mut Roster,
    client: &PlatformClient,
    id: &str,
) -> Result<String> {
    if !is_valid_user_id(id) {
        return Err(CommandError::InvalidUserId(id.to_string()));
    }

    let profile = client.fetch_profile(id).await?;
    let name = profile.display_name.clone();
    roster.set(profile)?;
    info!("registered user {} ({})", id, name);
    Ok(name)
}

/// Stop tracking a user.
///
/// Returns the removed profile's display name, or `None` if the user was
/// not registered.
pub fn unregister(roster: &mut Roster, id: &str) -> Result<Option<String>> {
    let removed = roster.remove(id)?.map(|profile| profile.display_name);
    if let Some(name) = &removed {
        info!("unregistered user {} ({})", id, name);
    }
    Ok(removed)
}

/// Look up platform users by name, for interactive id discovery.
pub async fn find_user(client: &PlatformClient, name: &str) -> Result<Vec<UserSummary>> {
    Ok(client.search_users(name).await?)
}

/// Forget every tracked user.
pub fn reset(roster: &mut Roster) -> Result<()> {
    roster.reset()?;
    Ok(())
}

fn is_valid_user_id(id: &str) -> bool {
    id.parse::<u64>().is_ok_and(|n| n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_validation() {
        assert!(is_valid_user_id("42"));
        assert!(!is_valid_user_id("0"));
        assert!(!is_valid_user_id("-3"));
        assert!(!is_valid_user_id("abc"));
        assert!(!is_valid_user_id(""));
    }
}
