//! Environment-driven configuration for the solvewatch binary.

use std::env;
use std::path::PathBuf;

use platform_api::DEFAULT_BASE_URL;

/// Runtime configuration, loaded from process environment variables.
#[derive(Clone, Debug)]
pub struct BotConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub roster_path: PathBuf,
    pub sync_interval_secs: u64,
}

impl BotConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `PLATFORM_API_KEY` - api key sent as the platform cookie (required)
    /// - `PLATFORM_API_URL` - API endpoint (default: the public platform API)
    /// - `ROSTER_PATH` - roster file location (default: roster.json)
    /// - `SYNC_INTERVAL_SECS` - seconds between poll cycles (default: 30)
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env::var("PLATFORM_API_KEY")
            .map_err(|_| anyhow::anyhow!("PLATFORM_API_KEY must be set"))?;

        Ok(Self {
            api_base_url: env::var("PLATFORM_API_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key,
            roster_path: env::var("ROSTER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("roster.json")),
            sync_interval_secs: read_env::<u64>("SYNC_INTERVAL_SECS").unwrap_or(30),
        })
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
