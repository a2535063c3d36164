//! Platform HTTP client implementation.

use roster::Profile;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::payload::{ChallengeDetail, SearchPage, UserPayload, UserSummary};

/// Default public endpoint of the platform API.
pub const DEFAULT_BASE_URL: &str = "https://api.www.root-me.org";

/// Client for the platform's public HTTP API.
///
/// The api key travels as the platform's `api_key` cookie on every request.
pub struct PlatformClient {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl PlatformClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Fetch the full profile of one user by platform id.
    pub async fn fetch_profile(&self, id: &str) -> Result<Profile> {
        let url = format!("{}/auteurs/{}", self.base_url, id);
        let payload: UserPayload = self.get_json(url, &[]).await?;
        Ok(payload.into_profile())
    }

    /// Search users by (partial) name.
    ///
    /// Returns the platform's first result page flattened into summaries;
    /// an empty vector means no match.
    pub async fn search_users(&self, name: &str) -> Result<Vec<UserSummary>> {
        let url = format!("{}/auteurs", self.base_url);
        let pages: Vec<serde_json::Value> =
            self.get_json(url.clone(), &[("nom", name)]).await?;

        let Some(first) = pages.into_iter().next() else {
            return Ok(Vec::new());
        };
        let page: SearchPage = serde_json::from_value(first)
            .map_err(|source| ApiError::Decode { url, source })?;
        Ok(page.into_values().collect())
    }

    /// Fetch the details of one challenge by platform id.
    pub async fn fetch_challenge(&self, id: &str) -> Result<ChallengeDetail> {
        let url = format!("{}/challenges/{}", self.base_url, id);
        self.get_json(url, &[]).await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T>(&self, url: String, query: &[(&str, &str)]) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!("platform request: {}", url);

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .header(
                reqwest::header::COOKIE,
                format!("api_key={}", self.api_key),
            )
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound { url });
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::UnexpectedStatus { status, url });
        }

        let text = response.text().await?;
        debug!("platform response: {} byte(s) from {}", text.len(), url);
        serde_json::from_str(&text).map_err(|source| ApiError::Decode { url, source })
    }
}
