//! Typed view of the LockTracker web app's HTTP contract.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::Result;
use crate::types::Bet;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Paid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthStatus {
    #[serde(default)]
    pub logged_in: bool,
    pub access_token: Option<String>,
    pub user: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsageInfo {
    #[serde(default)]
    pub success: bool,
    pub tier: Option<Tier>,
    pub remaining: Option<u32>,
    pub monthly_limit: Option<u32>,
    pub at_limit: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportOutcome {
    #[serde(default)]
    pub success: bool,
    pub imported: Option<u32>,
    pub error: Option<String>,
    /// Partial-import notice (e.g. monthly limit reached mid-batch).
    pub warning: Option<String>,
}

#[derive(Serialize)]
struct UsageRequest<'a> {
    access_token: &'a str,
}

#[derive(Serialize)]
struct ImportRequest<'a> {
    access_token: &'a str,
    bets: &'a [Bet],
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn auth_status(&self) -> Result<AuthStatus> {
        let status = self
            .http
            .get(format!("{}/api/auth/status", self.base_url))
            .send()
            .await?
            .json()
            .await?;
        Ok(status)
    }

    pub async fn usage(&self, access_token: &str) -> Result<UsageInfo> {
        let usage = self
            .http
            .post(format!("{}/api/usage", self.base_url))
            .json(&UsageRequest { access_token })
            .send()
            .await?
            .json()
            .await?;
        Ok(usage)
    }

    pub async fn import(&self, access_token: &str, bets: &[Bet]) -> Result<ImportOutcome> {
        let outcome = self
            .http
            .post(format!("{}/api/import", self.base_url))
            .json(&ImportRequest { access_token, bets })
            .send()
            .await?
            .json()
            .await?;
        Ok(outcome)
    }
}
