use crate::error::{AppError, Result};

pub const APP_URL: &str = "http://127.0.0.1:5000";

/// Backend request timeout (seconds). Applies to every call the client makes;
/// the orchestrator treats a timeout like any other network rejection.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// American odds used when a card carries no parseable price.
pub const DEFAULT_ODDS: i32 = -110;

/// Sentinel matchup for cards where no event name could be found.
pub const UNKNOWN_MATCHUP: &str = "Unknown Matchup";

/// Capacity of the bridge command channel.
pub const CHANNEL_CAPACITY: usize = 64;

/// Hostnames the host runtime recognizes as scrapable sportsbooks.
pub const SUPPORTED_HOSTS: &[(&str, &str)] = &[
    ("sportsbook.fanduel.com", "fanduel"),
    ("sportsbook.draftkings.com", "draftkings"),
    ("app.prizepicks.com", "prizepicks"),
    ("www.prizepicks.com", "prizepicks"),
];

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the LockTracker web app (APP_URL).
    pub app_url: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let app_url = std::env::var("APP_URL").unwrap_or_else(|_| APP_URL.to_string());
        if app_url.is_empty() {
            return Err(AppError::Config("APP_URL must not be empty".to_string()));
        }
        Ok(Self {
            app_url,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
