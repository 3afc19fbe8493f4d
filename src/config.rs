//! Environment-driven configuration.
//!
//! Values come from `UNIVER_`-prefixed environment variables layered over the
//! defaults below (nested fields use `__`, e.g. `UNIVER_FETCH_TTLS__SCHEDULE_SECS`).
//! The embedding binary is expected to have loaded its `.env` file before
//! calling [`Config::load`].

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Portal origin all routes are resolved against.
    pub base_url: String,
    /// WebDriver endpoint used for challenge solving (chromedriver).
    pub webdriver_url: String,
    /// Base level for the tracing filter.
    pub log_level: String,
    /// Per-request timeout for outbound portal calls.
    pub request_timeout_secs: u64,
    /// Overall ceiling on one browser-automation refresh flow.
    pub refresh_timeout_secs: u64,
    /// Minimum age a capture must reach before another browser launch.
    pub session_cooldown_secs: u64,
    pub fetch_ttls: FetchTtls,
}

/// How often callers should re-fetch each entity family.
///
/// Consumed by the embedding scheduler, not by the client itself; the client's
/// own session cooldown is the much shorter `session_cooldown_secs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchTtls {
    pub schedule_secs: u64,
    pub exams_secs: u64,
    pub faculties_secs: u64,
    pub departments_secs: u64,
    pub employees_secs: u64,
    pub employee_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://oreluniver.ru".to_owned(),
            webdriver_url: "http://localhost:9515".to_owned(),
            log_level: "info".to_owned(),
            request_timeout_secs: 30,
            refresh_timeout_secs: 90,
            session_cooldown_secs: 60,
            fetch_ttls: FetchTtls::default(),
        }
    }
}

impl Default for FetchTtls {
    fn default() -> Self {
        const HOUR: u64 = 3600;
        Self {
            schedule_secs: 3 * HOUR,
            exams_secs: 3 * HOUR,
            faculties_secs: 24 * HOUR,
            departments_secs: 24 * HOUR,
            employees_secs: 24 * HOUR,
            employee_secs: 3 * HOUR,
        }
    }
}

impl Config {
    /// Load config from the environment over the built-in defaults.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("UNIVER_").split("__"))
            .extract()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }

    pub fn session_cooldown(&self) -> Duration {
        Duration::from_secs(self.session_cooldown_secs)
    }
}
